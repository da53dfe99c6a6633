//! Middleware layer.
//!
//! Middleware sits between the server and the router and owns the
//! cross-cutting concerns that handlers should never see:
//!
//! - [`cors`]: answers preflight requests and decorates actual responses with
//!   the configured cross-origin policy
//! - [`trace`]: one span per request with method and path, closed by an event
//!   carrying status and latency
//!
//! Both are applied by [`Router::handle`](crate::Router::handle); CORS is
//! opt-in via [`Router::cors`](crate::Router::cors), tracing is always on.

pub mod cors;
pub(crate) mod trace;

pub use cors::Cors;
