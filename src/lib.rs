//! # articles
//!
//! A small HTTP service that keeps "article" records in memory and exposes
//! them as JSON, plus the minimal HTTP layer it runs on.
//!
//! ## The service
//!
//! - [`article`]: the record and its wire shape (`description` travels as `color`)
//! - [`store`]: the ordered collection behind one lock
//! - [`api`]: list, get, create-or-update, delete, and a welcome text
//! - [`assets`]: the Swagger UI files under `/swaggerui/`
//!
//! ## The HTTP layer
//!
//! - Radix-tree routing via [`matchit`], one tree per method
//! - hyper for HTTP/1.1 and HTTP/2, tokio for I/O
//! - CORS and per-request tracing as [`middleware`]
//! - Graceful shutdown on SIGTERM / Ctrl-C, draining in-flight requests
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use articles::{AppState, ArticleStore, Mode, Server, api, article};
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = Arc::new(AppState::new(ArticleStore::new(article::seed()), Mode::Strict));
//!     let app = api::router(&state).cors(api::cors_policy());
//!
//!     Server::bind(([0, 0, 0, 0], 8000).into()).serve(app).await.unwrap();
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod article;
pub mod assets;
pub mod config;
pub mod logging;
pub mod middleware;
pub mod store;

pub use api::{AppState, Mode};
pub use article::Article;
pub use error::Error;
pub use handler::{Handler, with_state};
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::{Server, serve_listener};
pub use status::Status;
pub use store::{ArticleStore, StoreError, Upsert};
