//! Handler trait, type erasure, and shared-state injection.
//!
//! The router stores handlers of different concrete types in one map, so each
//! one is wrapped into an `Arc<dyn ErasedHandler>`:
//!
//! ```text
//! async fn list(req: Request) -> Json<Vec<Article>>  ← user writes this
//!        ↓ router.get("/articles", list)
//! Arc::new(FnHandler(list))                           ← BoxedHandler
//!        ↓ handler.call(req) at request time
//! Box::pin(async { list(req).await.into_response() }) ← BoxFuture
//! ```
//!
//! Handlers that need application state are built with [`with_state`], which
//! captures an `Arc<S>` and hands a clone to every call. There are no globals.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Automatically satisfied for any function or closure of the shape
/// `Fn(Request) -> impl Future<Output = impl IntoResponse>`. Sealed: only the
/// blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Binds shared state to a handler that takes it as its first argument.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use articles::{Request, Router, with_state};
///
/// struct Counter(std::sync::atomic::AtomicU64);
///
/// async fn hits(counter: Arc<Counter>, _req: Request) -> String {
///     let n = counter.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
///     n.to_string()
/// }
///
/// let counter = Arc::new(Counter(0.into()));
/// let app = Router::new().get("/hits", with_state(&counter, hits));
/// ```
pub fn with_state<S, F, Fut, R>(state: &Arc<S>, f: F) -> impl Handler + use<S, F, Fut, R>
where
    S: Send + Sync + 'static,
    F: Fn(Arc<S>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    let state = Arc::clone(state);
    move |req: Request| f(Arc::clone(&state), req)
}
