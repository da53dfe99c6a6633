//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. [`Router::handle`] is the
//! single entry point the server calls for every request; it applies the
//! middleware, routes, and produces the fallback responses.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use matchit::Router as MatchitRouter;
use tracing::{Instrument, warn};

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::Cors;
use crate::middleware::trace;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    cors: Option<Cors>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), cors: None }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax, catch-alls `{*name}`;
    /// `req.param("name")` retrieves either:
    ///
    /// ```rust,no_run
    /// # use articles::{Method, Request, Response, Router};
    /// # async fn get_article(_: Request) -> Response { Response::text("") }
    /// # async fn asset(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get, "/article/{id}", get_article)
    ///     .on(Method::Get, "/static/{*path}", asset);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    /// Applies a CORS policy to every request this router handles.
    pub fn cors(mut self, cors: Cors) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Runs one request through middleware and routing.
    ///
    /// Never fails: unmatched paths, wrong methods and unreadable bodies all
    /// become ordinary responses.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Display,
    {
        let (parts, body) = req.into_parts();
        let span = trace::span(&parts.method, parts.uri.path());

        async move {
            let started = Instant::now();

            let response = match &self.cors {
                Some(cors) if Cors::is_preflight(&parts.method, &parts.headers) => {
                    cors.preflight(&parts.headers)
                }
                cors => {
                    let mut res = self.route(&parts, body).await;
                    if let Some(cors) = cors {
                        cors.decorate(&parts.method, &parts.headers, &mut res);
                    }
                    res
                }
            };

            let response = response.into_inner();
            trace::finish(response.status(), started.elapsed());
            response
        }
        .instrument(span)
        .await
    }

    async fn route<B>(&self, parts: &http::request::Parts, body: B) -> Response
    where
        B: Body,
        B::Error: Display,
    {
        let path = parts.uri.path();
        let found = Method::try_from(&parts.method)
            .ok()
            .and_then(|method| self.lookup(method, path).map(|(h, p)| (method, h, p)));
        let Some((method, handler, params)) = found else {
            return self.fallback(&parts.uri);
        };

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!("failed to read request body: {e}");
                return Response::status(Status::BadRequest);
            }
        };

        let req = Request::new(method, path.to_owned(), parts.headers.clone(), body, params);
        handler.call(req).await
    }

    /// `405` when the path exists under another method, `301` when only a
    /// trailing slash is in the way, `404` otherwise.
    fn fallback(&self, uri: &http::Uri) -> Response {
        let path = uri.path();

        let allowed = self.allowed_methods(path);
        if !allowed.is_empty() {
            let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
            return Response::builder()
                .status(Status::MethodNotAllowed)
                .header("allow", &allow)
                .no_body();
        }

        let trimmed = path.trim_end_matches('/');
        if trimmed.len() < path.len() && !trimmed.is_empty() && self.matches_any(trimmed) {
            let location = match uri.query() {
                Some(q) => format!("{trimmed}?{q}"),
                None => trimmed.to_owned(),
            };
            return Response::builder()
                .status(Status::MovedPermanently)
                .header("location", &location)
                .no_body();
        }

        Response::status(Status::NotFound)
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(method, _)| *method)
            .collect();
        methods.sort();
        methods
    }

    fn matches_any(&self, path: &str) -> bool {
        self.routes.values().any(|tree| tree.at(path).is_ok())
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo_id(req: Request) -> String {
        format!("article {}", req.param("id").unwrap_or("?"))
    }

    async fn echo_path(req: Request) -> String {
        req.param("path").unwrap_or("").to_owned()
    }

    async fn nothing(_req: Request) -> Status {
        Status::NoContent
    }

    fn router() -> Router {
        Router::new()
            .get("/article/{id}", echo_id)
            .delete("/article/{id}", nothing)
            .post("/article", nothing)
            .get("/docs/{*path}", echo_path)
    }

    fn request(method: http::Method, uri: &str) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    async fn body_of(res: http::Response<Full<Bytes>>) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn path_params_reach_the_handler() {
        let res = router().handle(request(http::Method::GET, "/article/42")).await;
        assert_eq!(res.status(), http::StatusCode::OK);
        assert_eq!(body_of(res).await, "article 42");
    }

    #[tokio::test]
    async fn catch_all_captures_the_rest() {
        let res = router().handle(request(http::Method::GET, "/docs/css/site.css")).await;
        assert_eq!(body_of(res).await, "css/site.css");
    }

    #[tokio::test]
    async fn wrong_method_lists_allowed_ones() {
        let res = router().handle(request(http::Method::PATCH, "/article/1")).await;
        assert_eq!(res.status(), http::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()["allow"], "DELETE, GET");
    }

    #[tokio::test]
    async fn extension_method_is_not_allowed() {
        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        let res = router().handle(request(purge, "/article")).await;
        assert_eq!(res.status(), http::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()["allow"], "POST");
    }

    #[tokio::test]
    async fn trailing_slash_redirects() {
        let res = router().handle(request(http::Method::GET, "/article/7/?x=1")).await;
        assert_eq!(res.status(), http::StatusCode::MOVED_PERMANENTLY);
        assert_eq!(res.headers()["location"], "/article/7?x=1");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let res = router().handle(request(http::Method::GET, "/nope")).await;
        assert_eq!(res.status(), http::StatusCode::NOT_FOUND);

        let res = router().handle(request(http::Method::GET, "/nope/")).await;
        assert_eq!(res.status(), http::StatusCode::NOT_FOUND);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic() {
        let _ = Router::new()
            .get("/article/{id}", nothing)
            .get("/article/{slug}", nothing);
    }
}
