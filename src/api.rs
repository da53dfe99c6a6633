//! The article endpoints.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/` | [`welcome`] |
//! | GET | `/articles` | list every article |
//! | GET | `/article/{id}` | one article |
//! | POST, PUT | `/article` | create (empty id) or update (known id) |
//! | DELETE | `/article/{id}` | remove one article |
//!
//! In [`Mode::Strict`] a missing article is `404` and an undecodable body is
//! `400`. [`Mode::Lenient`] reproduces the older silent behavior for clients
//! that rely on it: misses answer `200`, and a bad body is logged and treated
//! as an empty article.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::article::Article;
use crate::handler::with_state;
use crate::method::Method;
use crate::middleware::Cors;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::status::Status;
use crate::store::{ArticleStore, StoreError};

pub const WELCOME: &str = "Welcome to the HomePage!";

/// How misses and malformed bodies are reported.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Strict,
    Lenient,
}

/// Everything the handlers share.
#[derive(Debug, Default)]
pub struct AppState {
    pub store: ArticleStore,
    pub mode: Mode,
}

impl AppState {
    pub fn new(store: ArticleStore, mode: Mode) -> Self {
        Self { store, mode }
    }

    /// In lenient mode a miss becomes `fallback()`; otherwise it is an error.
    fn tolerate<T>(&self, res: Result<T, StoreError>, fallback: impl FnOnce() -> T) -> Result<T, ApiError> {
        match res {
            Err(StoreError::NotFound(id)) if self.mode == Mode::Lenient => {
                info!(%id, "no such article, ignoring");
                Ok(fallback())
            }
            other => Ok(other?),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid article body: {0}")]
    InvalidBody(#[source] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("{self}");

        let status = match &self {
            ApiError::Store(StoreError::NotFound(_)) => Status::NotFound,
            ApiError::InvalidBody(_) => Status::BadRequest,
        };
        let payload = serde_json::to_vec(&json!({"message": self.to_string()})).unwrap_or_default();

        Response::builder().status(status).json(payload)
    }
}

/// The article routes, bound to `state`.
pub fn router(state: &Arc<AppState>) -> Router {
    Router::new()
        .get("/", welcome)
        .get("/articles", with_state(state, list_articles))
        .get("/article/{id}", with_state(state, get_article))
        .post("/article", with_state(state, upsert_article))
        .put("/article", with_state(state, upsert_article))
        .delete("/article/{id}", with_state(state, delete_article))
}

/// Any origin, credentials allowed, and the methods and headers browser
/// clients of this API send.
pub fn cors_policy() -> Cors {
    Cors::new()
        .allow_any_origin()
        .allow_methods([Method::Get, Method::Post, Method::Options, Method::Delete, Method::Put])
        .allow_headers([
            "Access-Control-Allow-Headers",
            "Access-Control-Allow-Methods",
            "Access-Control-Allow-Origin",
            "Content-Type",
        ])
        .allow_credentials(true)
}

pub async fn welcome(_req: Request) -> &'static str {
    info!(endpoint = "welcome", "endpoint hit");
    WELCOME
}

async fn list_articles(state: Arc<AppState>, _req: Request) -> Json<Vec<Article>> {
    info!(endpoint = "list_articles", "endpoint hit");
    Json(state.store.list().await)
}

async fn get_article(state: Arc<AppState>, req: Request) -> Result<Response, ApiError> {
    info!(endpoint = "get_article", "endpoint hit");
    let id = req.param("id").unwrap_or_default();

    let found = state.store.get(id).await.map(|a| Json(a).into_response());
    state.tolerate(found, || Response::status(Status::Ok))
}

async fn upsert_article(state: Arc<AppState>, req: Request) -> Result<Json<Article>, ApiError> {
    info!(endpoint = "upsert_article", "endpoint hit");

    let article: Article = match req.json() {
        Ok(article) => article,
        Err(e) if state.mode == Mode::Lenient => {
            warn!("malformed article body, continuing with an empty article: {e}");
            Article::default()
        }
        Err(e) => return Err(ApiError::InvalidBody(e)),
    };

    let stored = state.store.upsert(article.clone()).await.map(|u| u.into_article());
    state.tolerate(stored, || article).map(Json)
}

async fn delete_article(state: Arc<AppState>, req: Request) -> Result<Status, ApiError> {
    info!(endpoint = "delete_article", "endpoint hit");
    let id = req.param("id").unwrap_or_default();

    let deleted = state.store.delete(id).await.map(|_| Status::Ok);
    state.tolerate(deleted, || Status::Ok)
}
