//! Static documentation assets (the Swagger UI bundle).
//!
//! Files are read from disk on every request; there is no cache. Directory
//! paths serve their `index.html`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::error;

use crate::handler::with_state;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

/// URL prefix the assets are mounted under.
pub const PREFIX: &str = "/swaggerui";

const INDEX: &str = "index.html";

#[derive(Clone, Debug)]
pub struct Assets {
    root: PathBuf,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Registers `GET /swaggerui/` and `GET /swaggerui/{*path}` on `router`.
    pub fn mount(self: &Arc<Self>, router: Router) -> Router {
        router
            .get(&format!("{PREFIX}/"), with_state(self, serve_asset))
            .get(&format!("{PREFIX}/{{*path}}"), with_state(self, serve_asset))
    }

    /// Maps a URL tail onto a file under the root, refusing anything that
    /// could climb out of it.
    fn resolve(&self, tail: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for component in Path::new(tail).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(path)
    }

    async fn read(&self, tail: &str) -> Result<Option<(PathBuf, Vec<u8>)>, std::io::Error> {
        let Some(mut path) = self.resolve(tail) else { return Ok(None) };

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => path.push(INDEX),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some((path, bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

async fn serve_asset(assets: Arc<Assets>, req: Request) -> Response {
    let tail = req.param("path").unwrap_or_default();

    match assets.read(tail).await {
        Ok(Some((path, bytes))) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            Response::builder().bytes(mime.as_ref(), bytes)
        }
        Ok(None) => Response::status(Status::NotFound),
        Err(e) => {
            error!(path = %req.path(), "failed to read asset: {e}");
            Response::status(Status::InternalServerError)
        }
    }
}
