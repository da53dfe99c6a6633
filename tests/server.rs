use std::net::SocketAddr;
use std::sync::Arc;

use articles::assets::Assets;
use articles::{AppState, ArticleStore, Error, Mode, Router, Server, api, article, serve_listener};
use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

async fn spawn(router: Router) -> (SocketAddr, oneshot::Sender<()>, JoinHandle<Result<(), Error>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(serve_listener(listener, router, async move {
        let _ = rx.await;
    }));
    (addr, tx, handle)
}

async fn roundtrip(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn serves_articles_over_tcp_and_shuts_down() {
    let state = Arc::new(AppState::new(ArticleStore::new(article::seed()), Mode::Strict));
    let (addr, stop, handle) = spawn(api::router(&state)).await;

    let res = roundtrip(
        addr,
        "GET /articles HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n",
    ).await;
    assert!(res.starts_with("HTTP/1.1 200 OK\r\n"), "{res}");
    assert!(res.contains("content-type: application/json\r\n"), "{res}");
    assert!(res.contains(r#""id":"2""#), "{res}");

    let body = r#"{"title":"Over the wire"}"#;
    let post = format!(
        "POST /article HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\
         content-type: application/json\r\ncontent-length: {}\r\n\r\n{body}",
        body.len()
    );
    let res = roundtrip(addr, &post).await;
    assert!(res.starts_with("HTTP/1.1 200 OK\r\n"), "{res}");
    assert!(res.contains(r#""id":"3""#), "{res}");
    assert_eq!(state.store.len().await, 3);

    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn invalid_bind_address_is_an_error() {
    let err = Server::try_bind("not-an-address").err().unwrap();
    assert!(matches!(err, Error::Addr { .. }));
    assert!(err.to_string().contains("not-an-address"));
}

fn get(uri: &str) -> http::Request<Full<Bytes>> {
    http::Request::builder().uri(uri).body(Full::new(Bytes::new())).unwrap()
}

#[tokio::test]
async fn assets_are_served_with_content_type() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>docs</h1>").unwrap();
    std::fs::write(dir.path().join("app.css"), "body {}").unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested").join("index.html"), "nested").unwrap();

    let assets = Arc::new(Assets::new(dir.path()));
    let router = assets.mount(Router::new());

    let res = router.handle(get("/swaggerui/")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/html");
    assert_eq!(res.into_body().collect().await.unwrap().to_bytes(), "<h1>docs</h1>");

    let res = router.handle(get("/swaggerui/app.css")).await;
    assert_eq!(res.headers()["content-type"], "text/css");

    let res = router.handle(get("/swaggerui/nested/")).await;
    assert_eq!(res.into_body().collect().await.unwrap().to_bytes(), "nested");
}

#[tokio::test]
async fn missing_and_escaping_assets_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let assets = Arc::new(Assets::new(dir.path().join("docs")));
    std::fs::write(dir.path().join("secret.txt"), "secret").unwrap();
    let router = assets.mount(Router::new());

    for uri in ["/swaggerui/missing.js", "/swaggerui/../secret.txt", "/swaggerui/"] {
        let res = router.handle(get(uri)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}
