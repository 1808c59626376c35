//! End-to-end forwarding tests against stub main and auth backends.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::routing::{get, post};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use twinrelay::proxy::relay::Forwarder;
use twinrelay::proxy::target::TargetBases;
use twinrelay::server::{self, AppState};

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn main_backend() -> Router {
    Router::new()
        .route(
            "/catalog/items",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/json")],
                    r#"{"ok":true}"#,
                )
            }),
        )
        .route("/submit", post(|body: String| async move { body }))
        .route(
            "/headers",
            post(|headers: HeaderMap| async move {
                let mut out = String::new();
                for (name, value) in &headers {
                    out.push_str(&format!("{name}: {}\n", value.to_str().unwrap_or("?")));
                }
                out
            }),
        )
        .route(
            "/hop",
            get(|| async {
                (
                    [
                        (header::CONNECTION, "close"),
                        (header::HeaderName::from_static("x-backend"), "main"),
                    ],
                    "hop",
                )
            }),
        )
        .route(
            "/stream",
            get(|| async {
                let chunks = ["chunk-one ", "chunk-two ", "chunk-three"]
                    .map(Ok::<_, std::io::Error>);
                Body::from_stream(futures_util::stream::iter(chunks))
            }),
        )
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "nothing here") }),
        )
        .route(
            "/boom",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        )
        .fallback(|uri: Uri| async move { format!("main {uri}") })
}

fn auth_backend() -> Router {
    Router::new()
        .route(
            "/auth/login",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/done")]) }),
        )
        .fallback(|uri: Uri| async move { format!("auth {uri}") })
}

async fn start_proxy(main: String, auth: String, timeout: Duration) -> SocketAddr {
    let state = Arc::new(AppState {
        forwarder: Forwarder::new(
            TargetBases::new(main, auth),
            server::build_http_client(),
            timeout,
        ),
    });
    spawn(server::build_router(state, 1_048_576)).await
}

async fn start_stack() -> (SocketAddr, SocketAddr) {
    let main = spawn(main_backend()).await;
    let auth = spawn(auth_backend()).await;
    let proxy = start_proxy(
        format!("http://{main}"),
        format!("http://{auth}"),
        Duration::from_secs(10),
    )
    .await;
    (proxy, main)
}

/// An address nothing listens on.
fn dead_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Read one HTTP/1.1 response off a connection that stays open, using
/// the `Content-Length` it declares. Returns the head and the body.
async fn read_sized_response(stream: &mut tokio::net::TcpStream) -> (String, String) {
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf).await.unwrap();
        assert!(n > 0, "connection closed early: {:?}", String::from_utf8_lossy(&raw));
        raw.extend_from_slice(&buf[..n]);

        let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&raw[..end]).into_owned();
        let length: usize = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse().unwrap())
            })
            .unwrap_or(0);
        let body = &raw[end + 4..];
        if body.len() >= length {
            return (head, String::from_utf8_lossy(&body[..length]).into_owned());
        }
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn get_relays_main_backend_status_and_body() {
    let (proxy, _) = start_stack().await;

    let resp = client()
        .get(format!("http://{proxy}/catalog/items"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "application/json");
    assert_eq!(resp.text().await.unwrap(), r#"{"ok":true}"#);
}

#[tokio::test]
async fn auth_redirect_is_relayed_not_followed() {
    let (proxy, _) = start_stack().await;

    let resp = client()
        .get(format!("http://{proxy}/auth/login"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers()["location"], "/done");
}

#[tokio::test]
async fn post_body_is_forwarded() {
    let (proxy, _) = start_stack().await;

    let resp = client()
        .post(format!("http://{proxy}/submit"))
        .body("hello")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "hello");
}

#[tokio::test]
async fn unreachable_backends_yield_502() {
    let main = dead_address();
    let auth = dead_address();
    let proxy = start_proxy(
        format!("http://{main}"),
        format!("http://{auth}"),
        Duration::from_secs(10),
    )
    .await;

    for path in ["/anything", "/auth/login"] {
        let resp = client()
            .get(format!("http://{proxy}{path}"))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 502);
        assert_eq!(resp.headers()["content-type"], "text/plain");
        let body = resp.text().await.unwrap();
        assert!(body.starts_with("Proxy Error: "), "body was {body:?}");
    }
}

#[tokio::test]
async fn post_to_unreachable_backend_yields_502() {
    let dead = dead_address();
    let proxy = start_proxy(
        format!("http://{dead}"),
        format!("http://{dead}"),
        Duration::from_secs(10),
    )
    .await;

    let resp = client()
        .post(format!("http://{proxy}/submit"))
        .body("hello")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 502);
    assert!(resp.text().await.unwrap().starts_with("Proxy Error: "));
}

#[tokio::test]
async fn paths_are_split_between_backends() {
    let (proxy, _) = start_stack().await;
    let client = client();

    for (path, expected) in [
        ("/auth", "auth /auth"),
        ("/authorize?x=1", "auth /authorize?x=1"),
        ("/", "main /"),
        ("/api/auth", "main /api/auth"),
        ("/search?q=a%20b&page=2", "main /search?q=a%20b&page=2"),
    ] {
        let body = client
            .get(format!("http://{proxy}{path}"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, expected, "path {path}");
    }
}

#[tokio::test]
async fn backend_error_statuses_become_502() {
    let (proxy, _) = start_stack().await;

    for (path, expected) in [
        ("/missing", "Proxy Error: HTTP Error 404: Not Found"),
        ("/boom", "Proxy Error: HTTP Error 500: Internal Server Error"),
    ] {
        let resp = client()
            .get(format!("http://{proxy}{path}"))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 502, "path {path}");
        assert_eq!(resp.headers()["content-type"], "text/plain", "path {path}");
        assert_eq!(resp.text().await.unwrap(), expected, "path {path}");
    }
}

#[tokio::test]
async fn connection_header_is_not_relayed() {
    let (proxy, _) = start_stack().await;

    let resp = client()
        .get(format!("http://{proxy}/hop"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get("connection").is_none());
    assert_eq!(resp.headers()["x-backend"], "main");
    assert_eq!(resp.text().await.unwrap(), "hop");
}

#[tokio::test]
async fn chunked_transfer_encoding_is_not_relayed() {
    let (proxy, main) = start_stack().await;

    let direct = client()
        .get(format!("http://{main}/stream"))
        .send()
        .await
        .unwrap();
    assert_eq!(direct.headers()["transfer-encoding"], "chunked");

    let resp = client()
        .get(format!("http://{proxy}/stream"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get("transfer-encoding").is_none());
    assert_eq!(resp.headers()["content-length"], "31");
    assert_eq!(resp.text().await.unwrap(), "chunk-one chunk-two chunk-three");
}

#[tokio::test]
async fn post_headers_forwarded_except_host() {
    let (proxy, main) = start_stack().await;

    let body = client()
        .post(format!("http://{proxy}/headers"))
        .header("x-trace", "42")
        .header("content-type", "text/plain")
        .body("x")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("x-trace: 42\n"), "echo was {body:?}");
    assert!(body.contains("content-type: text/plain\n"), "echo was {body:?}");
    assert!(body.contains(&format!("host: {main}\n")), "echo was {body:?}");
    assert!(!body.contains(&format!("host: {proxy}\n")), "echo was {body:?}");
}

#[tokio::test]
async fn post_connection_header_is_not_forwarded() {
    let (proxy, _) = start_stack().await;

    let mut stream = tokio::net::TcpStream::connect(proxy).await.unwrap();
    stream
        .write_all(
            b"POST /headers HTTP/1.1\r\n\
              Host: proxy\r\n\
              Connection: keep-alive\r\n\
              X-Custom: 1\r\n\
              Content-Length: 1\r\n\
              \r\n\
              x",
        )
        .await
        .unwrap();

    let (head, echo) =
        tokio::time::timeout(Duration::from_secs(5), read_sized_response(&mut stream))
            .await
            .unwrap();

    assert!(head.starts_with("HTTP/1.1 200"), "head was {head:?}");
    assert!(echo.contains("x-custom: 1\n"), "echo was {echo:?}");
    assert!(echo.contains("content-length: 1\n"), "echo was {echo:?}");
    assert!(!echo.contains("connection: keep-alive"), "echo was {echo:?}");
    assert!(!echo.contains("host: proxy\n"), "echo was {echo:?}");
}

#[tokio::test]
async fn post_without_content_length_forwards_empty_body() {
    let (proxy, _) = start_stack().await;

    let mut stream = tokio::net::TcpStream::connect(proxy).await.unwrap();
    stream
        .write_all(
            b"POST /submit HTTP/1.1\r\n\
              Host: proxy\r\n\
              Transfer-Encoding: chunked\r\n\
              Connection: close\r\n\
              \r\n\
              5\r\nhello\r\n0\r\n\r\n",
        )
        .await
        .unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let response = String::from_utf8_lossy(&raw);

    assert!(response.starts_with("HTTP/1.1 200"), "response was {response:?}");
    assert!(response.ends_with("\r\n\r\n"), "response was {response:?}");
    assert!(!response.contains("hello"), "response was {response:?}");
}

#[tokio::test]
async fn slow_backend_times_out_with_502() {
    let main = spawn(main_backend()).await;
    let proxy = start_proxy(
        format!("http://{main}"),
        format!("http://{main}"),
        Duration::from_millis(200),
    )
    .await;

    let resp = client()
        .get(format!("http://{proxy}/slow"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 502);
    assert_eq!(
        resp.text().await.unwrap(),
        "Proxy Error: timed out after 200ms waiting for backend"
    );
}

#[tokio::test]
async fn other_methods_are_rejected_with_405() {
    let (proxy, _) = start_stack().await;

    for method in [reqwest::Method::PUT, reqwest::Method::DELETE, reqwest::Method::PATCH] {
        let resp = client()
            .request(method.clone(), format!("http://{proxy}/catalog/items"))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 405, "method {method}");
        assert_eq!(resp.headers()["allow"], "GET, POST");
    }
}
