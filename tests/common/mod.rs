//! Shared helpers for integration tests: an origin server with sample
//! resources and a relay spawner, both served on ephemeral ports.

use axum::{
    body::{Body, Bytes},
    extract::Json,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use relay_axum_http::{PolicyConfig, ProxyForwarder};
use std::convert::Infallible;

/// The 6-byte binary sample every fidelity test checks against.
pub const BINARY_SAMPLE: [u8; 6] = [0x00, 0xBA, 0xDD, 0xCA, 0xFE, 0xFF];

/// ASCII text sample.
pub const TEXT_SAMPLE: &str = "The quick brown fox jumps over the lazy dog.";

/// Serve a router on an ephemeral port, returning its origin URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Spawn an origin server with the sample resources.
pub async fn spawn_origin() -> String {
    spawn(origin_router()).await
}

/// Spawn a relay enforcing the given policy, mounted at `/proxy`.
pub async fn spawn_relay(policy: PolicyConfig) -> String {
    spawn(ProxyForwarder::with_policy(policy).router("/proxy")).await
}

/// The port an origin URL landed on.
pub fn port_of(origin: &str) -> u16 {
    url::Url::parse(origin).unwrap().port().unwrap()
}

fn origin_router() -> Router {
    Router::new()
        .route(
            "/samples/binary.bin",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/octet-stream")],
                    Bytes::from_static(&BINARY_SAMPLE),
                )
            }),
        )
        .route("/samples/text-ascii.txt", get(|| async { TEXT_SAMPLE }))
        .route(
            "/samples/json-ok.json",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/json")],
                    r#"{"test": "ok"}"#,
                )
            }),
        )
        .route(
            "/samples/json-corrupted.json",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], r#"{"test": "#) }),
        )
        .route("/echo-headers", get(echo_headers))
        .route("/echo", post(echo))
        .route("/large-content", get(large_content))
        .route("/chunked", get(chunked))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
}

/// Echo the request headers back as a JSON object.
async fn echo_headers(headers: HeaderMap) -> Json<serde_json::Value> {
    let mut map = serde_json::Map::new();
    for (name, value) in &headers {
        if let Ok(value) = value.to_str() {
            map.insert(name.as_str().to_string(), value.into());
        }
    }
    Json(serde_json::Value::Object(map))
}

/// Echo the request body back, byte for byte.
async fn echo(body: Bytes) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/octet-stream")], body)
}

/// 6 MiB with a declared content-length.
async fn large_content() -> Bytes {
    Bytes::from(vec![0u8; 6 * 1024 * 1024])
}

/// 8 KiB in 1 KiB chunks, no content-length.
async fn chunked() -> Body {
    let chunks = (0..8).map(|_| Ok::<Bytes, Infallible>(Bytes::from(vec![0u8; 1024])));
    Body::from_stream(futures::stream::iter(chunks))
}
