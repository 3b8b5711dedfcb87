//! Relay demo server
//!
//! Serves the relay at `/proxy` next to two sample endpoints: `/echo-headers`
//! (returns the request headers as JSON) and `/large-content` (6 MiB, enough
//! to trip the default byte cap when fetched through the relay).
//!
//! Run with: cargo run --example relay_server

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::Json,
    http::HeaderMap,
    routing::get,
    Router,
};
use relay_axum_http::{PolicyConfig, ProxyForwarder};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3042);

    let forwarder = ProxyForwarder::with_policy(PolicyConfig::new().allow_port(port));

    let app = Router::new()
        .route("/echo-headers", get(echo_headers))
        .route("/large-content", get(large_content))
        .merge(forwarder.router("/proxy"));

    println!("Starting relay demo server on 0.0.0.0:{port}");
    println!("  GET  /echo-headers  - request headers as JSON");
    println!("  GET  /large-content - 6 MiB body");
    println!("  POST /proxy         - the relay");

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn echo_headers(headers: HeaderMap) -> Json<serde_json::Value> {
    let mut map = serde_json::Map::new();
    for (name, value) in &headers {
        if let Ok(value) = value.to_str() {
            map.insert(name.as_str().to_string(), value.into());
        }
    }
    Json(serde_json::Value::Object(map))
}

async fn large_content() -> Bytes {
    Bytes::from(vec![0u8; 6 * 1024 * 1024])
}
