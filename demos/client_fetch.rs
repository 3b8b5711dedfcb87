//! Client demo
//!
//! Fetches the demo server's endpoints directly and through the relay,
//! including one request the relay rejects for size.
//!
//! Start `cargo run --example relay_server` first, then run with:
//! cargo run --example client_fetch [origin]

use anyhow::Result;
use relay_axum_http::RelayClient;
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let origin = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:3042/".to_string());
    let base = Url::parse(&origin)?;
    let client = RelayClient::new(base.clone());

    let headers = client.get_json("/echo-headers").await?;
    println!("direct /echo-headers:\n  {headers}");

    let target = base.join("/echo-headers")?;
    let relayed = client.get_json_via_relay(target.as_str(), &[]).await?;
    println!("relayed /echo-headers (note the synthesized referer):\n  {relayed}");

    let large = base.join("/large-content")?;
    match client.get_raw_via_relay(large.as_str(), &[]).await {
        Ok(bytes) => println!("relayed /large-content: {} bytes (unexpected)", bytes.len()),
        Err(error) => println!("relayed /large-content rejected: {error}"),
    }

    Ok(())
}
