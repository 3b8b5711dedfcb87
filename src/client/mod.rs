//! Relay HTTP client implementation.
//!
//! This module provides the client half of the proxy fetch protocol: a
//! value-typed HTTP client that can fetch resources either **directly** or
//! **through the same-origin relay**, normalizing both paths through one
//! response pipeline.
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch    - RelayClient and the direct operations
//! ├── relay    - relayed operations (envelope POST to the relay path)
//! ├── pipeline - staged response transforms (gate, read, decode, parse)
//! ├── config   - client configuration
//! └── utils    - URL resolution and the callback adapter
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RelayClient`] | HTTP client with direct and relayed fetch operations |
//! | [`ClientConfig`] | Base origin, relay path, pool and logging knobs |
//!
//! # Examples
//!
//! ## Creating a client
//!
//! ```
//! use relay_axum_http::client::{ClientConfig, RelayClient};
//! use url::Url;
//!
//! // Default configuration for an origin
//! let origin = Url::parse("http://localhost:3042/").unwrap();
//! let client = RelayClient::new(origin.clone());
//!
//! // Custom configuration
//! let config = ClientConfig {
//!     relay_path: "/relay".to_string(),
//!     ..ClientConfig::new(origin)
//! };
//! let client = RelayClient::with_config(config);
//! ```
//!
//! ## Direct vs relayed
//!
//! ```ignore
//! // Same-origin resource: fetch directly.
//! let readme = client.get_text("/README.txt").await?;
//!
//! // Cross-origin resource: route through the relay, restricted to PNG.
//! let image = client
//!     .get_raw_via_relay("https://elsewhere.example/cat.png", &["image/png"])
//!     .await?;
//! ```

mod config;
mod fetch;
pub(crate) mod pipeline;
mod relay;
mod utils;

pub use config::ClientConfig;
pub use fetch::RelayClient;
pub use utils::{resolve_url, spawn_callback};
