//! Main relay HTTP client implementation.
//!
//! Provides the primary `RelayClient` for issuing direct fetches and feeding
//! their results through the response pipeline. The relayed counterparts of
//! these operations live in [`relay`](crate::client#relayed-operations).
//!
//! # Examples
//!
//! ## Fetching text
//!
//! ```ignore
//! use relay_axum_http::RelayClient;
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RelayClient::new(Url::parse("http://localhost:3042/")?);
//!     let text = client.get_text("/samples/text-ascii.txt").await?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```
//!
//! ## An arbitrary request
//!
//! ```ignore
//! use relay_axum_http::{FetchRequest, RelayClient};
//!
//! let request = FetchRequest::new("/echo")
//!     .with_method("POST")
//!     .with_header("content-type", "application/octet-stream")
//!     .with_body(vec![0x00, 0xFF]);
//! let bytes = client.request(request).await?;
//! ```

use crate::client::{config::ClientConfig, pipeline, utils};
use crate::error::{RelayError, Result};
use crate::types::FetchRequest;
use bytes::Bytes;
use std::sync::Arc;
use tokio::task::JoinHandle;
use url::Url;

/// HTTP client with direct and relayed fetch support.
///
/// Cheap to clone; clones share the underlying connection pool and the
/// immutable [`ClientConfig`].
///
/// Operations come in four shapes per fetch mode: `get_raw` (bytes),
/// `get_text` (string), `get_json` (parsed value) and `request` (bytes, any
/// method/headers/body). Each also has a `_callback` variant adapting the
/// result to a trailing completion callback.
#[derive(Clone)]
pub struct RelayClient {
    pub(super) client: reqwest::Client,
    pub(super) config: Arc<ClientConfig>,
}

impl RelayClient {
    /// Create a client for the given base origin with default configuration.
    pub fn new(base_origin: Url) -> Self {
        Self::with_config(ClientConfig::new(base_origin))
    }

    /// Create a client with custom configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .unwrap_or_default();

        RelayClient {
            client,
            config: Arc::new(config),
        }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Retrieve a resource as raw bytes (HTTP GET).
    pub async fn get_raw(&self, url: &str) -> Result<Bytes> {
        let outcome = async {
            let response = pipeline::gate_status(self.send_direct(&FetchRequest::new(url)).await?)?;
            pipeline::read_body(response).await?.into_raw()
        }
        .await;
        self.conclude("get_raw", url, outcome)
    }

    /// Retrieve a resource as a UTF-8 string (HTTP GET).
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let outcome = async {
            let response = pipeline::gate_status(self.send_direct(&FetchRequest::new(url)).await?)?;
            let response = pipeline::read_body(response).await?;
            pipeline::body_to_text(response)?.into_text()
        }
        .await;
        self.conclude("get_text", url, outcome)
    }

    /// Retrieve and parse a JSON resource (HTTP GET).
    ///
    /// The result is the parsed value. A response that decodes but does not
    /// parse fails with [`RelayError::InvalidJson`], keeping the original
    /// response's status.
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let outcome = async {
            let response = pipeline::gate_status(self.send_direct(&FetchRequest::new(url)).await?)?;
            let response = pipeline::read_body(response).await?;
            pipeline::body_parse_json(response)?.into_json()
        }
        .await;
        self.conclude("get_json", url, outcome)
    }

    /// Make an HTTP request with arbitrary method, headers and body.
    ///
    /// The result is the response body as raw bytes.
    pub async fn request(&self, request: FetchRequest) -> Result<Bytes> {
        let url = request.url.clone();
        let outcome = async {
            let response = pipeline::gate_status(self.send_direct(&request).await?)?;
            pipeline::read_body(response).await?.into_raw()
        }
        .await;
        self.conclude("request", &url, outcome)
    }

    /// Callback form of [`get_raw`](Self::get_raw).
    pub fn get_raw_callback<F>(&self, url: &str, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Bytes>) + Send + 'static,
    {
        let client = self.clone();
        let url = url.to_string();
        utils::spawn_callback(async move { client.get_raw(&url).await }, callback)
    }

    /// Callback form of [`get_text`](Self::get_text).
    pub fn get_text_callback<F>(&self, url: &str, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<String>) + Send + 'static,
    {
        let client = self.clone();
        let url = url.to_string();
        utils::spawn_callback(async move { client.get_text(&url).await }, callback)
    }

    /// Callback form of [`get_json`](Self::get_json).
    pub fn get_json_callback<F>(&self, url: &str, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<serde_json::Value>) + Send + 'static,
    {
        let client = self.clone();
        let url = url.to_string();
        utils::spawn_callback(async move { client.get_json(&url).await }, callback)
    }

    /// Callback form of [`request`](Self::request).
    pub fn request_callback<F>(&self, request: FetchRequest, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Bytes>) + Send + 'static,
    {
        let client = self.clone();
        utils::spawn_callback(async move { client.request(request).await }, callback)
    }

    /// Issue a plain outbound call and capture the in-flight response.
    ///
    /// No retries: a connection-level failure fails the operation
    /// immediately.
    pub(super) async fn send_direct(
        &self,
        request: &FetchRequest,
    ) -> Result<crate::types::FetchResponse> {
        let target = utils::resolve_url(&self.config.base_origin, &request.url)?;

        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            RelayError::Validation {
                reason: format!("invalid HTTP method {}", request.method),
            }
        })?;

        let mut builder = self.client.request(method, target);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RelayError::Connection(e.to_string()))?;

        Ok(crate::types::FetchResponse::from_response(response))
    }

    /// Attach the operation/URL context to a failed outcome.
    pub(super) fn conclude<T>(
        &self,
        operation: &'static str,
        url: &str,
        outcome: Result<T>,
    ) -> Result<T> {
        outcome.map_err(|error| {
            if self.config.enable_logging {
                tracing::warn!(operation, url, %error, "fetch operation failed");
            }
            error.context(operation, url)
        })
    }
}
