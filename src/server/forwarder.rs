//! The validating streaming forwarder.
//!
//! `ProxyForwarder` is the server half of the proxy fetch protocol. Each
//! inbound relay request moves through a fixed sequence of phases —
//! receive, validate, forward, gate, stream — and every failure short-circuits
//! into a single minimal rejection response. Nothing escapes a request's
//! handling: unclassified failures become a logged 500 with no detail leaked
//! across the trust boundary.
//!
//! # Phases
//!
//! 1. **Receiving** — the request must be a POST whose body collects into a
//!    byte buffer (400 otherwise).
//! 2. **Validating** — the body must decode as a [`ProxyEnvelope`] naming an
//!    `http`/`https` target with a host, an allowed port (400) and an allowed
//!    method (405). First failing check wins.
//! 3. **Forwarding** — the real outbound call, with synthesized
//!    user-agent/referer headers merged under the envelope's own. A transport
//!    failure is a 502.
//! 4. **Gating** — before any body byte moves: non-2xx upstream → 502 with
//!    upstream detail, mime allow-list violation → 406, declared
//!    `content-length` over the cap → 413.
//! 5. **Streaming** — upstream status and headers are mirrored (hop-by-hop
//!    headers dropped) and body chunks relayed under a running byte counter.
//!
//! # Usage
//!
//! ```ignore
//! use relay_axum_http::{PolicyConfig, ProxyForwarder};
//!
//! let forwarder = ProxyForwarder::with_policy(
//!     PolicyConfig::new().allow_port(8080),
//! );
//! let app = forwarder.router("/proxy");
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3042").await?;
//! axum::serve(listener, app).await?;
//! ```

use crate::error::{RelayError, Result};
use crate::protocol::{
    constants, effective_port, is_hop_by_hop, outbound_headers, primary_mime, ProxyEnvelope,
};
use crate::server::config::PolicyConfig;
use axum::{
    body::Body,
    extract::{Request, State},
    response::Response,
    routing::any,
    Router,
};
use bytes::Bytes;
use futures::{future, StreamExt};
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use std::io;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

/// The server-side relay: decodes envelopes, enforces policy, forwards, and
/// streams the result back under the configured byte cap.
///
/// Cheap to clone; clones share the outbound connection pool and the
/// immutable [`PolicyConfig`]. No other state is shared across requests.
#[derive(Clone)]
pub struct ProxyForwarder {
    policy: Arc<PolicyConfig>,
    client: reqwest::Client,
}

impl ProxyForwarder {
    /// Create a forwarder with the default policy.
    pub fn new() -> Self {
        Self::with_policy(PolicyConfig::default())
    }

    /// Create a forwarder enforcing the given policy.
    pub fn with_policy(policy: PolicyConfig) -> Self {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .unwrap_or_default();

        ProxyForwarder {
            policy: Arc::new(policy),
            client,
        }
    }

    /// Get the enforced policy.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Build a router serving this forwarder on the given relay path.
    ///
    /// The route accepts any method (the POST requirement is a policy check,
    /// answered with 400, not a routing concern) and is wrapped with request
    /// tracing and an inbound body cap of
    /// [`max_envelope_length`](PolicyConfig::max_envelope_length).
    pub fn router(&self, relay_path: &str) -> Router {
        Router::new()
            .route(relay_path, any(handle))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(RequestBodyLimitLayer::new(self.policy.max_envelope_length)),
            )
            .with_state(self.clone())
    }

    /// Run one relay request through all phases.
    async fn forward(&self, request: Request) -> Result<Response> {
        if request.method() != Method::POST {
            return Err(RelayError::Validation {
                reason: format!("relay accepts POST, got {}", request.method()),
            });
        }

        let caller_user_agent = request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = axum::body::to_bytes(request.into_body(), self.policy.max_envelope_length)
            .await
            .map_err(|e| RelayError::Validation {
                reason: format!("unreadable request body: {e}"),
            })?;

        let envelope = ProxyEnvelope::decode(&body)?;
        let target = self.validate(&envelope)?;
        tracing::debug!(target = %target, method = %envelope.method, "envelope validated");

        let upstream = self
            .dispatch(&envelope, &target, caller_user_agent.as_deref())
            .await?;
        tracing::debug!(status = upstream.status().as_u16(), "upstream answered");

        self.gate(&envelope, &upstream)?;

        Ok(self.stream(upstream))
    }

    /// Validation phase: policy checks in order, first failure wins.
    fn validate(&self, envelope: &ProxyEnvelope) -> Result<Url> {
        let target = Url::parse(&envelope.url).map_err(|e| RelayError::Validation {
            reason: format!("target url does not parse: {e}"),
        })?;

        if target.scheme() != "http" && target.scheme() != "https" {
            return Err(RelayError::Validation {
                reason: format!("scheme {} is not relayable", target.scheme()),
            });
        }

        if target.host_str().map_or(true, str::is_empty) {
            return Err(RelayError::Validation {
                reason: "target url has no hostname".to_string(),
            });
        }

        let port = effective_port(&target).ok_or_else(|| RelayError::Validation {
            reason: "target url has no resolvable port".to_string(),
        })?;
        if !self.policy.port_allowed(port) {
            return Err(RelayError::Validation {
                reason: format!("port {port} is not allowed"),
            });
        }

        if !self.policy.method_allowed(&envelope.method) {
            return Err(RelayError::MethodNotAllowed {
                method: envelope.method.clone(),
            });
        }

        Ok(target)
    }

    /// Forwarding phase: the real outbound call.
    async fn dispatch(
        &self,
        envelope: &ProxyEnvelope,
        target: &Url,
        caller_user_agent: Option<&str>,
    ) -> Result<reqwest::Response> {
        let method = reqwest::Method::from_bytes(envelope.method.to_uppercase().as_bytes())
            .map_err(|_| RelayError::Validation {
                reason: format!("invalid HTTP method {}", envelope.method),
            })?;

        let mut headers = HeaderMap::new();
        for (key, value) in outbound_headers(envelope, target, caller_user_agent) {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                RelayError::Validation {
                    reason: format!("invalid header name {key}"),
                }
            })?;
            let value = HeaderValue::from_str(&value).map_err(|_| RelayError::Validation {
                reason: format!("invalid value for header {key}"),
            })?;
            headers.insert(name, value);
        }

        let mut outbound = self.client.request(method, target.clone()).headers(headers);
        if let Some(body) = envelope.decode_body()? {
            outbound = outbound.body(body);
        }

        outbound.send().await.map_err(|e| RelayError::Upstream {
            status: None,
            message: e.to_string(),
        })
    }

    /// Gating phase: runs once headers arrive, before any body byte moves.
    fn gate(&self, envelope: &ProxyEnvelope, upstream: &reqwest::Response) -> Result<()> {
        let status = upstream.status();
        if !status.is_success() {
            return Err(RelayError::Upstream {
                status: Some(status.as_u16()),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        if !envelope.allowed_mimes.is_empty() {
            let mime = upstream
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(primary_mime);
            match mime {
                Some(ref mime) if envelope.allowed_mimes.iter().any(|m| m.to_lowercase() == *mime) => {}
                other => return Err(RelayError::MimeNotAllowed { mime: other }),
            }
        }

        if let Some(declared) = upstream
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
        {
            if declared > self.policy.max_content_length {
                return Err(RelayError::ContentTooLarge {
                    length: declared,
                    limit: self.policy.max_content_length,
                });
            }
        }

        Ok(())
    }

    /// Streaming phase: mirror status and headers, relay chunks under the cap.
    fn stream(&self, upstream: reqwest::Response) -> Response {
        let mut builder = Response::builder().status(upstream.status());

        let mut has_content_type = false;
        for (name, value) in upstream.headers() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            if *name == header::CONTENT_TYPE {
                has_content_type = true;
            }
            builder = builder.header(name, value);
        }
        if !has_content_type {
            builder = builder.header(header::CONTENT_TYPE, constants::FALLBACK_CONTENT_TYPE);
        }

        let body = Body::from_stream(capped_stream(upstream, self.policy.max_content_length));

        builder.body(body).unwrap_or_else(|_| Response::default())
    }
}

impl Default for ProxyForwarder {
    fn default() -> Self {
        Self::new()
    }
}

/// Relay the upstream body, aborting once the running counter passes `limit`.
///
/// Status and headers are already flushed when an overflow is detected, so
/// the abort is a hard truncation of the open response, not a clean 413;
/// dropping the upstream response cancels the rest of the transfer.
fn capped_stream(
    upstream: reqwest::Response,
    limit: u64,
) -> impl futures::Stream<Item = io::Result<Bytes>> {
    upstream.bytes_stream().scan((0u64, false), move |state, chunk| {
        let (streamed, done) = state;
        if *done {
            return future::ready(None);
        }
        let item = match chunk {
            Ok(chunk) => {
                *streamed += chunk.len() as u64;
                if *streamed > limit {
                    *done = true;
                    tracing::warn!(streamed = *streamed, limit, "response exceeded byte cap mid-stream");
                    Err(io::Error::new(
                        io::ErrorKind::Other,
                        "relayed content exceeded the configured byte cap",
                    ))
                } else {
                    Ok(chunk)
                }
            }
            Err(e) => {
                *done = true;
                Err(io::Error::new(io::ErrorKind::Other, e.to_string()))
            }
        };
        future::ready(Some(item))
    })
}

/// Axum handler: one relay request in, one response out, no exceptions.
async fn handle(State(forwarder): State<ProxyForwarder>, request: Request) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::debug_span!("relay", id = %request_id);

    match forwarder.forward(request).instrument(span).await {
        Ok(response) => response,
        Err(error) => rejection(error, request_id),
    }
}

/// Map a failure to the minimal policy response, keeping detail server-side.
fn rejection(error: RelayError, request_id: Uuid) -> Response {
    let status = error.relay_status();
    if status == 500 {
        tracing::error!(%request_id, %error, "relay request failed unexpectedly");
    } else {
        tracing::warn!(%request_id, %error, status, "relay request rejected");
    }

    Response::builder()
        .status(StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
        .body(Body::empty())
        .unwrap_or_else(|_| Response::default())
}
