//! Core types for the relay fetch protocol.
//!
//! [`FetchRequest`] describes an outbound request (direct or relayed) and is
//! immutable once built. [`FetchResponse`] is the record the client pipeline
//! transforms stage by stage: its [`ResponseBody`] holds exactly one
//! representation at a time — an unread chunk stream, raw bytes, text, or a
//! parsed JSON value — and each decoding stage replaces it rather than
//! duplicating it.

use crate::error::{RelayError, Result};
use bytes::Bytes;
use std::collections::BTreeMap;

/// Description of a single HTTP request.
///
/// Built once with the fluent methods below, then consumed by
/// [`RelayClient`](crate::client::RelayClient) operations. Header keys are
/// normalized to lowercase on insertion.
///
/// # Examples
///
/// ```
/// use relay_axum_http::FetchRequest;
///
/// let request = FetchRequest::new("/api/items")
///     .with_method("POST")
///     .with_header("Content-Type", "application/json")
///     .with_body(r#"{"name": "sample"}"#.as_bytes().to_vec());
///
/// assert_eq!(request.method, "POST");
/// assert!(request.headers.contains_key("content-type"));
/// ```
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Target URL, absolute or relative to the client's base origin
    pub url: String,
    /// HTTP method, uppercase
    pub method: String,
    /// Additional request headers, keys lowercase
    pub headers: BTreeMap<String, String>,
    /// Request body bytes, if any
    pub body: Option<Bytes>,
}

impl FetchRequest {
    /// Create a GET request for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        FetchRequest {
            url: url.into(),
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into().to_uppercase();
        self
    }

    /// Add a request header. The key is normalized to lowercase.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into().to_lowercase(), value.into());
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// The single body representation carried by a [`FetchResponse`].
///
/// Pipeline stages move the body strictly forward through these variants:
/// `Stream` → `Raw` → `Text` → `Json`. The earlier representation is
/// consumed; it never coexists with the later one.
#[derive(Debug)]
pub enum ResponseBody {
    /// Unread chunk stream, as delivered by the transport
    Stream(reqwest::Response),
    /// Fully accumulated raw bytes
    Raw(Bytes),
    /// UTF-8 decoded text
    Text(String),
    /// Parsed JSON value
    Json(serde_json::Value),
}

/// A response moving through the client pipeline.
///
/// Created when the outbound call's headers arrive, transformed by the
/// pipeline stages in strict sequence, and discarded once the caller receives
/// the final value or error.
#[derive(Debug)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Status message for the code (canonical reason phrase)
    pub status_message: String,
    /// Response headers, keys lowercase
    pub headers: BTreeMap<String, String>,
    /// Body in its current representation
    pub body: ResponseBody,
}

impl FetchResponse {
    /// Capture an in-flight transport response, leaving the body unread.
    pub fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let status_message = response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string();

        let mut headers = BTreeMap::new();
        for (key, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(key.as_str().to_string(), value.to_string());
            }
        }

        FetchResponse {
            status,
            status_message,
            headers,
            body: ResponseBody::Stream(response),
        }
    }

    /// Build a response record from already-decoded parts.
    pub fn from_parts(
        status: u16,
        headers: BTreeMap<String, String>,
        body: ResponseBody,
    ) -> Self {
        FetchResponse {
            status,
            status_message: http::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or_default()
                .to_string(),
            headers,
            body,
        }
    }

    /// Unwrap the accumulated raw bytes, discarding the envelope.
    pub fn into_raw(self) -> Result<Bytes> {
        match self.body {
            ResponseBody::Raw(bytes) => Ok(bytes),
            other => Err(RelayError::Internal(format!(
                "expected raw body, found {}",
                body_kind(&other)
            ))),
        }
    }

    /// Unwrap the decoded text, discarding the envelope.
    pub fn into_text(self) -> Result<String> {
        match self.body {
            ResponseBody::Text(text) => Ok(text),
            other => Err(RelayError::Internal(format!(
                "expected text body, found {}",
                body_kind(&other)
            ))),
        }
    }

    /// Unwrap the parsed JSON value, discarding the envelope.
    pub fn into_json(self) -> Result<serde_json::Value> {
        match self.body {
            ResponseBody::Json(value) => Ok(value),
            other => Err(RelayError::Internal(format!(
                "expected JSON body, found {}",
                body_kind(&other)
            ))),
        }
    }
}

fn body_kind(body: &ResponseBody) -> &'static str {
    match body {
        ResponseBody::Stream(_) => "an unread stream",
        ResponseBody::Raw(_) => "raw bytes",
        ResponseBody::Text(_) => "text",
        ResponseBody::Json(_) => "JSON",
    }
}
