//! The JSON envelope carried by a relayed request.
//!
//! A [`ProxyEnvelope`] is the wire form of a [`FetchRequest`] plus the
//! caller's mime allow-list. It is POSTed to the relay path as a single JSON
//! object and consumed exactly once by the forwarder.
//!
//! # Wire format
//!
//! ```json
//! { "url": "https://example.com/image.png",
//!   "method": "GET",
//!   "headers": {"x-custom": "value"},
//!   "allowedMimes": ["image/png"],
//!   "body": null }
//! ```
//!
//! `body`, when present, is standard base64 of the raw request bytes, keeping
//! the envelope printable for arbitrary binary payloads. Absent fields take
//! the defaults above; a missing or empty `url` fails the decode.

use crate::error::{RelayError, Result};
use crate::types::FetchRequest;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Wire form of a relayed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEnvelope {
    /// Absolute target URL
    pub url: String,

    /// HTTP method to forward
    #[serde(default = "default_method")]
    pub method: String,

    /// Extra headers to send upstream, keys lowercase
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Mime allow-list for the upstream response; empty means unrestricted
    #[serde(default)]
    pub allowed_mimes: Vec<String>,

    /// Base64-encoded request body, or `null`
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl ProxyEnvelope {
    /// Build an envelope from a resolved target and a request descriptor.
    pub fn from_request(target: &Url, request: &FetchRequest, allowed_mimes: &[&str]) -> Self {
        ProxyEnvelope {
            url: target.to_string(),
            method: request.method.clone(),
            headers: request.headers.clone(),
            allowed_mimes: allowed_mimes.iter().map(|m| m.to_lowercase()).collect(),
            body: request.body.as_ref().map(|body| BASE64.encode(body)),
        }
    }

    /// Decode an envelope from the relay request's body bytes.
    ///
    /// Fails with [`RelayError::Validation`] when the body is not JSON, is
    /// not an object of this shape, or carries an empty `url`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let envelope: ProxyEnvelope =
            serde_json::from_slice(bytes).map_err(|e| RelayError::Validation {
                reason: format!("envelope is not valid JSON: {e}"),
            })?;

        if envelope.url.is_empty() {
            return Err(RelayError::Validation {
                reason: "envelope url is empty".to_string(),
            });
        }

        Ok(envelope)
    }

    /// Decode the transported request body back into raw bytes.
    pub fn decode_body(&self) -> Result<Option<Bytes>> {
        match &self.body {
            None => Ok(None),
            Some(encoded) => BASE64
                .decode(encoded)
                .map(|bytes| Some(Bytes::from(bytes)))
                .map_err(|e| RelayError::Validation {
                    reason: format!("envelope body is not valid base64: {e}"),
                }),
        }
    }
}
