//! Error types for the relay fetch protocol.
//!
//! Every failure in this crate is one variant of the closed [`RelayError`]
//! taxonomy. Client-side operations reject with a fully populated variant and
//! never recover locally; the forwarder recovers every failure into an HTTP
//! status code via [`RelayError::relay_status`].
//!
//! # Taxonomy
//!
//! | Variant | Side | Meaning |
//! |---------|------|---------|
//! | [`Connection`](RelayError::Connection) | client | No response was received at all |
//! | [`HttpStatus`](RelayError::HttpStatus) | client | A response arrived with a non-2xx status |
//! | [`InvalidJson`](RelayError::InvalidJson) | client | Body decoded but did not parse as JSON |
//! | [`Validation`](RelayError::Validation) | relay | Malformed or policy-violating envelope (400) |
//! | [`MethodNotAllowed`](RelayError::MethodNotAllowed) | relay | Forwarded method outside the allow-list (405) |
//! | [`MimeNotAllowed`](RelayError::MimeNotAllowed) | relay | Upstream mime outside the caller's allow-list (406) |
//! | [`ContentTooLarge`](RelayError::ContentTooLarge) | relay | Declared length over the byte cap (413) |
//! | [`Upstream`](RelayError::Upstream) | relay | Outbound call failed or answered non-2xx (502) |
//! | [`Internal`](RelayError::Internal) | relay | Unclassified failure, logged not surfaced (500) |
//! | [`Operation`](RelayError::Operation) | client | Context wrapper naming the operation and target URL |

use thiserror::Error;

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Error type covering both fetch pipelines and the forwarder.
///
/// The taxonomy is closed: every failure path in the crate constructs one of
/// these variants, never a bare message. Client operations wrap stage failures
/// in [`RelayError::Operation`] to prefix the operation name and target URL
/// while keeping the original variant reachable through `source()`.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Transport-level failure: the request never produced a response.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A response arrived, but its status was outside the 200-299 range.
    #[error("unexpected HTTP status {code} {message}")]
    HttpStatus {
        /// Status code of whichever endpoint answered
        code: u16,
        /// Status message associated with the code
        message: String,
    },

    /// The response body decoded to text but is not valid JSON.
    ///
    /// The status of the original (successful) response is preserved so
    /// callers can still inspect it.
    #[error("response is not valid JSON (HTTP {status_code} {status_message}): {source}")]
    InvalidJson {
        /// Status code of the response whose body failed to parse
        status_code: u16,
        /// Status message of that response
        status_message: String,
        /// The underlying parse failure
        #[source]
        source: serde_json::Error,
    },

    /// The relay envelope was malformed or violated the port/scheme policy.
    #[error("invalid relay request: {reason}")]
    Validation {
        /// What the envelope got wrong
        reason: String,
    },

    /// The envelope asked the relay to forward a method outside the allow-list.
    #[error("method {method} is not allowed by the relay policy")]
    MethodNotAllowed {
        /// The rejected method
        method: String,
    },

    /// The upstream content type is not in the caller's mime allow-list.
    #[error("content type {} is not allowed", .mime.as_deref().unwrap_or("(missing)"))]
    MimeNotAllowed {
        /// The upstream's primary mime token, if it sent one
        mime: Option<String>,
    },

    /// The upstream declared or produced more bytes than the configured cap.
    #[error("content length {length} exceeds the {limit} byte limit")]
    ContentTooLarge {
        /// Declared or observed byte count
        length: u64,
        /// The configured `max_content_length`
        limit: u64,
    },

    /// The outbound call failed to connect, or answered with a non-2xx status.
    #[error("upstream request failed: {message}")]
    Upstream {
        /// Upstream status code, when a response was received
        status: Option<u16>,
        /// Upstream status message or transport error text
        message: String,
    },

    /// Unclassified failure inside the forwarder. Logged for the operator;
    /// callers only ever see the mapped 500.
    #[error("internal relay error: {0}")]
    Internal(String),

    /// Context wrapper added by public client operations.
    #[error("{operation} {url}: {source}")]
    Operation {
        /// The public operation that failed (e.g. `get_json`)
        operation: &'static str,
        /// The target URL as the caller supplied it
        url: String,
        /// The original failure, fields intact
        #[source]
        source: Box<RelayError>,
    },
}

impl RelayError {
    /// Wrap this error with the public operation name and target URL.
    ///
    /// The original variant stays reachable through `source()` and through
    /// the accessors below; only the rendered message changes.
    #[must_use]
    pub fn context(self, operation: &'static str, url: &str) -> Self {
        RelayError::Operation {
            operation,
            url: url.to_string(),
            source: Box::new(self),
        }
    }

    /// The HTTP status code attached to this error, if any.
    ///
    /// Sees through [`RelayError::Operation`] wrappers, so a caller holding a
    /// contextualized error can still check the machine-readable code.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RelayError::HttpStatus { code, .. } => Some(*code),
            RelayError::InvalidJson { status_code, .. } => Some(*status_code),
            RelayError::Upstream { status, .. } => *status,
            RelayError::Operation { source, .. } => source.status_code(),
            _ => None,
        }
    }

    /// The status message attached to this error, if any.
    pub fn status_message(&self) -> Option<&str> {
        match self {
            RelayError::HttpStatus { message, .. } => Some(message),
            RelayError::InvalidJson { status_message, .. } => Some(status_message),
            RelayError::Upstream { message, .. } => Some(message),
            RelayError::Operation { source, .. } => source.status_message(),
            _ => None,
        }
    }

    /// The HTTP status the relay answers with when this error rejects a
    /// forwarded request.
    ///
    /// Client-side variants never cross the trust boundary; anything the
    /// forwarder did not classify maps to 500.
    pub fn relay_status(&self) -> u16 {
        match self {
            RelayError::Validation { .. } => 400,
            RelayError::MethodNotAllowed { .. } => 405,
            RelayError::MimeNotAllowed { .. } => 406,
            RelayError::ContentTooLarge { .. } => 413,
            RelayError::Upstream { .. } => 502,
            _ => 500,
        }
    }

    /// Whether this is a client-side connection failure.
    pub fn is_connection(&self) -> bool {
        match self {
            RelayError::Connection(_) => true,
            RelayError::Operation { source, .. } => source.is_connection(),
            _ => false,
        }
    }
}
