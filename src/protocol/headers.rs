//! Shared header and policy helpers.
//!
//! Pure functions used by both the client and the forwarder: mime token
//! extraction, effective-port resolution, referer synthesis, outbound header
//! assembly, and the classification of hop-by-hop headers that must not be
//! mirrored downstream.
//!
//! # Examples
//!
//! ```
//! use relay_axum_http::protocol::{primary_mime, is_success_status};
//!
//! assert_eq!(primary_mime("Text/HTML; charset=utf-8"), "text/html");
//! assert!(is_success_status(204));
//! assert!(!is_success_status(301));
//! ```

use crate::protocol::{constants, ProxyEnvelope};
use std::collections::BTreeMap;
use url::Url;

/// Extract the primary mime token from a `content-type` value.
///
/// Drops any parameters after `;`, trims whitespace, and lowercases the
/// result so allow-list membership is case-insensitive.
pub fn primary_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// The port a URL resolves to: explicit, or 80/443 by scheme.
pub fn effective_port(url: &Url) -> Option<u16> {
    url.port_or_known_default()
}

/// Whether a status code is in the 200-299 success range.
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Synthesize the referer sent upstream from the target URL itself.
///
/// Format: `scheme://host[:explicit-port]path?query` — default ports are
/// omitted, matching what a page at the target's origin would send.
pub fn synthesize_referer(url: &Url) -> String {
    let query = url
        .query()
        .map(|q| format!("?{q}"))
        .unwrap_or_default();
    format!(
        "{}{}{}",
        url.origin().ascii_serialization(),
        url.path(),
        query
    )
}

/// Assemble the headers for the forwarder's outbound call.
///
/// Starts from `{user-agent, referer}` — the user agent taken from the
/// relay's caller when it supplied one — then merges the envelope's headers
/// on top, envelope values overriding the synthesized pair.
pub fn outbound_headers(
    envelope: &ProxyEnvelope,
    target: &Url,
    caller_user_agent: Option<&str>,
) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert(
        "user-agent".to_string(),
        caller_user_agent
            .unwrap_or(constants::DEFAULT_USER_AGENT)
            .to_string(),
    );
    headers.insert("referer".to_string(), synthesize_referer(target));

    for (key, value) in &envelope.headers {
        headers.insert(key.to_lowercase(), value.clone());
    }

    headers
}

/// Whether a header is hop-by-hop and must not be mirrored downstream.
pub fn is_hop_by_hop(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}
