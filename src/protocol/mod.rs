//! Protocol constants and wire-level helpers.
//!
//! This module holds everything both sides of the relay agree on: the
//! [`constants`] (default relay path, policy defaults, the relay user agent),
//! the [`ProxyEnvelope`] wire codec, and the pure header helpers shared by
//! the client and the forwarder.

mod envelope;
mod headers;

pub use envelope::ProxyEnvelope;
pub use headers::{
    effective_port, is_hop_by_hop, is_success_status, outbound_headers, primary_mime,
    synthesize_referer,
};

/// Wire-level constants shared by the client and the forwarder.
pub mod constants {
    /// Path the relay is mounted on, relative to the page origin
    pub const DEFAULT_RELAY_PATH: &str = "/proxy";

    /// Hard cap on relayed response bodies: 5 MiB
    pub const DEFAULT_MAX_CONTENT_LENGTH: u64 = 5 * 1024 * 1024;

    /// Cap on the inbound envelope itself: 1 MiB
    pub const DEFAULT_MAX_ENVELOPE_LENGTH: usize = 1024 * 1024;

    /// Ports the relay will contact unless configured otherwise
    pub const DEFAULT_ALLOWED_PORTS: [u16; 2] = [80, 443];

    /// Methods the relay will forward unless configured otherwise
    pub const DEFAULT_ALLOWED_METHODS: [&str; 1] = ["GET"];

    /// User agent sent upstream when the relay's caller did not supply one
    pub const DEFAULT_USER_AGENT: &str = "Relay Proxy Server";

    /// Content type of the envelope POST
    pub const ENVELOPE_CONTENT_TYPE: &str = "application/json";

    /// Content type mirrored downstream when the upstream sent none
    pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
}
