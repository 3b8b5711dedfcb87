#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Module Structure
//!
//! - **[types]** - Request descriptors and the staged response record
//! - **[error]** - The closed `RelayError` taxonomy and result handling
//! - **[client]** - Direct and relayed fetch operations over one pipeline
//! - **[server]** - The validating streaming forwarder (Axum)
//! - **[protocol]** - Wire constants, the proxy envelope, shared header helpers
//!
//! # Overview
//!
//! The crate is one trust boundary with two sides. The client side
//! ([`RelayClient`]) issues fetches — directly, or by POSTing a
//! [`ProxyEnvelope`] to the same-origin relay path — and runs every response
//! through the same staged pipeline: status gate, body accumulation, text
//! decoding, JSON parsing. The server side ([`ProxyForwarder`]) receives
//! envelopes, enforces an immutable [`PolicyConfig`] (scheme, port, method,
//! mime, size), performs the real outbound call, and streams the result back
//! under a hard byte cap.
//!
//! Client failures reject with a fully populated [`RelayError`]; forwarder
//! failures never leave the request handler — each becomes a bare mapped
//! status code, with detail kept server-side.

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod types;

pub use client::{ClientConfig, RelayClient};
pub use error::{RelayError, Result};
pub use protocol::ProxyEnvelope;
pub use server::{PolicyConfig, ProxyForwarder};
pub use types::{FetchRequest, FetchResponse, ResponseBody};

#[cfg(test)]
mod tests;
