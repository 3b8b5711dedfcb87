//! Relay server (Axum) integration.
//!
//! The server half of the proxy fetch protocol: a [`ProxyForwarder`] that
//! validates incoming [`ProxyEnvelope`](crate::ProxyEnvelope)s against an
//! immutable [`PolicyConfig`], performs the real outbound call, and streams
//! the result back under a hard byte cap.
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ProxyForwarder`] | Per-request validate/forward/gate/stream handler |
//! | [`PolicyConfig`] | Ports, methods, size caps and the fallback user agent |
//!
//! # Examples
//!
//! ```ignore
//! use relay_axum_http::{PolicyConfig, ProxyForwarder};
//!
//! let forwarder = ProxyForwarder::with_policy(PolicyConfig::new());
//! let app = forwarder.router("/proxy");
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3042").await?;
//! axum::serve(listener, app).await?;
//! ```

mod config;
mod forwarder;

pub use config::PolicyConfig;
pub use forwarder::ProxyForwarder;
