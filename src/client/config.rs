//! Client configuration.

use crate::protocol::constants;
use url::Url;

/// Configuration for a [`RelayClient`](crate::client::RelayClient).
///
/// The client carries its configuration explicitly — there is no process-wide
/// mutable state. `base_origin` plays the role the page location plays in a
/// browser: relative target URLs resolve against it, and the relay endpoint
/// is always `base_origin` + `relay_path`, regardless of where the target
/// points.
///
/// # Examples
///
/// ```
/// use relay_axum_http::ClientConfig;
/// use url::Url;
///
/// let config = ClientConfig {
///     relay_path: "/relay".to_string(),
///     ..ClientConfig::new(Url::parse("https://app.example.com/").unwrap())
/// };
/// assert_eq!(config.relay_path, "/relay");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin that relative URLs resolve against and that hosts the relay
    pub base_origin: Url,
    /// Path of the relay on the base origin
    pub relay_path: String,
    /// Connection pool size per host
    pub pool_max_idle_per_host: usize,
    /// Emit tracing warnings on failed operations
    pub enable_logging: bool,
}

impl ClientConfig {
    /// Configuration with defaults for the given base origin.
    pub fn new(base_origin: Url) -> Self {
        ClientConfig {
            base_origin,
            relay_path: constants::DEFAULT_RELAY_PATH.to_string(),
            pool_max_idle_per_host: 16,
            enable_logging: true,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Url::parse("http://localhost/").expect("static origin parses"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_relay_path() {
        let config = ClientConfig::default();
        assert_eq!(config.relay_path, "/proxy");
    }
}
