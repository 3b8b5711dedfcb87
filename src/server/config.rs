//! Forwarder policy configuration.

use crate::protocol::constants;
use std::collections::HashSet;

/// The policy a [`ProxyForwarder`](crate::server::ProxyForwarder) enforces.
///
/// Created once at forwarder construction and never mutated afterwards; all
/// concurrent requests share it behind an `Arc`.
///
/// # Defaults
///
/// - `max_content_length`: 5 MiB
/// - `allowed_ports`: {80, 443}
/// - `allowed_methods`: {GET}
/// - `user_agent`: the default relay user agent
/// - `max_envelope_length`: 1 MiB
///
/// # Examples
///
/// ```
/// use relay_axum_http::PolicyConfig;
///
/// let policy = PolicyConfig::new()
///     .allow_port(8080)
///     .allow_method("POST")
///     .with_max_content_length(1024 * 1024);
///
/// assert!(policy.port_allowed(8080));
/// assert!(policy.port_allowed(443));
/// assert!(policy.method_allowed("post"));
/// assert!(!policy.method_allowed("DELETE"));
/// ```
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Hard cap on relayed response bodies, in bytes
    pub max_content_length: u64,
    /// Cap on the inbound envelope itself, in bytes
    pub max_envelope_length: usize,
    /// Ports the relay will contact
    pub allowed_ports: HashSet<u16>,
    /// Methods the relay will forward, uppercase
    pub allowed_methods: HashSet<String>,
    /// User agent sent upstream when the caller supplied none
    pub user_agent: String,
}

impl PolicyConfig {
    /// Policy with the default limits and allow-lists.
    pub fn new() -> Self {
        PolicyConfig {
            max_content_length: constants::DEFAULT_MAX_CONTENT_LENGTH,
            max_envelope_length: constants::DEFAULT_MAX_ENVELOPE_LENGTH,
            allowed_ports: constants::DEFAULT_ALLOWED_PORTS.into_iter().collect(),
            allowed_methods: constants::DEFAULT_ALLOWED_METHODS
                .into_iter()
                .map(str::to_string)
                .collect(),
            user_agent: constants::DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set the response byte cap.
    #[must_use]
    pub fn with_max_content_length(mut self, bytes: u64) -> Self {
        self.max_content_length = bytes;
        self
    }

    /// Add a port to the allow-list.
    #[must_use]
    pub fn allow_port(mut self, port: u16) -> Self {
        self.allowed_ports.insert(port);
        self
    }

    /// Add a method to the allow-list (stored uppercase).
    #[must_use]
    pub fn allow_method(mut self, method: &str) -> Self {
        self.allowed_methods.insert(method.to_uppercase());
        self
    }

    /// Set the fallback user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Whether the policy permits contacting the given port.
    pub fn port_allowed(&self, port: u16) -> bool {
        self.allowed_ports.contains(&port)
    }

    /// Whether the policy permits forwarding the given method.
    pub fn method_allowed(&self, method: &str) -> bool {
        self.allowed_methods.contains(&method.to_uppercase())
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.max_content_length, 5 * 1024 * 1024);
        assert!(policy.port_allowed(80));
        assert!(policy.port_allowed(443));
        assert!(!policy.port_allowed(6666));
        assert!(policy.method_allowed("GET"));
        assert!(!policy.method_allowed("PUT"));
    }

    #[test]
    fn test_method_check_case_insensitive() {
        let policy = PolicyConfig::new().allow_method("post");
        assert!(policy.method_allowed("POST"));
        assert!(policy.method_allowed("Post"));
    }
}
