//! Utility functions for the relay client.

use crate::error::{RelayError, Result};
use std::future::Future;
use tokio::task::JoinHandle;
use url::Url;

/// Resolve a target URL against a base origin.
///
/// Absolute targets pass through untouched; relative ones (including
/// `./sibling` forms) resolve the way a browser resolves them against the
/// page location.
///
/// # Examples
///
/// ```
/// use relay_axum_http::client::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("http://localhost:3042/app/").unwrap();
/// let resolved = resolve_url(&base, "./echo-headers").unwrap();
/// assert_eq!(resolved.as_str(), "http://localhost:3042/app/echo-headers");
/// ```
pub fn resolve_url(base: &Url, target: &str) -> Result<Url> {
    base.join(target).map_err(|e| RelayError::Validation {
        reason: format!("cannot resolve {target}: {e}"),
    })
}

/// Adapt a future-returning operation to a trailing completion callback.
///
/// The single asynchronous primitive stays future-based; this is the thin
/// compatibility shim for callers that want `(error, value)` delivery. The
/// callback runs on a spawned task once the operation settles.
///
/// # Examples
///
/// ```ignore
/// use relay_axum_http::client::{spawn_callback, RelayClient};
///
/// let client = RelayClient::new(origin);
/// let url = "/samples/data.json".to_string();
/// spawn_callback(
///     async move { client.get_json(&url).await },
///     |result| match result {
///         Ok(value) => println!("value: {value}"),
///         Err(error) => eprintln!("failed: {error}"),
///     },
/// );
/// ```
pub fn spawn_callback<T, Fut, F>(future: Fut, callback: F) -> JoinHandle<()>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    F: FnOnce(Result<T>) + Send + 'static,
{
    tokio::spawn(async move {
        callback(future.await);
    })
}
