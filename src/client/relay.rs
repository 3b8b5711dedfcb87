//! Relayed fetch operations.
//!
//! These mirror the direct operations on [`RelayClient`], but route the
//! request through the same-origin relay: the target is resolved against the
//! base origin, wrapped into a [`ProxyEnvelope`], and POSTed as JSON to the
//! configured relay path. The relay's response then runs through the exact
//! same pipeline, so errors it produces are indistinguishable in shape from
//! direct-fetch errors — only the originating status differs.

use crate::client::{pipeline, utils, RelayClient};
use crate::error::{RelayError, Result};
use crate::protocol::ProxyEnvelope;
use crate::types::{FetchRequest, FetchResponse};
use bytes::Bytes;
use tokio::task::JoinHandle;

impl RelayClient {
    /// Retrieve a resource as raw bytes through the relay.
    ///
    /// `allowed_mimes` restricts what the relay will forward back; an empty
    /// slice means no restriction.
    pub async fn get_raw_via_relay(&self, url: &str, allowed_mimes: &[&str]) -> Result<Bytes> {
        let outcome = async {
            let response = pipeline::gate_status(
                self.send_via_relay(&FetchRequest::new(url), allowed_mimes)
                    .await?,
            )?;
            pipeline::read_body(response).await?.into_raw()
        }
        .await;
        self.conclude("get_raw_via_relay", url, outcome)
    }

    /// Retrieve a resource as a UTF-8 string through the relay.
    pub async fn get_text_via_relay(&self, url: &str, allowed_mimes: &[&str]) -> Result<String> {
        let outcome = async {
            let response = pipeline::gate_status(
                self.send_via_relay(&FetchRequest::new(url), allowed_mimes)
                    .await?,
            )?;
            let response = pipeline::read_body(response).await?;
            pipeline::body_to_text(response)?.into_text()
        }
        .await;
        self.conclude("get_text_via_relay", url, outcome)
    }

    /// Retrieve and parse a JSON resource through the relay.
    pub async fn get_json_via_relay(
        &self,
        url: &str,
        allowed_mimes: &[&str],
    ) -> Result<serde_json::Value> {
        let outcome = async {
            let response = pipeline::gate_status(
                self.send_via_relay(&FetchRequest::new(url), allowed_mimes)
                    .await?,
            )?;
            let response = pipeline::read_body(response).await?;
            pipeline::body_parse_json(response)?.into_json()
        }
        .await;
        self.conclude("get_json_via_relay", url, outcome)
    }

    /// Make an arbitrary HTTP request through the relay.
    ///
    /// The request body, if any, travels base64-encoded inside the envelope
    /// and is restored byte-for-byte before the relay forwards it.
    pub async fn request_via_relay(
        &self,
        request: FetchRequest,
        allowed_mimes: &[&str],
    ) -> Result<Bytes> {
        let url = request.url.clone();
        let outcome = async {
            let response =
                pipeline::gate_status(self.send_via_relay(&request, allowed_mimes).await?)?;
            pipeline::read_body(response).await?.into_raw()
        }
        .await;
        self.conclude("request_via_relay", &url, outcome)
    }

    /// Callback form of [`get_raw_via_relay`](Self::get_raw_via_relay).
    pub fn get_raw_via_relay_callback<F>(
        &self,
        url: &str,
        allowed_mimes: &[&str],
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<Bytes>) + Send + 'static,
    {
        let client = self.clone();
        let url = url.to_string();
        let mimes: Vec<String> = allowed_mimes.iter().map(|m| m.to_string()).collect();
        utils::spawn_callback(
            async move {
                let mimes: Vec<&str> = mimes.iter().map(String::as_str).collect();
                client.get_raw_via_relay(&url, &mimes).await
            },
            callback,
        )
    }

    /// Callback form of [`get_text_via_relay`](Self::get_text_via_relay).
    pub fn get_text_via_relay_callback<F>(
        &self,
        url: &str,
        allowed_mimes: &[&str],
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<String>) + Send + 'static,
    {
        let client = self.clone();
        let url = url.to_string();
        let mimes: Vec<String> = allowed_mimes.iter().map(|m| m.to_string()).collect();
        utils::spawn_callback(
            async move {
                let mimes: Vec<&str> = mimes.iter().map(String::as_str).collect();
                client.get_text_via_relay(&url, &mimes).await
            },
            callback,
        )
    }

    /// Callback form of [`get_json_via_relay`](Self::get_json_via_relay).
    pub fn get_json_via_relay_callback<F>(
        &self,
        url: &str,
        allowed_mimes: &[&str],
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<serde_json::Value>) + Send + 'static,
    {
        let client = self.clone();
        let url = url.to_string();
        let mimes: Vec<String> = allowed_mimes.iter().map(|m| m.to_string()).collect();
        utils::spawn_callback(
            async move {
                let mimes: Vec<&str> = mimes.iter().map(String::as_str).collect();
                client.get_json_via_relay(&url, &mimes).await
            },
            callback,
        )
    }

    /// Callback form of [`request_via_relay`](Self::request_via_relay).
    pub fn request_via_relay_callback<F>(
        &self,
        request: FetchRequest,
        allowed_mimes: &[&str],
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<Bytes>) + Send + 'static,
    {
        let client = self.clone();
        let mimes: Vec<String> = allowed_mimes.iter().map(|m| m.to_string()).collect();
        utils::spawn_callback(
            async move {
                let mimes: Vec<&str> = mimes.iter().map(String::as_str).collect();
                client.request_via_relay(request, &mimes).await
            },
            callback,
        )
    }

    /// Serialize the request into an envelope and POST it to the relay.
    ///
    /// The relay endpoint comes from the client's own origin and path; the
    /// target URL never influences where the envelope is sent.
    async fn send_via_relay(
        &self,
        request: &FetchRequest,
        allowed_mimes: &[&str],
    ) -> Result<FetchResponse> {
        let target = utils::resolve_url(&self.config.base_origin, &request.url)?;
        let relay_endpoint =
            utils::resolve_url(&self.config.base_origin, &self.config.relay_path)?;

        let envelope = ProxyEnvelope::from_request(&target, request, allowed_mimes);

        let response = self
            .client
            .post(relay_endpoint)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| RelayError::Connection(e.to_string()))?;

        Ok(FetchResponse::from_response(response))
    }
}
