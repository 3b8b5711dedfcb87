//! End-to-end tests of the direct and relayed fetch paths against real
//! servers on ephemeral ports.

mod common;

use common::{port_of, spawn_origin, spawn_relay, BINARY_SAMPLE, TEXT_SAMPLE};
use relay_axum_http::{FetchRequest, PolicyConfig, RelayClient, RelayError};
use url::Url;

fn client_for(origin: &str) -> RelayClient {
    RelayClient::new(Url::parse(origin).unwrap())
}

#[tokio::test]
async fn direct_get_raw_preserves_binary_bytes() {
    let origin = spawn_origin().await;
    let client = client_for(&origin);

    let bytes = client.get_raw("/samples/binary.bin").await.unwrap();
    assert_eq!(&bytes[..], &BINARY_SAMPLE);
}

#[tokio::test]
async fn direct_get_text() {
    let origin = spawn_origin().await;
    let client = client_for(&origin);

    let text = client.get_text("/samples/text-ascii.txt").await.unwrap();
    assert_eq!(text, TEXT_SAMPLE);
}

#[tokio::test]
async fn direct_get_json() {
    let origin = spawn_origin().await;
    let client = client_for(&origin);

    let value = client.get_json("/samples/json-ok.json").await.unwrap();
    assert_eq!(value["test"], "ok");
}

#[tokio::test]
async fn direct_get_json_reports_corrupted_body() {
    let origin = spawn_origin().await;
    let client = client_for(&origin);

    let err = client
        .get_json("/samples/json-corrupted.json")
        .await
        .unwrap_err();

    // The fetch itself succeeded, so the original status survives on the error.
    assert_eq!(err.status_code(), Some(200));
    assert!(err.to_string().starts_with("get_json /samples/json-corrupted.json"));
    match err {
        RelayError::Operation { source, .. } => {
            assert!(matches!(*source, RelayError::InvalidJson { .. }));
            let inner: &dyn std::error::Error = &*source;
            assert!(inner.source().is_some(), "parse cause must be non-null");
        }
        other => panic!("expected Operation wrapper, got {other}"),
    }
}

#[tokio::test]
async fn direct_get_reports_http_errors() {
    let origin = spawn_origin().await;
    let client = client_for(&origin);

    let err = client.get_raw("/missing").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn direct_connection_failure_is_immediate() {
    // Nothing listens on port 1.
    let client = client_for("http://127.0.0.1:1");

    let err = client.get_raw("/anything").await.unwrap_err();
    assert!(err.is_connection(), "expected a connection error, got {err}");
}

#[tokio::test]
async fn direct_request_echoes_arbitrary_bytes() {
    let origin = spawn_origin().await;
    let client = client_for(&origin);

    let payload = vec![0x00, 0x01, 0xFE, 0xFF, 0x00, 0x7F];
    let echoed = client
        .request(
            FetchRequest::new("/echo")
                .with_method("POST")
                .with_body(payload.clone()),
        )
        .await
        .unwrap();
    assert_eq!(&echoed[..], &payload[..]);
}

#[tokio::test]
async fn direct_relative_url_and_headers_round_trip() {
    let origin = spawn_origin().await;
    let client = client_for(&origin);

    let echoed = client
        .request(FetchRequest::new("./echo-headers").with_header("X-Relay-Check", "ok"))
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_slice(&echoed).unwrap();
    assert_eq!(value["x-relay-check"], "ok");
}

#[tokio::test]
async fn callback_form_delivers_the_same_result() {
    let origin = spawn_origin().await;
    let client = client_for(&origin);

    let (tx, rx) = tokio::sync::oneshot::channel();
    client.get_text_callback("/samples/text-ascii.txt", move |result| {
        let _ = tx.send(result);
    });

    let text = rx.await.unwrap().unwrap();
    assert_eq!(text, TEXT_SAMPLE);
}

#[tokio::test]
async fn relayed_get_raw_preserves_binary_bytes() {
    let origin = spawn_origin().await;
    let relay = spawn_relay(PolicyConfig::new().allow_port(port_of(&origin))).await;
    let client = client_for(&relay);

    let bytes = client
        .get_raw_via_relay(&format!("{origin}/samples/binary.bin"), &[])
        .await
        .unwrap();
    assert_eq!(&bytes[..], &BINARY_SAMPLE);
}

#[tokio::test]
async fn relayed_get_json() {
    let origin = spawn_origin().await;
    let relay = spawn_relay(PolicyConfig::new().allow_port(port_of(&origin))).await;
    let client = client_for(&relay);

    let value = client
        .get_json_via_relay(&format!("{origin}/samples/json-ok.json"), &[])
        .await
        .unwrap();
    assert_eq!(value["test"], "ok");
}

#[tokio::test]
async fn relayed_request_echoes_arbitrary_bytes() {
    let origin = spawn_origin().await;
    let relay = spawn_relay(
        PolicyConfig::new()
            .allow_port(port_of(&origin))
            .allow_method("POST"),
    )
    .await;
    let client = client_for(&relay);

    let payload = vec![0x00, 0xBA, 0xDD, 0xCA, 0xFE, 0xFF];
    let echoed = client
        .request_via_relay(
            FetchRequest::new(format!("{origin}/echo"))
                .with_method("POST")
                .with_body(payload.clone()),
            &[],
        )
        .await
        .unwrap();
    assert_eq!(&echoed[..], &payload[..]);
}

#[tokio::test]
async fn relayed_custom_headers_reach_the_target() {
    let origin = spawn_origin().await;
    let relay = spawn_relay(PolicyConfig::new().allow_port(port_of(&origin))).await;
    let client = client_for(&relay);

    let value = client
        .get_json_via_relay(&format!("{origin}/echo-headers"), &[])
        .await
        .unwrap();
    // The forwarder synthesizes a referer from the target itself.
    assert_eq!(value["referer"], format!("{origin}/echo-headers"));

    let echoed = client
        .request_via_relay(
            FetchRequest::new(format!("{origin}/echo-headers"))
                .with_header("X-Relay-Check", "through"),
            &[],
        )
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&echoed).unwrap();
    assert_eq!(value["x-relay-check"], "through");
}

#[tokio::test]
async fn relayed_mime_allow_list() {
    let origin = spawn_origin().await;
    let relay = spawn_relay(PolicyConfig::new().allow_port(port_of(&origin))).await;
    let client = client_for(&relay);

    let target = format!("{origin}/samples/text-ascii.txt");

    let text = client
        .get_text_via_relay(&target, &["text/plain"])
        .await
        .unwrap();
    assert_eq!(text, TEXT_SAMPLE);

    let err = client
        .get_text_via_relay(&target, &["image/png"])
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(406));
}

#[tokio::test]
async fn relayed_callback_form() {
    let origin = spawn_origin().await;
    let relay = spawn_relay(PolicyConfig::new().allow_port(port_of(&origin))).await;
    let client = client_for(&relay);

    let (tx, rx) = tokio::sync::oneshot::channel();
    client.get_raw_via_relay_callback(
        &format!("{origin}/samples/binary.bin"),
        &[],
        move |result| {
            let _ = tx.send(result);
        },
    );

    let bytes = rx.await.unwrap().unwrap();
    assert_eq!(&bytes[..], &BINARY_SAMPLE);
}
