//! Crate-level tests for pipeline composition and error shaping.

use crate::client::pipeline::{body_parse_json, body_to_text, gate_status};
use crate::error::RelayError;
use crate::types::{FetchResponse, ResponseBody};
use bytes::Bytes;
use std::collections::BTreeMap;

fn record(status: u16, body: &'static [u8]) -> FetchResponse {
    FetchResponse::from_parts(
        status,
        BTreeMap::new(),
        ResponseBody::Raw(Bytes::from_static(body)),
    )
}

#[test]
fn test_stage_chain_raw_to_json() {
    let response = record(200, br#"{"test": "ok"}"#);

    let response = gate_status(response).unwrap();
    let response = body_to_text(response).unwrap();
    let response = body_parse_json(response).unwrap();

    let value = response.into_json().unwrap();
    assert_eq!(value["test"], "ok");
}

#[test]
fn test_stage_chain_stops_at_gate() {
    let response = record(404, b"irrelevant");

    let err = gate_status(response).unwrap_err();
    match err {
        RelayError::HttpStatus { code, ref message } => {
            assert_eq!(code, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected HttpStatus, got {other}"),
    }
}

#[test]
fn test_each_stage_replaces_the_body() {
    let response = record(200, b"\"text\"");
    let response = body_to_text(response).unwrap();
    assert!(matches!(response.body, ResponseBody::Text(_)));

    let response = body_parse_json(response).unwrap();
    assert!(matches!(response.body, ResponseBody::Json(_)));
}

#[test]
fn test_operation_context_is_a_prefix_only() {
    let err = body_parse_json(record(200, b"not json"))
        .unwrap_err()
        .context("get_json", "http://localhost:3042/samples/corrupted.json");

    let rendered = err.to_string();
    assert!(rendered.starts_with("get_json http://localhost:3042/samples/corrupted.json: "));
    assert_eq!(err.status_code(), Some(200));

    match err {
        RelayError::Operation { source, .. } => {
            assert!(matches!(*source, RelayError::InvalidJson { .. }));
        }
        other => panic!("expected Operation wrapper, got {other}"),
    }
}

#[test]
fn test_binary_body_survives_raw_unwrap() {
    let payload: &[u8] = &[0x00, 0xBA, 0xDD, 0xCA, 0xFE, 0xFF];
    let response = FetchResponse::from_parts(
        200,
        BTreeMap::new(),
        ResponseBody::Raw(Bytes::copy_from_slice(payload)),
    );

    let bytes = gate_status(response).unwrap().into_raw().unwrap();
    assert_eq!(&bytes[..], payload);
}
