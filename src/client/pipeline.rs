//! Response pipeline stages.
//!
//! Each public client operation composes a subset of these stages over a
//! [`FetchResponse`]. Every stage is a pure transform: it consumes the record
//! and returns a new one with the body advanced to the next representation,
//! or the operation's error. Only [`read_body`] suspends — waiting for
//! end-of-stream is the client's single true await point.
//!
//! Stage order is fixed: `gate_status` → `read_body` → `body_to_text` →
//! `body_parse_json`, with each operation stopping at the representation it
//! returns.

use crate::error::{RelayError, Result};
use crate::protocol::is_success_status;
use crate::types::{FetchResponse, ResponseBody};
use bytes::BytesMut;
use futures::StreamExt;

/// Pass the record through unchanged if its status is 200-299.
///
/// Anything else fails with [`RelayError::HttpStatus`] carrying the code and
/// message of whichever endpoint answered.
pub(crate) fn gate_status(response: FetchResponse) -> Result<FetchResponse> {
    if is_success_status(response.status) {
        Ok(response)
    } else {
        Err(RelayError::HttpStatus {
            code: response.status,
            message: response.status_message,
        })
    }
}

/// Drain the body chunk stream into one contiguous byte buffer.
///
/// A stream error before end-of-stream fails with [`RelayError::Connection`].
pub(crate) async fn read_body(response: FetchResponse) -> Result<FetchResponse> {
    let FetchResponse {
        status,
        status_message,
        headers,
        body,
    } = response;

    let upstream = match body {
        ResponseBody::Stream(upstream) => upstream,
        _ => {
            return Err(RelayError::Internal(
                "read_body ran on an already-read body".to_string(),
            ))
        }
    };

    let mut stream = upstream.bytes_stream();
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| RelayError::Connection(e.to_string()))?;
        buffer.extend_from_slice(&chunk);
    }

    Ok(FetchResponse {
        status,
        status_message,
        headers,
        body: ResponseBody::Raw(buffer.freeze()),
    })
}

/// Replace the raw byte body with its UTF-8 decoding.
///
/// Best-effort: invalid sequences become replacement characters, the stage
/// itself never fails on malformed input.
pub(crate) fn body_to_text(response: FetchResponse) -> Result<FetchResponse> {
    let FetchResponse {
        status,
        status_message,
        headers,
        body,
    } = response;

    let text = match body {
        ResponseBody::Raw(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        ResponseBody::Text(text) => text,
        _ => {
            return Err(RelayError::Internal(
                "body_to_text needs an accumulated body".to_string(),
            ))
        }
    };

    Ok(FetchResponse {
        status,
        status_message,
        headers,
        body: ResponseBody::Text(text),
    })
}

/// Parse the body as JSON, text-decoding it first if still raw.
///
/// A parse failure keeps the original response's status and message on the
/// error so callers can tell a bad body from a bad request.
pub(crate) fn body_parse_json(response: FetchResponse) -> Result<FetchResponse> {
    let response = match response.body {
        ResponseBody::Text(_) => response,
        _ => body_to_text(response)?,
    };

    let FetchResponse {
        status,
        status_message,
        headers,
        body,
    } = response;

    let text = match body {
        ResponseBody::Text(text) => text,
        _ => unreachable!("body_to_text always yields text"),
    };

    let value = serde_json::from_str(&text).map_err(|source| RelayError::InvalidJson {
        status_code: status,
        status_message: status_message.clone(),
        source,
    })?;

    Ok(FetchResponse {
        status,
        status_message,
        headers,
        body: ResponseBody::Json(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::BTreeMap;

    fn raw_response(status: u16, body: &'static [u8]) -> FetchResponse {
        FetchResponse::from_parts(
            status,
            BTreeMap::new(),
            ResponseBody::Raw(Bytes::from_static(body)),
        )
    }

    #[test]
    fn test_gate_status_passes_2xx() {
        assert!(gate_status(raw_response(200, b"")).is_ok());
        assert!(gate_status(raw_response(204, b"")).is_ok());
    }

    #[test]
    fn test_gate_status_rejects_outside_range() {
        let err = gate_status(raw_response(404, b"")).unwrap_err();
        assert_eq!(err.status_code(), Some(404));

        let err = gate_status(raw_response(301, b"")).unwrap_err();
        assert_eq!(err.status_code(), Some(301));
    }

    #[test]
    fn test_body_to_text_is_lossy() {
        let response = raw_response(200, &[0x68, 0x69, 0xFF]);
        let text = body_to_text(response).unwrap().into_text().unwrap();
        assert!(text.starts_with("hi"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_parse_json_from_raw() {
        let response = raw_response(200, br#"{"test": "ok"}"#);
        let value = body_parse_json(response).unwrap().into_json().unwrap();
        assert_eq!(value["test"], "ok");
    }

    #[test]
    fn test_parse_json_failure_keeps_status() {
        let response = raw_response(200, b"{corrupted");
        let err = body_parse_json(response).unwrap_err();
        assert_eq!(err.status_code(), Some(200));
        assert_eq!(err.status_message(), Some("OK"));
    }
}
