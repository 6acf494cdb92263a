//! JSON wire protocol for the status and echo endpoints
//!
//! Bodies are decoded into declared schemas; a missing or ill-typed field is a
//! schema violation, never a silently absent value.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use serde_json::Value;

/// Content type of every JSON body produced by the harness
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Body of a successful `GET` status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBody {
    /// Fixed marker, always `"OK"`
    #[serde(rename = "Status")]
    pub status: String,

    /// Requests fully completed before this one
    #[serde(rename = "RequestCount")]
    pub request_count: u64,

    /// Elapsed time since the server started, `H:MM:SS`
    #[serde(rename = "Uptime")]
    pub uptime: String,
}

impl StatusBody {
    pub fn new(request_count: u64, uptime: String) -> Self {
        Self {
            status: "OK".to_string(),
            request_count,
            uptime,
        }
    }
}

/// Body accepted by the `POST` echo endpoint.
///
/// The `message` field is required; its value may be any JSON value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoRequest {
    pub message: Value,
}

/// Body of a successful `POST` echo response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoReply {
    /// Token assigned to the stored message, unique per run
    pub id: String,

    /// The submitted value, reflected back unchanged
    pub message: Value,
}

/// Wire protocol errors
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Body is not well-formed JSON
    #[error("malformed JSON body: {0}")]
    Parse(String),

    /// Body is valid JSON but does not satisfy the declared schema
    #[error("schema violation: {0}")]
    Schema(String),

    /// A response value failed to serialize
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Serialize a response value to canonical JSON bytes
pub fn encode<T: Serialize>(value: &T) -> Result<Bytes, ProtocolError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Decode an echo request body.
///
/// Syntax faults map to [`ProtocolError::Parse`], well-formed documents missing
/// the required `message` field to [`ProtocolError::Schema`].
pub fn decode_echo(bytes: &[u8]) -> Result<EchoRequest, ProtocolError> {
    serde_json::from_slice(bytes).map_err(|e| match e.classify() {
        Category::Data => ProtocolError::Schema(e.to_string()),
        _ => ProtocolError::Parse(e.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_string_message() {
        let req = decode_echo(br#"{"message":"hi"}"#).unwrap();
        assert_eq!(req.message, json!("hi"));
    }

    #[test]
    fn decode_accepts_any_scalar() {
        let req = decode_echo(br#"{"message":42}"#).unwrap();
        assert_eq!(req.message, json!(42));

        let req = decode_echo(br#"{"message":null}"#).unwrap();
        assert_eq!(req.message, Value::Null);
    }

    #[test]
    fn decode_ignores_extra_fields() {
        let req = decode_echo(br#"{"message":"hi","extra":true}"#).unwrap();
        assert_eq!(req.message, json!("hi"));
    }

    #[test]
    fn missing_field_is_schema_error() {
        let err = decode_echo(b"{}").unwrap_err();
        assert!(matches!(err, ProtocolError::Schema(_)));
    }

    #[test]
    fn non_object_body_is_schema_error() {
        let err = decode_echo(br#""just a string""#).unwrap_err();
        assert!(matches!(err, ProtocolError::Schema(_)));
    }

    #[test]
    fn truncated_body_is_parse_error() {
        let err = decode_echo(b"{").unwrap_err();
        assert!(matches!(err, ProtocolError::Parse(_)));
    }

    #[test]
    fn garbage_body_is_parse_error() {
        let err = decode_echo(b"not json at all").unwrap_err();
        assert!(matches!(err, ProtocolError::Parse(_)));
    }

    #[test]
    fn status_body_wire_names() {
        let bytes = encode(&StatusBody::new(7, "0:01:02".to_string())).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["Status"], json!("OK"));
        assert_eq!(value["RequestCount"], json!(7));
        assert_eq!(value["Uptime"], json!("0:01:02"));
    }

    #[test]
    fn echo_reply_reflects_value() {
        let reply = EchoReply {
            id: "abc".to_string(),
            message: json!({"nested": [1, 2]}),
        };
        let bytes = encode(&reply).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["id"], json!("abc"));
        assert_eq!(value["message"], json!({"nested": [1, 2]}));
    }
}
