//! JSON-RPC 2.0 message types.
//!
//! Requests deserialize straight off the wire. Responses are built from a
//! handler's `Result` through [`JsonRpcResponse::reply`], and a custom
//! `Serialize` impl writes exactly one of `result` or `error`, so the
//! mutual exclusivity is carried by the type rather than by convention.

use crate::codes::ErrorCode;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Protocol revision spoken on the wire.
pub const PROTOCOL_VERSION: &str = "2.0";

/// An incoming request or notification.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Version tag; anything but "2.0" is answered with `InvalidRequest`
    #[serde(default)]
    pub jsonrpc: String,

    /// Request identifier (absent for notifications)
    #[serde(default)]
    pub id: Option<Value>,

    /// Method name to invoke
    pub method: String,

    /// Method parameters
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// True for notifications (no id).
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// True when the message declares the protocol revision this server
    /// speaks.
    pub fn speaks_supported_version(&self) -> bool {
        self.jsonrpc == PROTOCOL_VERSION
    }
}

/// The error payload of a failed response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseError {
    /// Code from the closed [`ErrorCode`] set
    pub code: ErrorCode,

    /// Human-readable message
    pub message: String,

    /// Additional structured data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseError {
    /// An error with no extra data.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ResponseError {}

/// An outgoing response: the request id plus the handler's outcome.
#[derive(Debug)]
pub struct JsonRpcResponse {
    /// Mirrors the request id; `None` when the id was unreadable
    pub id: Option<Value>,

    /// What the handler produced
    pub outcome: Result<Value, ResponseError>,
}

impl JsonRpcResponse {
    /// Builds the response for a request from its handler outcome.
    pub fn reply(id: Option<Value>, outcome: Result<Value, ResponseError>) -> Self {
        Self { id, outcome }
    }
}

impl Serialize for JsonRpcResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut message = serializer.serialize_struct("JsonRpcResponse", 3)?;
        message.serialize_field("jsonrpc", PROTOCOL_VERSION)?;
        message.serialize_field("id", &self.id)?;
        match &self.outcome {
            Ok(result) => message.serialize_field("result", result)?,
            Err(error) => message.serialize_field("error", error)?,
        }
        message.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_round_trips() {
        let raw = r#"{"jsonrpc":"2.0","id":7,"method":"shutdown"}"#;
        let request: JsonRpcRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.method, "shutdown");
        assert!(!request.is_notification());
        assert!(request.speaks_supported_version());

        let raw = r#"{"jsonrpc":"2.0","method":"exit"}"#;
        let request: JsonRpcRequest = serde_json::from_str(raw).unwrap();
        assert!(request.is_notification());
    }

    #[test]
    fn missing_version_is_not_supported() {
        let raw = r#"{"id":1,"method":"initialize"}"#;
        let request: JsonRpcRequest = serde_json::from_str(raw).unwrap();
        assert!(!request.speaks_supported_version());
    }

    #[test]
    fn response_carries_exactly_one_of_result_or_error() {
        let ok = JsonRpcResponse::reply(Some(1.into()), Ok(serde_json::json!({"x": 1})));
        let text = serde_json::to_string(&ok).unwrap();
        assert_eq!(text, r#"{"jsonrpc":"2.0","id":1,"result":{"x":1}}"#);

        let failed = JsonRpcResponse::reply(
            Some(1.into()),
            Err(ResponseError::new(ErrorCode::MethodNotFound, "nope")),
        );
        let text = serde_json::to_string(&failed).unwrap();
        assert_eq!(
            text,
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"nope"}}"#
        );
    }

    #[test]
    fn unreadable_id_serializes_as_null() {
        let response = JsonRpcResponse::reply(
            None,
            Err(ResponseError::new(ErrorCode::ParseError, "bad frame")),
        );
        let text = serde_json::to_string(&response).unwrap();
        assert!(text.contains(r#""id":null"#));
    }

    #[test]
    fn error_display_names_the_code() {
        let error = ResponseError::new(ErrorCode::RequestFailed, "refused");
        assert_eq!(error.to_string(), "RequestFailed (-32803): refused");
    }
}
