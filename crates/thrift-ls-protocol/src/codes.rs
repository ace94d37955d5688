//! JSON-RPC and LSP error codes.

use serde::{Serialize, Serializer};
use std::fmt;

/// The closed set of error codes this server answers with.
///
/// Dispatch maps typed library errors onto these variants, so the mapping
/// table stays exhaustive and no handler deals in bare integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Invalid JSON in a frame body
    ParseError,
    /// Not a valid request object, or a request after `shutdown`
    InvalidRequest,
    /// Unknown method
    MethodNotFound,
    /// Invalid method parameters (including documents that are not open)
    InvalidParams,
    /// Internal server failure
    InternalError,
    /// Cancelled via `$/cancelRequest`
    RequestCancelled,
    /// The document changed while the request was computed
    ContentModified,
    /// The server refused the request (fail-closed formatting)
    RequestFailed,
}

impl ErrorCode {
    /// The numeric code that goes on the wire.
    pub const fn value(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::RequestCancelled => -32800,
            ErrorCode::ContentModified => -32801,
            ErrorCode::RequestFailed => -32803,
        }
    }

    /// The protocol's name for the code.
    pub const fn name(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "ParseError",
            ErrorCode::InvalidRequest => "InvalidRequest",
            ErrorCode::MethodNotFound => "MethodNotFound",
            ErrorCode::InvalidParams => "InvalidParams",
            ErrorCode::InternalError => "InternalError",
            ErrorCode::RequestCancelled => "RequestCancelled",
            ErrorCode::ContentModified => "ContentModified",
            ErrorCode::RequestFailed => "RequestFailed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.value())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.value())
    }
}

/// LSP symbol kinds used by the document-symbol provider.
pub mod symbol_kind {
    /// Method (service function)
    pub const METHOD: u32 = 6;
    /// Field
    pub const FIELD: u32 = 8;
    /// Enum (enum and senum)
    pub const ENUM: u32 = 10;
    /// Interface (service)
    pub const INTERFACE: u32 = 11;
    /// Constant
    pub const CONSTANT: u32 = 14;
    /// Enum member (enum and senum values)
    pub const ENUM_MEMBER: u32 = 22;
    /// Struct (struct, union, exception)
    pub const STRUCT: u32 = 23;
    /// Type parameter (typedef)
    pub const TYPE_PARAMETER: u32 = 26;
}
