//! JSON-RPC 2.0 envelope and LSP wire structures for the Thrift language
//! server.
//!
//! The server speaks a small, fixed subset of LSP; the wire types are
//! defined here directly (with serde renames matching the protocol) rather
//! than pulled from a full protocol crate.

mod codes;
mod jsonrpc;
mod wire;

pub use codes::{ErrorCode, symbol_kind};
pub use jsonrpc::{JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, ResponseError};
pub use wire::*;
