//! Thrift language server.
//!
//! Wires the snapshot store, formatter, and lint runner behind a
//! sequential JSON-RPC loop with `Content-Length` framing. Editor queries
//! (symbols, folding, selection ranges, semantic tokens) are pure over the
//! current snapshot's CST; text sync drives the store's incremental
//! reparse; formatting is fail-closed and surfaces refusals as
//! `RequestFailed` responses.

mod convert;
mod features;
mod server;

pub use convert::{offset_to_position, position_to_offset, range_to_span, span_to_range};
pub use features::semantic_tokens::{TOKEN_MODIFIERS, TOKEN_TYPES};
pub use server::LspServer;
