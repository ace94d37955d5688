//! Text primitives for the Thrift tooling workspace.
//!
//! This crate provides the foundational location types used by the lexer,
//! parser, formatter, and LSP layers: byte-based half-open spans, a line
//! index with exact UTF-8 ↔ UTF-16 position translation, non-overlapping
//! edit application over byte buffers, and the cancellation context passed
//! through the public entry points of the heavier crates.
//!
//! Positions are byte-oriented internally; UTF-16 code-unit positions only
//! appear at the LSP boundary.

mod context;
mod edit;
mod line_index;
mod span;

pub use context::{Cancelled, Context};
pub use edit::{Edit, EditError, apply_edits};
pub use line_index::{LineIndex, PositionError, Utf16Position};
pub use span::{ByteSpan, Point};
