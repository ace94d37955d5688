//! Token-driven formatter for Thrift IDL.
//!
//! The formatter emits from the CST as a token stream with context hints
//! rather than pretty-printing every node recursively: a one-pass hint
//! collection marks top-level spacing, member starts, declaration bodies,
//! and over-wide function signatures, and a one-pass token writer applies
//! them together with the inter-token spacing policy.
//!
//! Formatting is fail-closed: input whose tree carries non-recoverable
//! diagnostics, unterminated literals, or invalid UTF-8 is refused with a
//! structured [`Error::UnsafeToFormat`](thrift_diagnostics::Error) instead
//! of being guessed at.

mod document;
mod hints;
mod options;
mod policy;
mod range;
mod spacing;
mod writer;

pub use document::{FormatResult, document};
pub use options::{FormatOptions, ResolvedOptions, resolve_options};
pub use policy::{BOM, Prepared, SourcePolicy, prepare_formatting};
pub use range::{RangeResult, range};
pub use spacing::should_insert_space;

#[cfg(test)]
mod tests;
