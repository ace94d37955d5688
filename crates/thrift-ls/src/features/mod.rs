//! Request handlers, pure over the snapshot store and CST.

pub mod diagnostics;
pub mod folding;
pub mod formatting;
pub mod selection;
pub mod semantic_tokens;
pub mod symbols;
