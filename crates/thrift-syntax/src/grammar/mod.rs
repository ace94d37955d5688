//! The opaque grammar layer.
//!
//! The CST builder consumes the grammar through the [`GrammarParser`] trait:
//! an opaque parser that yields raw nodes with a kind name, a byte span, and
//! named/error/missing flags, and that supports editing a previous tree for
//! incremental reparse. The default implementation is the built-in
//! recursive-descent Thrift grammar in [`native`]; tests swap the factory to
//! exercise degraded-tree and verification-mismatch paths.

pub mod kinds;
mod native;
mod raw;

pub use native::NativeGrammarParser;
pub use raw::{GrammarTree, RawNode, RawNodeId};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use thrift_text::{ByteSpan, Point};
use thrift_token::Token;

/// Grammar-layer failure. Any error here degrades or falls back; it never
/// panics the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The parser could not produce a tree at all.
    #[error("grammar parse failed: {0}")]
    ParseFailed(String),
    /// An input edit failed validation against the old tree.
    #[error("invalid input edit: {0}")]
    InvalidEdit(String),
}

/// An edit descriptor for the incremental reparser: byte offsets plus the
/// corresponding row/column points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEdit {
    /// Byte offset where the edit starts
    pub start_byte: usize,
    /// Byte offset where the replaced range ended in the old source
    pub old_end_byte: usize,
    /// Byte offset where the replacement ends in the new source
    pub new_end_byte: usize,
    /// Point of `start_byte`
    pub start_point: Point,
    /// Point of `old_end_byte` in the old source
    pub old_end_point: Point,
    /// Point of `new_end_byte` in the new source
    pub new_end_point: Point,
}

/// An opaque grammar parser.
///
/// Implementations receive the lexed token stream alongside the source so
/// the pipeline lexes exactly once. `old_tree` is a reuse hint: an edited
/// tree from a previous parse of the same document.
pub trait GrammarParser: Send {
    /// Parses `source` into a raw tree.
    fn parse(
        &mut self,
        source: &[u8],
        tokens: &[Token],
        old_tree: Option<&GrammarTree>,
    ) -> Result<GrammarTree, GrammarError>;
}

/// A small integer id for an interned grammar kind name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KindId(pub u16);

struct KindRegistry {
    by_name: FxHashMap<&'static str, KindId>,
    names: Vec<&'static str>,
}

static KIND_REGISTRY: Lazy<RwLock<KindRegistry>> = Lazy::new(|| {
    RwLock::new(KindRegistry { by_name: FxHashMap::default(), names: Vec::new() })
});

/// Interns a kind name, returning its process-wide id.
///
/// Each name is written once; later calls take the read path.
pub fn intern_kind(name: &str) -> KindId {
    if let Some(&id) = KIND_REGISTRY.read().by_name.get(name) {
        return id;
    }
    let mut registry = KIND_REGISTRY.write();
    if let Some(&id) = registry.by_name.get(name) {
        return id;
    }
    let leaked: &'static str = Box::leak(name.to_string().into_boxed_str());
    let id = KindId(registry.names.len() as u16);
    registry.names.push(leaked);
    registry.by_name.insert(leaked, id);
    id
}

/// Resolves an interned kind id back to its name.
pub fn kind_name(id: KindId) -> &'static str {
    KIND_REGISTRY.read().names.get(id.0 as usize).copied().unwrap_or("<unknown>")
}

/// Factory producing grammar parsers; `None` means no parser is available
/// and parse results degrade.
pub type ParserFactory = Arc<dyn Fn() -> Option<Box<dyn GrammarParser>> + Send + Sync>;

static PARSER_FACTORY: Lazy<RwLock<Option<ParserFactory>>> =
    Lazy::new(|| RwLock::new(Some(Arc::new(|| {
        Some(Box::new(NativeGrammarParser::new()) as Box<dyn GrammarParser>)
    }))));

/// Acquires a parser from the process-wide factory.
pub fn acquire_parser() -> Option<Box<dyn GrammarParser>> {
    let factory = PARSER_FACTORY.read().clone();
    factory.and_then(|f| f())
}

/// Swaps the process-wide parser factory. Test-only: pass `None` to simulate
/// parser-infrastructure failure, or a custom factory to inject a
/// misbehaving parser.
pub fn set_parser_factory(factory: Option<ParserFactory>) {
    *PARSER_FACTORY.write() = factory;
}

/// Restores the default native-grammar factory. Test-only.
pub fn reset_parser_factory() {
    *PARSER_FACTORY.write() = Some(Arc::new(|| {
        Some(Box::new(NativeGrammarParser::new()) as Box<dyn GrammarParser>)
    }));
}

/// Validates a changed-range set: in-bounds, monotone, non-overlapping.
pub fn validate_changed_ranges(ranges: &[ByteSpan], source_len: usize) -> Result<(), GrammarError> {
    let mut previous_end = 0;
    for (i, range) in ranges.iter().enumerate() {
        if !range.is_ordered() || range.end > source_len {
            return Err(GrammarError::InvalidEdit(format!(
                "changed range {range} out of bounds for {source_len} bytes"
            )));
        }
        if i > 0 && range.start < previous_end {
            return Err(GrammarError::InvalidEdit(format!(
                "changed range {range} not monotone"
            )));
        }
        previous_end = range.end;
    }
    Ok(())
}
