//! The immutable parse tree.
//!
//! Nodes live in an arena indexed by [`NodeId`]; parents are ids, children
//! are tagged token indices or node ids, so the tree has no heap-cyclic
//! ownership. Id 0 is the reserved [`NO_NODE`] sentinel: a tree whose root
//! is `NO_NODE` is degraded and unsafe for formatting.

use crate::grammar::{GrammarParser, GrammarTree, KindId, kind_name};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thrift_diagnostics::Diagnostic;
use thrift_text::{ByteSpan, LineIndex};
use thrift_token::Token;

/// Index of a node in the tree's arena. Id 0 is [`NO_NODE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Reserved sentinel; never a real node.
pub const NO_NODE: NodeId = NodeId(0);

impl NodeId {
    /// True for the reserved sentinel.
    #[inline]
    pub fn is_none(self) -> bool {
        self == NO_NODE
    }
}

/// Per-node flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NodeFlags(u8);

impl NodeFlags {
    /// No flags set.
    pub const NONE: NodeFlags = NodeFlags(0);
    /// Named (non-anonymous) grammar node.
    pub const NAMED: NodeFlags = NodeFlags(1 << 0);
    /// Error recovery node.
    pub const ERROR: NodeFlags = NodeFlags(1 << 1);
    /// Zero-width inserted node.
    pub const MISSING: NodeFlags = NodeFlags(1 << 2);
    /// The subtree contains parse errors.
    pub const RECOVERED: NodeFlags = NodeFlags(1 << 3);
    /// First/last token spans coincide exactly with the node span.
    pub const BOUNDED: NodeFlags = NodeFlags(1 << 4);

    /// True if every flag in `other` is set on `self`.
    #[inline]
    pub const fn contains(self, other: NodeFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for NodeFlags {
    type Output = NodeFlags;
    #[inline]
    fn bitor(self, rhs: NodeFlags) -> NodeFlags {
        NodeFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for NodeFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: NodeFlags) {
        self.0 |= rhs.0;
    }
}

/// A child reference: either a token index into the tree's token stream or
/// another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Child {
    /// Index into [`Tree::tokens`]
    Token(u32),
    /// Node id
    Node(NodeId),
}

/// One CST node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// This node's id
    pub id: NodeId,
    /// Interned grammar kind
    pub kind: KindId,
    /// Byte span
    pub span: ByteSpan,
    /// First/last (inclusive) token indices, when any token intersects the
    /// node span
    pub token_range: Option<(u32, u32)>,
    /// Parent id (`NO_NODE` for the root)
    pub parent: NodeId,
    /// Ordered children
    pub children: Vec<Child>,
    /// Flags
    pub flags: NodeFlags,
}

impl Node {
    /// True when the node's first/last token spans coincide exactly with
    /// its byte span.
    #[inline]
    pub fn is_token_bounded(&self) -> bool {
        self.flags.contains(NodeFlags::BOUNDED)
    }
}

/// Runtime state carried between reparses of one document: the grammar
/// parser handle, the raw tree it produced, and incremental bookkeeping.
pub struct RuntimeState {
    /// The grammar parser handle
    pub parser: Box<dyn GrammarParser>,
    /// Raw tree from the last parse, used as the incremental reuse hint
    pub grammar_tree: GrammarTree,
    /// Set once periodic verification has failed for this document
    pub incremental_disabled: bool,
    /// Count of incremental reparses, driving the verification cadence
    pub incremental_count: u64,
}

impl std::fmt::Debug for RuntimeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeState")
            .field("incremental_disabled", &self.incremental_disabled)
            .field("incremental_count", &self.incremental_count)
            .finish_non_exhaustive()
    }
}

/// An immutable parse result for one document version.
///
/// The tree owns its source copy, token stream, node arena, and
/// diagnostics. The only mutable part is the runtime handle used to produce
/// the tree's successor; it is owned by exactly one snapshot at a time and
/// [`close`](Self::close) releases it.
#[derive(Debug)]
pub struct Tree {
    /// Document URI
    pub uri: String,
    /// Document version the tree was parsed from
    pub version: i32,
    /// Owned copy of the source bytes
    pub source: Vec<u8>,
    /// Token stream; the last token is `Eof`
    pub tokens: Vec<Token>,
    /// Node arena; index 0 is the sentinel
    pub nodes: Vec<Node>,
    /// Root node (`NO_NODE` for a degraded tree)
    pub root: NodeId,
    /// Lexer + parser diagnostics
    pub diagnostics: Vec<Diagnostic>,
    /// Line index over `source`
    pub line_index: LineIndex,
    /// Byte ranges that changed relative to the previous tree (the whole
    /// document for a full parse)
    pub changed_ranges: Vec<ByteSpan>,
    pub(crate) runtime: Mutex<Option<RuntimeState>>,
}

impl Tree {
    /// The node for `id`, or None for the sentinel or an out-of-range id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() { None } else { self.nodes.get(id.0 as usize) }
    }

    /// The root node, or None for a degraded tree.
    pub fn root_node(&self) -> Option<&Node> {
        self.node(self.root)
    }

    /// Grammar kind name of a node.
    pub fn kind_of(&self, node: &Node) -> &'static str {
        kind_name(node.kind)
    }

    /// True when the parse degraded (no parser infrastructure available).
    pub fn is_degraded(&self) -> bool {
        self.root.is_none()
    }

    /// True when any diagnostic is non-recoverable.
    pub fn has_non_recoverable(&self) -> bool {
        self.diagnostics.iter().any(|d| !d.recoverable)
    }

    /// The token at `index`.
    pub fn token(&self, index: u32) -> Option<&Token> {
        self.tokens.get(index as usize)
    }

    /// Releases the native runtime handle. Called when the owning snapshot
    /// is replaced or closed; afterwards reparses of this tree fall back to
    /// a fresh parser.
    pub fn close(&self) {
        *self.runtime.lock() = None;
    }

    pub(crate) fn take_runtime(&self) -> Option<RuntimeState> {
        self.runtime.lock().take()
    }
}
