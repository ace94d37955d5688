//! CST construction and reparse for Thrift IDL.
//!
//! The pipeline: lex the source ([`thrift_lexer`]), run the opaque grammar
//! parser ([`grammar`]), and join the two into an immutable [`Tree`] whose
//! nodes map to contiguous token ranges. Reparse supports a verified
//! incremental path with fail-safe fallback to full parses; every reparse
//! emits an observable [`ReparseEvent`].

mod builder;
pub mod grammar;
mod queries;
mod reparse;
mod tree;

pub use grammar::{
    GrammarError, GrammarParser, GrammarTree, InputEdit, KindId, ParserFactory, RawNode,
    acquire_parser, intern_kind, kind_name, kinds, reset_parser_factory, set_parser_factory,
};
pub use queries::{child_node_ids, member_node_ids, top_level_declaration_ids};
pub use reparse::{
    ParseOptions, ReparseEvent, ReparseMode, parse, reparse, set_reparse_observer,
};
pub use tree::{Child, NO_NODE, Node, NodeFlags, NodeId, RuntimeState, Tree};

#[cfg(test)]
mod tests;
