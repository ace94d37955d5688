//! One-pass hint collection over the CST.
//!
//! The token writer is a flat loop; everything structural it needs (where
//! top-level declarations begin and how many newlines separate them, where
//! members start, which braces open declaration bodies, which signatures
//! wrap) is precomputed here as maps keyed by token index.

use crate::options::ResolvedOptions;
use crate::spacing::should_insert_space;
use rustc_hash::{FxHashMap, FxHashSet};
use thrift_doc::{Doc, flat_width};
use thrift_syntax::{Tree, child_node_ids, kinds, member_node_ids, top_level_declaration_ids};
use thrift_token::TokenKind;

/// A declaration body brace pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Token index of the matching closing brace
    pub close: u32,
    /// The body contains at least one member
    pub has_members: bool,
}

/// Precomputed writer hints.
#[derive(Debug, Default)]
pub struct FormatHints {
    /// First token of each top-level declaration, to its ordinal
    pub top_level_start: FxHashMap<u32, usize>,
    /// First token of each top-level declaration, to the newline count
    /// separating it from the previous declaration
    pub top_level_breaks: FxHashMap<u32, usize>,
    /// First token of each member inside a declaration body
    pub member_start: FxHashSet<u32>,
    /// Opening brace of each declaration body
    pub decl_block_open: FxHashMap<u32, BlockInfo>,
    /// Closing brace of each declaration body, to its opener
    pub decl_block_close: FxHashMap<u32, u32>,
    /// Opening parenthesis of each wrapped parameter/throws list
    pub wrap_open: FxHashSet<u32>,
    /// Closing parenthesis of each wrapped list
    pub wrap_close: FxHashSet<u32>,
    /// First token of each item inside a wrapped list
    pub wrap_item_start: FxHashSet<u32>,
}

/// Directive grouping: consecutive declarations in the same group are
/// separated by one newline, different groups by a blank line.
fn directive_group(kind: &str) -> Option<u8> {
    match kind {
        kinds::INCLUDE_DECLARATION | kinds::CPP_INCLUDE_DECLARATION => Some(0),
        kinds::NAMESPACE_DECLARATION => Some(1),
        kinds::TYPEDEF_DECLARATION => Some(2),
        _ => None,
    }
}

/// Collects all hints for a tree.
pub fn collect_hints(tree: &Tree, options: &ResolvedOptions) -> FormatHints {
    let mut hints = FormatHints::default();

    let top_level = top_level_declaration_ids(tree);
    let mut previous: Option<(&str, u32)> = None;
    let mut ordinal = 0usize;
    for id in &top_level {
        let Some(node) = tree.node(*id) else { continue };
        let Some((first, _)) = node.token_range else { continue };
        let kind = tree.kind_of(node);

        hints.top_level_start.insert(first, ordinal);
        if let Some((previous_kind, _)) = previous {
            let breaks = if directive_group(kind).is_some()
                && directive_group(kind) == directive_group(previous_kind)
            {
                1
            } else if kind == kinds::CONST_DECLARATION
                && previous_kind == kinds::CONST_DECLARATION
            {
                // Adjacent consts keep the author's spacing.
                tree.token(first)
                    .map(|t| t.newlines_before_first_comment().max(1))
                    .unwrap_or(1)
            } else {
                2
            };
            hints.top_level_breaks.insert(first, breaks);
        }
        previous = Some((kind, first));
        ordinal += 1;

        collect_container_hints(tree, *id, options, &mut hints);
    }

    hints
}

fn collect_container_hints(
    tree: &Tree,
    id: thrift_syntax::NodeId,
    options: &ResolvedOptions,
    hints: &mut FormatHints,
) {
    let Some(node) = tree.node(id) else { return };
    let kind = tree.kind_of(node);

    let members = member_node_ids(tree, id);
    for member in &members {
        if let Some((first, _)) = tree.node(*member).and_then(|n| n.token_range) {
            hints.member_start.insert(first);
        }
    }

    // The brace pair of the declaration body. For senum the definition node
    // itself is the body.
    let body = match kind {
        kinds::STRUCT_DEFINITION | kinds::UNION_DEFINITION | kinds::EXCEPTION_DEFINITION => {
            find_child(tree, id, kinds::FIELD_BLOCK)
        }
        kinds::SERVICE_DEFINITION => find_child(tree, id, kinds::FUNCTION_BLOCK),
        kinds::ENUM_DEFINITION => find_child(tree, id, kinds::ENUM_BLOCK),
        kinds::SENUM_DEFINITION => Some(id),
        _ => None,
    };
    if let Some(body) = body {
        if let Some((open, close)) = brace_pair(tree, body) {
            hints.decl_block_open.insert(open, BlockInfo { close, has_members: !members.is_empty() });
            hints.decl_block_close.insert(close, open);
        }
    }

    if kind == kinds::SERVICE_DEFINITION {
        for function in members {
            collect_wrap_hints(tree, function, options, hints);
        }
    }
}

fn find_child(tree: &Tree, id: thrift_syntax::NodeId, kind: &str) -> Option<thrift_syntax::NodeId> {
    child_node_ids(tree, id)
        .into_iter()
        .find(|&child| tree.node(child).is_some_and(|n| tree.kind_of(n) == kind))
}

/// The first `{` and last `}` token within a node's token range.
fn brace_pair(tree: &Tree, id: thrift_syntax::NodeId) -> Option<(u32, u32)> {
    let (first, last) = tree.node(id)?.token_range?;
    let mut open = None;
    let mut close = None;
    for idx in first..=last {
        match tree.token(idx).map(|t| t.kind) {
            Some(TokenKind::LBrace) if open.is_none() => open = Some(idx),
            Some(TokenKind::RBrace) => close = Some(idx),
            _ => {}
        }
    }
    match (open, close) {
        (Some(open), Some(close)) if open < close => Some((open, close)),
        _ => None,
    }
}

/// Marks the wrap points of a function signature when its flat rendering at
/// one indent level exceeds the line width. A leading comment anywhere
/// inside the signature window disables wrapping.
fn collect_wrap_hints(
    tree: &Tree,
    function: thrift_syntax::NodeId,
    options: &ResolvedOptions,
    hints: &mut FormatHints,
) {
    let Some(node) = tree.node(function) else { return };
    let Some((first, last)) = node.token_range else { return };

    let mut docs = Vec::new();
    let mut prev: Option<TokenKind> = None;
    for idx in first..=last {
        let Some(token) = tree.token(idx) else { continue };
        if token.has_leading_comment() {
            return;
        }
        if let Some(prev) = prev {
            if should_insert_space(prev, token.kind) {
                docs.push(Doc::text(" "));
            }
        }
        let text = String::from_utf8_lossy(token.text(&tree.source)).into_owned();
        docs.push(Doc::text(text));
        prev = Some(token.kind);
    }
    let flat = flat_width(&Doc::concat(docs)).unwrap_or(usize::MAX);
    if options.indent.len() + flat <= options.line_width {
        return;
    }

    for list in child_node_ids(tree, function) {
        let Some(list_node) = tree.node(list) else { continue };
        let list_kind = tree.kind_of(list_node);
        if list_kind != kinds::PARAMETERS && list_kind != kinds::THROWS {
            continue;
        }
        let Some((list_first, list_last)) = list_node.token_range else { continue };
        let open = (list_first..=list_last)
            .find(|&i| tree.token(i).is_some_and(|t| t.kind == TokenKind::LParen));
        let close = (list_first..=list_last)
            .rev()
            .find(|&i| tree.token(i).is_some_and(|t| t.kind == TokenKind::RParen));
        let (Some(open), Some(close)) = (open, close) else { continue };
        if open >= close {
            continue;
        }
        hints.wrap_open.insert(open);
        hints.wrap_close.insert(close);
        for item in child_node_ids(tree, list) {
            let Some(item_node) = tree.node(item) else { continue };
            if tree.kind_of(item_node) != kinds::FIELD {
                continue;
            }
            if let Some((item_first, _)) = item_node.token_range {
                hints.wrap_item_start.insert(item_first);
            }
        }
    }
}
