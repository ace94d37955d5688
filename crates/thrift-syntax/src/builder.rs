//! Joins the lexer's token stream with a raw grammar tree into the CST.
//!
//! Every raw node is mapped to a contiguous token range by span
//! intersection; tokens not covered by a child node become token children
//! of their parent. Alignment violations (a node span that does not
//! coincide with its boundary tokens) produce `INTERNAL_ALIGNMENT`
//! diagnostics and leave the node without the bounded flag.

use crate::grammar::{self, GrammarTree, RawNodeId};
use crate::tree::{Child, NO_NODE, Node, NodeFlags, NodeId};
use thrift_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSource};
use thrift_text::ByteSpan;
use thrift_token::{Token, TokenKind};

pub(crate) struct BuildResult {
    pub nodes: Vec<Node>,
    pub root: NodeId,
    pub diagnostics: Vec<Diagnostic>,
}

/// Validates the token-stream invariants: spans within source, monotone and
/// non-overlapping, terminated by `Eof` at source length.
pub(crate) fn validate_tokens(tokens: &[Token], source_len: usize) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut report = |span: ByteSpan, message: String| {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::InternalAlignment,
            span,
            DiagnosticSource::Parser,
            message,
        ));
    };

    match tokens.last() {
        Some(last) if last.kind == TokenKind::Eof && last.span == ByteSpan::empty(source_len) => {}
        Some(last) => report(last.span, "token stream does not end with EOF".to_string()),
        None => report(ByteSpan::empty(0), "empty token stream".to_string()),
    }
    for token in tokens {
        if !token.span.is_ordered() || token.span.end > source_len {
            report(token.span, format!("token span {} out of bounds", token.span));
        }
    }
    for pair in tokens.windows(2) {
        if pair[1].span.start < pair[0].span.end {
            report(pair[1].span, format!("token span {} overlaps predecessor", pair[1].span));
        }
    }
    diagnostics
}

pub(crate) fn build(tokens: &[Token], grammar: &GrammarTree) -> BuildResult {
    let mut builder = Builder {
        tokens,
        grammar,
        nodes: vec![sentinel()],
        diagnostics: Vec::new(),
    };

    let root = match grammar.root() {
        Some(_) => builder.build_node(0, NO_NODE),
        None => NO_NODE,
    };
    BuildResult { nodes: builder.nodes, root, diagnostics: builder.diagnostics }
}

fn sentinel() -> Node {
    Node {
        id: NO_NODE,
        kind: grammar::intern_kind("<none>"),
        span: ByteSpan::empty(0),
        token_range: None,
        parent: NO_NODE,
        children: Vec::new(),
        flags: NodeFlags::NONE,
    }
}

struct Builder<'a> {
    tokens: &'a [Token],
    grammar: &'a GrammarTree,
    nodes: Vec<Node>,
    diagnostics: Vec<Diagnostic>,
}

impl Builder<'_> {
    /// Finds the inclusive token range strictly intersecting `span`,
    /// excluding the EOF token.
    fn token_range(&self, span: ByteSpan) -> Option<(u32, u32)> {
        // First token whose end is past the span start.
        let first = self.tokens.partition_point(|t| t.span.end <= span.start);
        let mut last = None;
        for (i, token) in self.tokens.iter().enumerate().skip(first) {
            if token.kind == TokenKind::Eof || token.span.start >= span.end {
                break;
            }
            if token.span.intersects(span) {
                last = Some(i);
            }
        }
        last.map(|l| (first as u32, l as u32))
    }

    fn build_node(&mut self, raw_id: RawNodeId, parent: NodeId) -> NodeId {
        let raw = &self.grammar.nodes[raw_id];
        let id = NodeId(self.nodes.len() as u32);
        // Placeholder; filled in below once children are built.
        self.nodes.push(Node {
            id,
            kind: grammar::intern_kind(raw.kind),
            span: raw.span,
            token_range: None,
            parent,
            children: Vec::new(),
            flags: NodeFlags::NONE,
        });

        let mut flags = NodeFlags::NONE;
        if raw.named {
            flags |= NodeFlags::NAMED;
        }
        if raw.error {
            flags |= NodeFlags::ERROR;
            self.diagnostics.push(Diagnostic::new(
                DiagnosticCode::ParseErrorNode,
                raw.span,
                DiagnosticSource::Parser,
                "syntax error",
            ));
        }
        if raw.missing {
            flags |= NodeFlags::MISSING;
            self.diagnostics.push(Diagnostic::new(
                DiagnosticCode::ParseMissingNode,
                raw.span,
                DiagnosticSource::Parser,
                "missing syntax",
            ));
        }
        if raw.has_error {
            flags |= NodeFlags::RECOVERED;
        }

        let token_range = self.token_range(raw.span);
        if token_range.is_none() && !raw.span.is_empty() {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticCode::InternalAlignment,
                raw.span,
                DiagnosticSource::Parser,
                format!("no tokens intersect node span {}", raw.span),
            ));
        }

        if let Some((first, last)) = token_range {
            let first_token = &self.tokens[first as usize];
            let last_token = &self.tokens[last as usize];
            let covered = self.tokens[first as usize..=last as usize]
                .iter()
                .all(|t| raw.span.contains_span(t.span));
            if first_token.span.start == raw.span.start
                && last_token.span.end == raw.span.end
                && covered
            {
                flags |= NodeFlags::BOUNDED;
            } else {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticCode::InternalAlignment,
                    raw.span,
                    DiagnosticSource::Parser,
                    format!(
                        "node span {} not aligned with tokens {}..{}",
                        raw.span, first_token.span, last_token.span
                    ),
                ));
            }
        }

        // Children: child nodes in order, with uncovered tokens interleaved.
        let raw_children = raw.children.clone();
        let mut children = Vec::new();
        let mut cursor = token_range.map(|(f, _)| f);
        for child_raw in raw_children {
            let child_span = self.grammar.nodes[child_raw].span;
            let child_id = self.build_node(child_raw, id);
            let child_range = self.nodes[child_id.0 as usize].token_range;
            if let (Some(cur), Some((child_first, child_last))) = (cursor, child_range) {
                for token_idx in cur..child_first.max(cur) {
                    children.push(Child::Token(token_idx));
                }
                children.push(Child::Node(child_id));
                cursor = Some(child_last + 1);
            } else if let (Some(cur), Some((_, last))) = (cursor, token_range) {
                // Zero-width child (missing node): emit preceding tokens up
                // to its position first.
                let mut idx = cur;
                while idx <= last && self.tokens[idx as usize].span.end <= child_span.start {
                    children.push(Child::Token(idx));
                    idx += 1;
                }
                cursor = Some(idx);
                children.push(Child::Node(child_id));
            } else {
                children.push(Child::Node(child_id));
            }
        }
        if let (Some(cur), Some((_, last))) = (cursor, token_range) {
            for token_idx in cur..=last {
                children.push(Child::Token(token_idx));
            }
        }

        let node = &mut self.nodes[id.0 as usize];
        node.token_range = token_range;
        node.children = children;
        node.flags = flags;
        id
    }
}
