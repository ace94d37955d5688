//! The single-pass token writer.
//!
//! Emission is a flat loop over tokens. The writer keeps a pending space, a
//! pending break count (merged with `max`, capped at the blank-line limit
//! when flushed), the line-start flag, and the indent level; the hints
//! collected from the CST drive indentation and break requests. Comments
//! are preserved byte-for-byte; whitespace is otherwise normalized.

use crate::hints::FormatHints;
use crate::options::ResolvedOptions;
use crate::policy::SourcePolicy;
use crate::spacing::should_insert_space;
use thrift_diagnostics::Error;
use thrift_syntax::Tree;
use thrift_text::Context;
use thrift_token::{Token, TokenKind, TriviaKind};

/// Cancellation is checked once per this many tokens.
const CANCEL_CHECK_INTERVAL: u32 = 256;

pub(crate) struct TokenWriter<'a> {
    tree: &'a Tree,
    hints: &'a FormatHints,
    options: &'a ResolvedOptions,
    policy: &'a SourcePolicy,
    out: Vec<u8>,
    pending_space: bool,
    pending_breaks: usize,
    at_line_start: bool,
    indent_level: usize,
    prev_kind: Option<TokenKind>,
}

impl<'a> TokenWriter<'a> {
    pub(crate) fn new(
        tree: &'a Tree,
        hints: &'a FormatHints,
        options: &'a ResolvedOptions,
        policy: &'a SourcePolicy,
        indent_level: usize,
        at_line_start: bool,
    ) -> Self {
        Self {
            tree,
            hints,
            options,
            policy,
            out: Vec::with_capacity(tree.source.len() + 64),
            pending_space: false,
            pending_breaks: 0,
            at_line_start,
            indent_level,
            prev_kind: None,
        }
    }

    pub(crate) fn emit_bom(&mut self) {
        self.out.extend_from_slice(crate::policy::BOM);
        // The mark is not visible text; suppress the line-start indent.
        self.at_line_start = false;
    }

    fn request_break(&mut self, count: usize) {
        self.pending_breaks = self.pending_breaks.max(count);
    }

    fn flush(&mut self) {
        if self.pending_breaks > 0 {
            let count = self.pending_breaks.min(self.options.break_cap());
            for _ in 0..count {
                self.out.extend_from_slice(self.policy.newline.as_bytes());
            }
            self.pending_breaks = 0;
            self.pending_space = false;
            self.at_line_start = true;
        }
        if self.at_line_start {
            for _ in 0..self.indent_level {
                self.out.extend_from_slice(self.options.indent.as_bytes());
            }
            self.at_line_start = false;
            self.pending_space = false;
        } else if self.pending_space {
            self.out.push(b' ');
            self.pending_space = false;
        }
    }

    /// True when the next flush would land at a line start.
    fn effectively_at_line_start(&self) -> bool {
        self.pending_breaks > 0 || self.at_line_start
    }

    fn emit_leading_trivia(&mut self, token: &Token) {
        let mut newline_run = 0usize;
        let mut emitted_comment = false;
        let mut last_was_line_comment = false;
        for trivium in &token.leading_trivia {
            match trivium.kind {
                TriviaKind::Newline => newline_run += 1,
                TriviaKind::Whitespace => {
                    if emitted_comment && newline_run == 0 {
                        self.pending_space = true;
                    }
                }
                kind => {
                    if newline_run > 0 {
                        self.request_break(newline_run);
                        newline_run = 0;
                    } else if !self.out.is_empty() && !self.effectively_at_line_start() {
                        self.pending_space = true;
                    }
                    self.flush();
                    self.out.extend_from_slice(trivium.text(&self.tree.source));
                    emitted_comment = true;
                    last_was_line_comment = kind.is_line_comment();
                }
            }
        }
        if emitted_comment {
            if newline_run > 0 {
                self.request_break(newline_run);
            } else if last_was_line_comment {
                // A token can never share a line with a `//`/`#` comment.
                self.request_break(1);
            } else {
                self.pending_space = true;
            }
        }
    }

    /// Emits one token with its structural transitions.
    pub(crate) fn write_token(
        &mut self,
        index: u32,
        include_top_level_breaks: bool,
        skip_leading_trivia: bool,
    ) {
        let Some(token) = self.tree.token(index) else { return };
        let next_has_comment = self
            .tree
            .token(index + 1)
            .is_some_and(|t| t.has_leading_comment());

        // Closing a declaration body with members: dedent onto its own line.
        if let Some(open) = self.hints.decl_block_close.get(&index) {
            if self.hints.decl_block_open.get(open).is_some_and(|b| b.has_members) {
                self.indent_level = self.indent_level.saturating_sub(1);
                if !token.has_leading_comment() {
                    self.request_break(1);
                }
            }
        }
        // Closing a wrapped list.
        if self.hints.wrap_close.contains(&index) {
            self.indent_level = self.indent_level.saturating_sub(1);
            if !token.has_leading_comment() {
                self.request_break(1);
            }
        }

        if include_top_level_breaks
            && self.hints.top_level_start.contains_key(&index)
            && self.hints.top_level_breaks.contains_key(&index)
        {
            let mut breaks = self.hints.top_level_breaks[&index];
            if token.has_leading_comment() {
                // The comment's own newlines supply the separation; avoid
                // doubling the blank line before a header comment block.
                breaks = breaks.saturating_sub(token.newlines_before_first_comment());
            }
            if breaks > 0 {
                self.request_break(breaks);
            }
        } else if self.hints.member_start.contains(&index)
            || self.hints.wrap_item_start.contains(&index)
        {
            if !token.has_leading_comment() {
                self.request_break(1);
            }
        }

        if !skip_leading_trivia {
            self.emit_leading_trivia(token);
        }

        if let Some(prev) = self.prev_kind {
            if should_insert_space(prev, token.kind) {
                self.pending_space = true;
            }
        }

        self.flush();
        self.out.extend_from_slice(token.text(&self.tree.source));
        self.prev_kind = Some(token.kind);

        // Opening a declaration body with members: indent, members on their
        // own lines.
        if let Some(info) = self.hints.decl_block_open.get(&index) {
            if info.has_members {
                self.indent_level += 1;
                if !next_has_comment {
                    self.request_break(1);
                }
            }
        }
        // Opening a wrapped list.
        if self.hints.wrap_open.contains(&index) {
            self.indent_level += 1;
            self.request_break(1);
        }
    }

    /// Emits a token range (inclusive), checking cancellation periodically.
    pub(crate) fn write_range(
        &mut self,
        ctx: &Context,
        first: u32,
        last: u32,
        include_top_level_breaks: bool,
        skip_first_trivia: bool,
    ) -> Result<(), Error> {
        for index in first..=last {
            if index.wrapping_sub(first) % CANCEL_CHECK_INTERVAL == 0 {
                ctx.check()?;
            }
            self.write_token(index, include_top_level_breaks, skip_first_trivia && index == first);
        }
        Ok(())
    }

    /// Finishes a whole-document emission: preserves trailing comments from
    /// the EOF token's trivia and normalizes the trailing newline.
    pub(crate) fn finish_document(mut self) -> Vec<u8> {
        if let Some(eof) = self.tree.tokens.last() {
            self.emit_leading_trivia(eof);
        }
        while matches!(self.out.last(), Some(b'\n') | Some(b'\r')) {
            self.out.pop();
        }
        if self.policy.trailing_newline && !self.out.is_empty() {
            self.out.extend_from_slice(self.policy.newline.as_bytes());
        }
        self.out
    }

    /// Finishes a range emission: pending breaks inside the range are
    /// dropped (surrounding whitespace stays outside the edit).
    pub(crate) fn finish_range(self) -> Vec<u8> {
        self.out
    }
}
