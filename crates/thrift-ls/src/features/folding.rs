//! Folding ranges: declaration bodies, const collections, and comment
//! runs.

use crate::convert::offset_to_position;
use thrift_ls_protocol::FoldingRange;
use thrift_syntax::{Tree, kinds};
use thrift_text::ByteSpan;

/// Node kinds that fold.
const FOLDABLE_KINDS: &[&str] = &[
    kinds::FIELD_BLOCK,
    kinds::FUNCTION_BLOCK,
    kinds::ENUM_BLOCK,
    kinds::CONST_LIST,
    kinds::CONST_MAP,
];

/// Computes the folding ranges for a document, sorted by
/// `(start_line, end_line, start_char, end_char)`.
pub fn folding_ranges(tree: &Tree) -> Vec<FoldingRange> {
    let mut ranges = Vec::new();

    for node in &tree.nodes {
        if node.id.is_none() || !FOLDABLE_KINDS.contains(&tree.kind_of(node)) {
            continue;
        }
        if let Some(range) = block_range(tree, node.span) {
            ranges.push(range);
        }
    }

    collect_comment_ranges(tree, &mut ranges);

    ranges.sort_by_key(|r| {
        (r.start_line, r.end_line, r.start_character.unwrap_or(0), r.end_character.unwrap_or(0))
    });
    ranges
}

fn block_range(tree: &Tree, span: ByteSpan) -> Option<FoldingRange> {
    let start = offset_to_position(tree, span.start);
    let mut end = offset_to_position(tree, span.end);
    // An end at character zero would fold the line after the closing
    // delimiter; pull it back.
    if end.character == 0 && end.line > 0 {
        end.line -= 1;
        end.character = 0;
    }
    if start.line >= end.line {
        return None;
    }
    Some(FoldingRange {
        start_line: start.line,
        start_character: Some(start.character),
        end_line: end.line,
        end_character: Some(end.character),
        kind: None,
    })
}

/// Groups consecutive single-line comments on adjacent lines into one
/// range; block and doc comments fold individually.
fn collect_comment_ranges(tree: &Tree, ranges: &mut Vec<FoldingRange>) {
    // (start_line, start_char, end_line, end_char) of an open line-comment
    // run.
    let mut run: Option<(u32, u32, u32, u32)> = None;

    let mut flush = |run: &mut Option<(u32, u32, u32, u32)>, ranges: &mut Vec<FoldingRange>| {
        if let Some((start_line, start_char, end_line, end_char)) = run.take() {
            if start_line < end_line {
                ranges.push(FoldingRange {
                    start_line,
                    start_character: Some(start_char),
                    end_line,
                    end_character: Some(end_char),
                    kind: Some("comment".to_string()),
                });
            }
        }
    };

    for token in &tree.tokens {
        for trivium in &token.leading_trivia {
            if !trivium.kind.is_comment() {
                continue;
            }
            let start = offset_to_position(tree, trivium.span.start);
            let end = offset_to_position(tree, trivium.span.end);
            if trivium.kind.is_line_comment() {
                match &mut run {
                    Some((_, _, end_line, end_char)) if start.line == *end_line + 1 => {
                        *end_line = end.line;
                        *end_char = end.character;
                    }
                    _ => {
                        flush(&mut run, ranges);
                        run = Some((start.line, start.character, end.line, end.character));
                    }
                }
            } else {
                flush(&mut run, ranges);
                if start.line < end.line {
                    ranges.push(FoldingRange {
                        start_line: start.line,
                        start_character: Some(start.character),
                        end_line: end.line,
                        end_character: Some(end.character),
                        kind: Some("comment".to_string()),
                    });
                }
            }
        }
    }
    flush(&mut run, ranges);
}
