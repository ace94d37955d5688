//! Semantic tokens: classification and delta encoding.

use thrift_ls_protocol::SemanticTokens;
use thrift_syntax::Tree;
use thrift_text::ByteSpan;
use thrift_token::TokenKind;

/// Token type names, in legend order.
pub const TOKEN_TYPES: &[&str] = &[
    "comment",
    "string",
    "number",
    "keyword",
    "type",
    "method",
    "property",
    "decorator",
    "variable",
];

/// Modifier names, in legend order.
pub const TOKEN_MODIFIERS: &[&str] = &["declaration", "readonly", "defaultLibrary"];

const TYPE_COMMENT: u32 = 0;
const TYPE_STRING: u32 = 1;
const TYPE_NUMBER: u32 = 2;
const TYPE_KEYWORD: u32 = 3;
const TYPE_TYPE: u32 = 4;
const TYPE_METHOD: u32 = 5;

const MODIFIER_DEFAULT_LIBRARY: u32 = 1 << 2;

/// Builtin type names highlighted as `type` + `defaultLibrary`. Matched by
/// text: `uuid` lexes as an identifier but still reads as a builtin.
const BUILTIN_TYPES: &[&str] = &[
    "void", "bool", "byte", "i8", "i16", "i32", "i64", "double", "string", "binary", "uuid",
    "map", "list", "set",
];

/// The semantic tokens legend, for the `initialize` response.
pub fn legend() -> serde_json::Value {
    serde_json::json!({
        "tokenTypes": TOKEN_TYPES,
        "tokenModifiers": TOKEN_MODIFIERS,
    })
}

struct RawSemanticToken {
    line: u32,
    character: u32,
    length: u32,
    token_type: u32,
    modifiers: u32,
}

/// Computes the full delta-encoded token stream for a document.
pub fn semantic_tokens_full(tree: &Tree) -> SemanticTokens {
    let mut raw = Vec::new();

    for (index, token) in tree.tokens.iter().enumerate() {
        for trivium in &token.leading_trivia {
            if trivium.kind.is_comment() {
                push_span(tree, &mut raw, trivium.span, TYPE_COMMENT, 0);
            }
        }
        let Some((token_type, modifiers)) = classify(tree, index) else {
            continue;
        };
        push_span(tree, &mut raw, token.span, token_type, modifiers);
    }

    raw.sort_by_key(|t| (t.line, t.character));
    SemanticTokens { data: encode(&raw) }
}

fn classify(tree: &Tree, index: usize) -> Option<(u32, u32)> {
    let token = &tree.tokens[index];
    let text = token.text_str(&tree.source).unwrap_or("");
    match token.kind {
        TokenKind::StringLiteral => Some((TYPE_STRING, 0)),
        TokenKind::IntLiteral | TokenKind::FloatLiteral => Some((TYPE_NUMBER, 0)),
        kind if kind.is_keyword() => {
            if BUILTIN_TYPES.contains(&text) {
                Some((TYPE_TYPE, MODIFIER_DEFAULT_LIBRARY))
            } else {
                Some((TYPE_KEYWORD, 0))
            }
        }
        TokenKind::Identifier => {
            if BUILTIN_TYPES.contains(&text) {
                return Some((TYPE_TYPE, MODIFIER_DEFAULT_LIBRARY));
            }
            // A function-definition position: an identifier immediately
            // before `(` and preceded by a type or identifier.
            let next_is_paren = tree
                .tokens
                .get(index + 1)
                .is_some_and(|t| t.kind == TokenKind::LParen);
            let preceded_by_type = index > 0
                && matches!(
                    tree.tokens[index - 1].kind,
                    TokenKind::Identifier | TokenKind::KwVoid | TokenKind::RAngle
                )
                || index > 0 && tree.tokens[index - 1].kind.is_base_type();
            if next_is_paren && preceded_by_type {
                Some((TYPE_METHOD, 0))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Splits a span at line terminators so every emitted token stays on one
/// line; zero-length pieces are skipped.
fn push_span(
    tree: &Tree,
    raw: &mut Vec<RawSemanticToken>,
    span: ByteSpan,
    token_type: u32,
    modifiers: u32,
) {
    let mut start = span.start;
    while start < span.end {
        let line = tree.line_index.line_at(start);
        let content_end = tree.line_index.content_end(line, &tree.source).min(span.end);
        if content_end > start {
            let begin = crate::convert::offset_to_position(tree, start);
            let end = crate::convert::offset_to_position(tree, content_end);
            if end.character > begin.character {
                raw.push(RawSemanticToken {
                    line: begin.line,
                    character: begin.character,
                    length: end.character - begin.character,
                    token_type,
                    modifiers,
                });
            }
        }
        // Continue after this line's terminator.
        match tree.line_index.line_start(line + 1) {
            Some(next) if next > start => start = next.max(content_end),
            _ => break,
        }
    }
}

fn encode(raw: &[RawSemanticToken]) -> Vec<u32> {
    let mut data = Vec::with_capacity(raw.len() * 5);
    let mut previous_line = 0u32;
    let mut previous_char = 0u32;
    for token in raw {
        let delta_line = token.line - previous_line;
        let delta_char = if delta_line == 0 {
            token.character - previous_char
        } else {
            token.character
        };
        data.extend_from_slice(&[
            delta_line,
            delta_char,
            token.length,
            token.token_type,
            token.modifiers,
        ]);
        previous_line = token.line;
        previous_char = token.character;
    }
    data
}
