//! The exhaustive inter-token spacing policy.

use thrift_token::TokenKind;

/// Decides whether a space belongs between two adjacent tokens.
///
/// Deprecated spellings (`oneway`/`async`, `byte`/`i8`) are ordinary
/// keywords here and are never rewritten; the policy only inserts or
/// removes whitespace.
pub fn should_insert_space(prev: TokenKind, cur: TokenKind) -> bool {
    use TokenKind::*;

    // No space before closing punctuation and separators.
    if matches!(cur, Comma | Semicolon | Colon | Dot | RParen | RBracket | RBrace | RAngle) {
        return false;
    }
    // No space after openers and member access, with the brace exception.
    if prev == LBrace {
        return matches!(cur, LParen | LBracket | LAngle);
    }
    if matches!(prev, Dot | LParen | LBracket | LAngle) {
        return false;
    }
    // `=` is always surrounded by spaces.
    if prev == Eq || cur == Eq {
        return true;
    }
    // Separators read with a trailing space.
    if matches!(prev, Colon | Comma | Semicolon) {
        return true;
    }
    // An opening brace after a word or closing delimiter.
    if cur == LBrace {
        return prev.is_word_like() || prev.is_close_delim();
    }
    // Unary sign glued to its numeric literal.
    if matches!(prev, Plus | Minus) && matches!(cur, IntLiteral | FloatLiteral) {
        return false;
    }
    if prev.is_word_like() && cur.is_word_like() {
        return true;
    }
    if prev.is_close_delim() && cur.is_word_like() {
        return true;
    }
    false
}
