//! Token and trivia types for the Thrift IDL lexer and parser.
//!
//! The token kind set is closed: identifiers, literals, the full Thrift
//! keyword table, single-byte delimiters, plus `Error` and `Eof`. Trivia
//! (whitespace, newlines, comments) is attached to the *following* token as
//! leading trivia; trailing trivia does not exist as a concept.

mod kind;
mod trivia;

pub use kind::{KEYWORDS, TokenKind};
pub use trivia::{Trivia, TriviaKind};

use serde::{Deserialize, Serialize};
use thrift_text::ByteSpan;

/// Per-token flags.
///
/// A small bitset; flags combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TokenFlags(u8);

impl TokenFlags {
    /// No flags set.
    pub const NONE: TokenFlags = TokenFlags(0);
    /// The token's text is malformed (unterminated literal, bad digits).
    pub const MALFORMED: TokenFlags = TokenFlags(1 << 0);
    /// The token was synthesized rather than read from source.
    pub const SYNTHESIZED: TokenFlags = TokenFlags(1 << 1);
    /// The token was produced while recovering from an error.
    pub const RECOVERED: TokenFlags = TokenFlags(1 << 2);

    /// True if every flag in `other` is set on `self`.
    #[inline]
    pub const fn contains(self, other: TokenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if no flags are set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for TokenFlags {
    type Output = TokenFlags;
    #[inline]
    fn bitor(self, rhs: TokenFlags) -> TokenFlags {
        TokenFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for TokenFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: TokenFlags) {
        self.0 |= rhs.0;
    }
}

/// A lexed token: kind, span, flags, and the ordered non-token slice that
/// precedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind
    pub kind: TokenKind,
    /// Byte span of the token text (zero-width only for `Eof`)
    pub span: ByteSpan,
    /// Trivia between the previous token and this one, in source order
    pub leading_trivia: Vec<Trivia>,
    /// Token flags
    pub flags: TokenFlags,
}

impl Token {
    /// Creates a token with no trivia and no flags.
    pub fn new(kind: TokenKind, span: ByteSpan) -> Self {
        Self { kind, span, leading_trivia: Vec::new(), flags: TokenFlags::NONE }
    }

    /// The token's raw bytes.
    #[inline]
    pub fn text<'a>(&self, source: &'a [u8]) -> &'a [u8] {
        self.span.slice(source)
    }

    /// The token's text as UTF-8, if valid.
    #[inline]
    pub fn text_str<'a>(&self, source: &'a [u8]) -> Option<&'a str> {
        std::str::from_utf8(self.text(source)).ok()
    }

    /// True for the terminal `Eof` token.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Byte offset where the token's leading trivia begins (equals
    /// `span.start` when there is no leading trivia).
    pub fn full_start(&self) -> usize {
        self.leading_trivia.first().map_or(self.span.start, |t| t.span.start)
    }

    /// Number of `Newline` trivia preceding the first comment in the
    /// leading trivia (all newlines if there is no comment).
    pub fn newlines_before_first_comment(&self) -> usize {
        let mut count = 0;
        for trivia in &self.leading_trivia {
            match trivia.kind {
                TriviaKind::Newline => count += 1,
                k if k.is_comment() => return count,
                _ => {}
            }
        }
        count
    }

    /// True if any leading trivium is a comment.
    pub fn has_leading_comment(&self) -> bool {
        self.leading_trivia.iter().any(|t| t.kind.is_comment())
    }
}
