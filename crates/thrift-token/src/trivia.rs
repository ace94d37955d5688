//! Trivia: the non-token source attached as leading trivia to the
//! following token.

use serde::{Deserialize, Serialize};
use thrift_text::ByteSpan;

/// Kinds of trivia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriviaKind {
    /// A run of spaces, tabs, vertical tabs, or form feeds
    Whitespace,
    /// One line terminator: `\n`, `\r\n`, or lone `\r`
    Newline,
    /// `// …` to end of line (terminator excluded)
    LineComment,
    /// `# …` to end of line (terminator excluded)
    HashComment,
    /// `/* … */`
    BlockComment,
    /// `/** … */`
    DocComment,
}

impl TriviaKind {
    /// True for any comment kind.
    #[inline]
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TriviaKind::LineComment
                | TriviaKind::HashComment
                | TriviaKind::BlockComment
                | TriviaKind::DocComment
        )
    }

    /// True for single-line comments (`//` and `#`), which fold as a group
    /// when they occupy adjacent lines.
    #[inline]
    pub fn is_line_comment(self) -> bool {
        matches!(self, TriviaKind::LineComment | TriviaKind::HashComment)
    }
}

/// One trivium with its byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trivia {
    /// Trivia kind
    pub kind: TriviaKind,
    /// Byte span of the trivium
    pub span: ByteSpan,
}

impl Trivia {
    /// Creates a trivium.
    pub fn new(kind: TriviaKind, span: ByteSpan) -> Self {
        Self { kind, span }
    }

    /// The trivium's raw bytes.
    #[inline]
    pub fn text<'a>(&self, source: &'a [u8]) -> &'a [u8] {
        self.span.slice(source)
    }
}
