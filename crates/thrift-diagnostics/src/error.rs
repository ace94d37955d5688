//! The typed error taxonomy propagated across crate boundaries.

use thiserror::Error;
use thrift_text::{ByteSpan, Cancelled, EditError, PositionError};

/// Why the formatter refused to produce output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafeReason {
    /// The source is not valid UTF-8.
    InvalidUtf8,
    /// The tree carries diagnostics that make emission unsafe.
    SyntaxErrors,
}

impl UnsafeReason {
    /// Stable string form (`invalid_utf8` / `syntax_errors`).
    pub fn as_str(self) -> &'static str {
        match self {
            UnsafeReason::InvalidUtf8 => "invalid_utf8",
            UnsafeReason::SyntaxErrors => "syntax_errors",
        }
    }
}

/// Library error kinds.
///
/// Each variant carries the data the LSP mapping table needs; callers match
/// on kinds, never on message strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An option value failed normalization.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// An edit set failed validation.
    #[error("invalid edit: {0}")]
    InvalidEdit(#[from] EditError),

    /// A span is unordered or out of bounds.
    #[error("invalid span {span}: {message}")]
    InvalidSpan {
        /// The offending span
        span: ByteSpan,
        /// What was wrong with it
        message: String,
    },

    /// A formatting range is out of bounds for the document.
    #[error("invalid range {span}: {message}")]
    InvalidRange {
        /// The offending range
        span: ByteSpan,
        /// What was wrong with it
        message: String,
    },

    /// A position failed UTF-8/UTF-16 translation.
    #[error("invalid position: {0}")]
    InvalidPosition(#[from] PositionError),

    /// The request's context was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// Fail-closed formatting refusal.
    #[error("refusing to format ({}): {message}", reason.as_str())]
    UnsafeToFormat {
        /// Refusal category
        reason: UnsafeReason,
        /// Human-readable explanation
        message: String,
    },

    /// A change or query referenced a document that is not open.
    #[error("document not open: {uri}")]
    DocumentNotOpen {
        /// Document URI
        uri: String,
    },

    /// A change or pinned query carried a non-monotonic version.
    #[error("stale version {requested} (current {current}) for {uri}")]
    StaleVersion {
        /// Document URI
        uri: String,
        /// Version currently stored
        current: i32,
        /// Version the caller supplied
        requested: i32,
    },

    /// A request arrived after `shutdown`.
    #[error("shutdown requested")]
    ShutdownRequested,

    /// Parser infrastructure failure; the resulting tree is degraded.
    #[error("internal parse failure: {0}")]
    InternalParse(String),

    /// Doc IR rendering was configured with invalid options.
    #[error("invalid render: {0}")]
    InvalidRender(String),
}

impl From<Cancelled> for Error {
    fn from(_: Cancelled) -> Self {
        Error::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsafe_reason_strings() {
        assert_eq!(UnsafeReason::InvalidUtf8.as_str(), "invalid_utf8");
        assert_eq!(UnsafeReason::SyntaxErrors.as_str(), "syntax_errors");
    }

    #[test]
    fn display_carries_context() {
        let err = Error::StaleVersion { uri: "file:///a.thrift".into(), current: 4, requested: 3 };
        assert_eq!(err.to_string(), "stale version 3 (current 4) for file:///a.thrift");

        let err = Error::UnsafeToFormat {
            reason: UnsafeReason::SyntaxErrors,
            message: "unterminated string".into(),
        };
        assert!(err.to_string().contains("syntax_errors"));
    }

    #[test]
    fn cancelled_converts() {
        let err: Error = Cancelled.into();
        assert_eq!(err, Error::Cancelled);
    }
}
