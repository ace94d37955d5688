//! The unified diagnostic value shared by every layer.

use crate::codes::{DiagnosticCode, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;
use thrift_text::ByteSpan;

/// Which layer produced a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiagnosticSource {
    /// The lossless lexer
    Lexer,
    /// The grammar parser / CST builder
    Parser,
    /// The formatter safety gate
    Formatter,
    /// A lint rule; carries the runner's source tag (e.g. `thriftls.lint`)
    Lint(String),
}

impl fmt::Display for DiagnosticSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSource::Lexer => f.write_str("lexer"),
            DiagnosticSource::Parser => f.write_str("parser"),
            DiagnosticSource::Formatter => f.write_str("formatter"),
            DiagnosticSource::Lint(tag) => f.write_str(tag),
        }
    }
}

/// Additional location attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedInfo {
    /// Byte span of the related location
    pub span: ByteSpan,
    /// Message for the related location
    pub message: String,
}

/// One reported problem with a stable code, severity, and byte span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable code
    pub code: DiagnosticCode,
    /// Human-readable message
    pub message: String,
    /// Severity
    pub severity: Severity,
    /// Byte span the diagnostic points at
    pub span: ByteSpan,
    /// Related locations
    pub related: Vec<RelatedInfo>,
    /// Producing layer
    pub source: DiagnosticSource,
    /// Whether work continued after this diagnostic
    pub recoverable: bool,
}

impl Diagnostic {
    /// Creates a diagnostic with the code's default severity and
    /// recoverability.
    pub fn new(
        code: DiagnosticCode,
        span: ByteSpan,
        source: DiagnosticSource,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            severity: code.severity(),
            span,
            related: Vec::new(),
            source,
            recoverable: code.recoverable(),
        }
    }

    /// Overrides the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Appends a related location.
    pub fn with_related(mut self, span: ByteSpan, message: impl Into<String>) -> Self {
        self.related.push(RelatedInfo { span, message: message.into() });
        self
    }
}

/// Stable ordering: `(span.start, span.end, severity, code, message)`.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| {
        (a.span.start, a.span.end, a.severity, a.code, &a.message).cmp(&(
            b.span.start,
            b.span.end,
            b.severity,
            b.code,
            &b.message,
        ))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn diag(code: DiagnosticCode, start: usize, end: usize) -> Diagnostic {
        Diagnostic::new(code, ByteSpan::new(start, end), DiagnosticSource::Lexer, "x")
    }

    #[test]
    fn defaults_follow_code() {
        let d = diag(DiagnosticCode::LexUnterminatedString, 0, 4);
        assert_eq!(d.severity, Severity::Error);
        assert!(d.recoverable);

        let d = diag(DiagnosticCode::InternalParse, 0, 0);
        assert!(!d.recoverable);
    }

    #[test]
    fn sort_is_stable_by_tuple() {
        let mut diags = vec![
            diag(DiagnosticCode::LexUnknownCharacter, 5, 6),
            diag(DiagnosticCode::LexInvalidByte, 5, 6),
            diag(DiagnosticCode::LexInvalidByte, 1, 2),
            diag(DiagnosticCode::FmtMixedNewlines, 1, 2),
        ];
        sort_diagnostics(&mut diags);
        let order: Vec<_> = diags.iter().map(|d| (d.span.start, d.code)).collect();
        assert_eq!(
            order,
            vec![
                (1, DiagnosticCode::LexInvalidByte),
                (1, DiagnosticCode::FmtMixedNewlines),
                (5, DiagnosticCode::LexInvalidByte),
                (5, DiagnosticCode::LexUnknownCharacter),
            ]
        );
    }
}
