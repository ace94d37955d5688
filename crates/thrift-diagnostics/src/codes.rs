//! Stable diagnostic codes and severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of a diagnostic.
///
/// Maps to LSP DiagnosticSeverity values (1=Error, 2=Warning, 3=Info).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Critical problem in the input or in the tool itself.
    Error = 1,
    /// Non-critical issue that should be addressed.
    Warning = 2,
    /// Informational message.
    Info = 3,
}

impl Severity {
    /// Get the LSP numeric value for this severity.
    pub fn to_lsp_value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Stable diagnostic codes.
///
/// Each code has a fixed string representation, a default severity, and a
/// default recoverability. Recoverable diagnostics are reported and work
/// continues; non-recoverable diagnostics mark the tree unsafe for
/// formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Byte sequence that is not valid UTF-8
    LexInvalidByte,
    /// Character with no meaning in the grammar
    LexUnknownCharacter,
    /// String literal missing its closing quote
    LexUnterminatedString,
    /// Block comment missing its `*/`
    LexUnterminatedBlockComment,
    /// `0x` with no hex digits
    LexInvalidHexLiteral,

    /// Grammar error node
    ParseErrorNode,
    /// Grammar missing (zero-width inserted) node
    ParseMissingNode,
    /// Token/node span alignment invariant violated
    InternalAlignment,
    /// Parser infrastructure failure; the tree is degraded
    InternalParse,
    /// Incremental verification mismatch; incremental reparse disabled
    InternalVerification,

    /// Both LF and CRLF present; output normalizes to the dominant style
    FmtMixedNewlines,
    /// Source is not valid UTF-8; formatting refused
    FmtInvalidUtf8,
    /// Range formatting found no format-safe ancestor node
    FmtRangeNoSafeAncestor,
    /// Range formatting ancestor lacks bounded token coverage
    FmtRangeUnboundedAncestor,

    /// Field without an explicit field id
    LintFieldIdRequired,
    /// Deprecated `xsd_optional` field modifier
    LintDeprecatedFieldXsdOptional,
    /// Deprecated `xsd_nillable` field modifier
    LintDeprecatedFieldXsdNillable,
    /// Deprecated `xsd_attrs` field modifier
    LintDeprecatedFieldXsdAttrs,
}

impl DiagnosticCode {
    /// Get the stable string representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::LexInvalidByte => "LEX_INVALID_BYTE",
            DiagnosticCode::LexUnknownCharacter => "LEX_UNKNOWN_CHARACTER",
            DiagnosticCode::LexUnterminatedString => "LEX_UNTERMINATED_STRING",
            DiagnosticCode::LexUnterminatedBlockComment => "LEX_UNTERMINATED_BLOCK_COMMENT",
            DiagnosticCode::LexInvalidHexLiteral => "LEX_INVALID_HEX_LITERAL",
            DiagnosticCode::ParseErrorNode => "PARSE_ERROR_NODE",
            DiagnosticCode::ParseMissingNode => "PARSE_MISSING_NODE",
            DiagnosticCode::InternalAlignment => "INTERNAL_ALIGNMENT",
            DiagnosticCode::InternalParse => "INTERNAL_PARSE",
            DiagnosticCode::InternalVerification => "INTERNAL_VERIFICATION",
            DiagnosticCode::FmtMixedNewlines => "FMT_MIXED_NEWLINES",
            DiagnosticCode::FmtInvalidUtf8 => "FMT_INVALID_UTF8",
            DiagnosticCode::FmtRangeNoSafeAncestor => "FMT_RANGE_NO_SAFE_ANCESTOR",
            DiagnosticCode::FmtRangeUnboundedAncestor => "FMT_RANGE_UNBOUNDED_ANCESTOR",
            DiagnosticCode::LintFieldIdRequired => "LINT_FIELD_ID_REQUIRED",
            DiagnosticCode::LintDeprecatedFieldXsdOptional => "LINT_DEPRECATED_FIELD_XSD_OPTIONAL",
            DiagnosticCode::LintDeprecatedFieldXsdNillable => "LINT_DEPRECATED_FIELD_XSD_NILLABLE",
            DiagnosticCode::LintDeprecatedFieldXsdAttrs => "LINT_DEPRECATED_FIELD_XSD_ATTRS",
        }
    }

    /// Get the default severity for this code.
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::LexInvalidByte
            | DiagnosticCode::LexUnknownCharacter
            | DiagnosticCode::LexUnterminatedString
            | DiagnosticCode::LexUnterminatedBlockComment
            | DiagnosticCode::LexInvalidHexLiteral
            | DiagnosticCode::ParseErrorNode
            | DiagnosticCode::ParseMissingNode
            | DiagnosticCode::InternalAlignment
            | DiagnosticCode::InternalParse
            | DiagnosticCode::FmtInvalidUtf8
            | DiagnosticCode::FmtRangeNoSafeAncestor
            | DiagnosticCode::FmtRangeUnboundedAncestor => Severity::Error,

            DiagnosticCode::InternalVerification
            | DiagnosticCode::LintFieldIdRequired
            | DiagnosticCode::LintDeprecatedFieldXsdOptional
            | DiagnosticCode::LintDeprecatedFieldXsdNillable
            | DiagnosticCode::LintDeprecatedFieldXsdAttrs => Severity::Warning,

            DiagnosticCode::FmtMixedNewlines => Severity::Info,
        }
    }

    /// Whether work continues after reporting this code.
    ///
    /// Non-recoverable codes mark the tree unsafe: the formatter refuses and
    /// query responses become best-effort.
    pub fn recoverable(&self) -> bool {
        !matches!(self, DiagnosticCode::InternalAlignment | DiagnosticCode::InternalParse)
    }

    /// Try to parse a stable code string back into a code.
    pub fn parse_code(code: &str) -> Option<DiagnosticCode> {
        match code {
            "LEX_INVALID_BYTE" => Some(DiagnosticCode::LexInvalidByte),
            "LEX_UNKNOWN_CHARACTER" => Some(DiagnosticCode::LexUnknownCharacter),
            "LEX_UNTERMINATED_STRING" => Some(DiagnosticCode::LexUnterminatedString),
            "LEX_UNTERMINATED_BLOCK_COMMENT" => Some(DiagnosticCode::LexUnterminatedBlockComment),
            "LEX_INVALID_HEX_LITERAL" => Some(DiagnosticCode::LexInvalidHexLiteral),
            "PARSE_ERROR_NODE" => Some(DiagnosticCode::ParseErrorNode),
            "PARSE_MISSING_NODE" => Some(DiagnosticCode::ParseMissingNode),
            "INTERNAL_ALIGNMENT" => Some(DiagnosticCode::InternalAlignment),
            "INTERNAL_PARSE" => Some(DiagnosticCode::InternalParse),
            "INTERNAL_VERIFICATION" => Some(DiagnosticCode::InternalVerification),
            "FMT_MIXED_NEWLINES" => Some(DiagnosticCode::FmtMixedNewlines),
            "FMT_INVALID_UTF8" => Some(DiagnosticCode::FmtInvalidUtf8),
            "FMT_RANGE_NO_SAFE_ANCESTOR" => Some(DiagnosticCode::FmtRangeNoSafeAncestor),
            "FMT_RANGE_UNBOUNDED_ANCESTOR" => Some(DiagnosticCode::FmtRangeUnboundedAncestor),
            "LINT_FIELD_ID_REQUIRED" => Some(DiagnosticCode::LintFieldIdRequired),
            "LINT_DEPRECATED_FIELD_XSD_OPTIONAL" => {
                Some(DiagnosticCode::LintDeprecatedFieldXsdOptional)
            }
            "LINT_DEPRECATED_FIELD_XSD_NILLABLE" => {
                Some(DiagnosticCode::LintDeprecatedFieldXsdNillable)
            }
            "LINT_DEPRECATED_FIELD_XSD_ATTRS" => Some(DiagnosticCode::LintDeprecatedFieldXsdAttrs),
            _ => None,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
