//! Source policy detection and the fail-closed safety gate.

use crate::options::{FormatOptions, ResolvedOptions, resolve_options};
use thrift_diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticSource, Error, UnsafeReason,
};
use thrift_syntax::Tree;
use thrift_text::{ByteSpan, Context};

/// UTF-8 byte-order mark.
pub const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Detected facts about the source that the writer must respect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePolicy {
    /// The source begins with a BOM; the output re-emits it
    pub has_bom: bool,
    /// Dominant newline style; the output normalizes to it
    pub newline: &'static str,
    /// Both LF and CRLF occur in the source
    pub mixed_newlines: bool,
    /// The source is valid UTF-8
    pub utf8_valid: bool,
    /// The source ends with a line terminator
    pub trailing_newline: bool,
}

impl SourcePolicy {
    /// Computes the policy for a source buffer.
    pub fn detect(source: &[u8]) -> SourcePolicy {
        let has_bom = source.starts_with(BOM);
        let (lf, crlf) = count_newlines(source);
        let newline = if lf > crlf { "\n" } else if crlf > 0 { "\r\n" } else { "\n" };
        SourcePolicy {
            has_bom,
            newline,
            mixed_newlines: lf > 0 && crlf > 0,
            utf8_valid: std::str::from_utf8(source).is_ok(),
            trailing_newline: matches!(source.last(), Some(b'\n') | Some(b'\r')),
        }
    }
}

/// Counts bare-LF and CRLF terminators separately.
fn count_newlines(source: &[u8]) -> (usize, usize) {
    let mut lf = 0usize;
    let mut crlf = 0usize;
    let mut pos = 0;
    while let Some(i) = memchr::memchr(b'\n', &source[pos..]) {
        let at = pos + i;
        if at > 0 && source[at - 1] == b'\r' {
            crlf += 1;
        } else {
            lf += 1;
        }
        pos = at + 1;
    }
    (lf, crlf)
}

/// Everything the writer needs, produced by the safety gate.
#[derive(Debug)]
pub struct Prepared {
    /// Detected source policy
    pub policy: SourcePolicy,
    /// Normalized options
    pub options: ResolvedOptions,
    /// Informational diagnostics (mixed newlines)
    pub diagnostics: Vec<Diagnostic>,
}

/// The fail-closed gate: verifies cancellation state, tree health, UTF-8
/// validity, and the absence of formatting-unsafe diagnostics before any
/// byte is emitted.
pub fn prepare_formatting(
    ctx: &Context,
    tree: &Tree,
    options: &FormatOptions,
) -> Result<Prepared, Error> {
    ctx.check()?;

    let policy = SourcePolicy::detect(&tree.source);
    let options = resolve_options(options)?;

    if !policy.utf8_valid {
        return Err(Error::UnsafeToFormat {
            reason: UnsafeReason::InvalidUtf8,
            message: "source is not valid UTF-8".to_string(),
        });
    }
    if tree.is_degraded() {
        return Err(Error::UnsafeToFormat {
            reason: UnsafeReason::SyntaxErrors,
            message: "parse produced a degraded tree".to_string(),
        });
    }
    for diagnostic in &tree.diagnostics {
        let unsafe_lex = matches!(
            diagnostic.code,
            DiagnosticCode::LexUnterminatedString | DiagnosticCode::LexUnterminatedBlockComment
        );
        if !diagnostic.recoverable || unsafe_lex {
            return Err(Error::UnsafeToFormat {
                reason: UnsafeReason::SyntaxErrors,
                message: format!("{}: {}", diagnostic.code, diagnostic.message),
            });
        }
    }

    let mut diagnostics = Vec::new();
    if policy.mixed_newlines {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::FmtMixedNewlines,
            ByteSpan::whole(&tree.source),
            DiagnosticSource::Formatter,
            format!("mixed line endings; normalizing to {:?}", policy.newline),
        ));
    }

    Ok(Prepared { policy, options, diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn detects_dominant_newline() {
        assert_eq!(SourcePolicy::detect(b"a\nb\nc\r\n").newline, "\n");
        assert_eq!(SourcePolicy::detect(b"a\r\nb\r\nc\n").newline, "\r\n");
        assert_eq!(SourcePolicy::detect(b"no terminator").newline, "\n");
    }

    #[test]
    fn detects_mixed_and_bom() {
        let policy = SourcePolicy::detect(b"\xEF\xBB\xBFa\nb\r\n");
        assert!(policy.has_bom);
        assert!(policy.mixed_newlines);
        assert!(policy.trailing_newline);
    }

    #[test]
    fn lone_cr_counts_as_trailing() {
        assert!(SourcePolicy::detect(b"a\r").trailing_newline);
        assert!(!SourcePolicy::detect(b"a").trailing_newline);
    }
}
