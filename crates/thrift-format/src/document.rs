//! Whole-document formatting.

use crate::hints::collect_hints;
use crate::options::FormatOptions;
use crate::policy::prepare_formatting;
use crate::writer::TokenWriter;
use thrift_diagnostics::{Diagnostic, Error};
use thrift_syntax::Tree;
use thrift_text::Context;

/// Result of a document format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    /// The formatted bytes
    pub output: Vec<u8>,
    /// True when the output differs from the source
    pub changed: bool,
    /// Informational diagnostics gathered while formatting
    pub diagnostics: Vec<Diagnostic>,
}

/// Formats a whole document.
///
/// Fails closed (`Error::UnsafeToFormat`) on invalid UTF-8, degraded trees,
/// non-recoverable diagnostics, and unterminated string/comment literals.
/// Structurally recoverable parse errors do not prevent formatting.
pub fn document(ctx: &Context, tree: &Tree, options: &FormatOptions) -> Result<FormatResult, Error> {
    let prepared = prepare_formatting(ctx, tree, options)?;
    let hints = collect_hints(tree, &prepared.options);

    let mut writer =
        TokenWriter::new(tree, &hints, &prepared.options, &prepared.policy, 0, true);
    if prepared.policy.has_bom {
        writer.emit_bom();
    }
    if tree.tokens.len() > 1 {
        writer.write_range(ctx, 0, tree.tokens.len() as u32 - 2, true, false)?;
    }
    let output = writer.finish_document();

    let changed = output != tree.source;
    Ok(FormatResult { output, changed, diagnostics: prepared.diagnostics })
}
