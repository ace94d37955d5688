//! Conversions between byte spans and UTF-16 wire positions.

use thrift_diagnostics::Diagnostic;
use thrift_ls_protocol::{Position, Range, WireDiagnostic};
use thrift_syntax::Tree;
use thrift_text::{ByteSpan, Utf16Position};

/// Converts a byte offset to a wire position, clamping on translation
/// failure (invalid UTF-8 sources still need best-effort diagnostics).
pub fn offset_to_position(tree: &Tree, offset: usize) -> Position {
    match tree.line_index.offset_to_utf16(&tree.source, offset.min(tree.source.len())) {
        Ok(pos) => Position::new(pos.line, pos.character),
        Err(_) => Position::new(tree.line_index.line_at(offset) as u32, 0),
    }
}

/// Converts a byte span to a wire range (best effort).
pub fn span_to_range(tree: &Tree, span: ByteSpan) -> Range {
    Range::new(offset_to_position(tree, span.start), offset_to_position(tree, span.end))
}

/// Converts a wire position to a byte offset.
pub fn position_to_offset(
    tree: &Tree,
    position: Position,
) -> Result<usize, thrift_text::PositionError> {
    tree.line_index
        .utf16_to_offset(&tree.source, Utf16Position::new(position.line, position.character))
}

/// Converts a wire range to a byte span.
pub fn range_to_span(
    tree: &Tree,
    range: Range,
) -> Result<ByteSpan, thrift_text::PositionError> {
    let start = position_to_offset(tree, range.start)?;
    let end = position_to_offset(tree, range.end)?;
    Ok(ByteSpan::new(start.min(end), end.max(start)))
}

/// Converts a library diagnostic to its wire form.
pub fn diagnostic_to_wire(tree: &Tree, diagnostic: &Diagnostic) -> WireDiagnostic {
    WireDiagnostic {
        range: span_to_range(tree, diagnostic.span),
        severity: diagnostic.severity.to_lsp_value(),
        code: diagnostic.code.as_str().to_string(),
        source: diagnostic.source.to_string(),
        message: diagnostic.message.clone(),
    }
}
