//! Humanized diagnostic rendering with a caret-indicator line.

use crate::diagnostic::Diagnostic;
use thrift_text::LineIndex;

/// Renders a diagnostic as a human-readable excerpt:
///
/// ```text
/// error[LEX_UNTERMINATED_STRING]: unterminated string literal
///   --> 1:18
///    |
///  1 | const string X = 'unterminated
///    |                  ^^^^^^^^^^^^^
/// ```
///
/// Lines and columns are 1-based. The caret run covers the diagnostic span,
/// clamped to the first line it touches; an empty span renders one caret.
pub fn render_diagnostic(source: &[u8], diagnostic: &Diagnostic) -> String {
    let index = LineIndex::new(source);
    let start = diagnostic.span.start.min(source.len());
    let line = index.line_at(start);
    let line_start = index.line_start(line).unwrap_or(0);
    let line_end = index.content_end(line, source);
    let line_text = String::from_utf8_lossy(&source[line_start..line_end.max(line_start)]);

    let column = start.saturating_sub(line_start);
    let caret_end = diagnostic.span.end.min(line_end).max(start);
    let caret_len = (caret_end - start).max(1);

    let line_no = line + 1;
    let gutter_width = line_no.to_string().len().max(2);

    let mut out = String::new();
    out.push_str(&format!(
        "{}[{}]: {}\n",
        diagnostic.severity, diagnostic.code, diagnostic.message
    ));
    out.push_str(&format!("{:width$}--> {}:{}\n", "", line_no, column + 1, width = gutter_width));
    out.push_str(&format!("{:width$} |\n", "", width = gutter_width));
    out.push_str(&format!("{:width$} | {}\n", line_no, line_text, width = gutter_width));
    out.push_str(&format!(
        "{:width$} | {}{}\n",
        "",
        " ".repeat(column),
        "^".repeat(caret_len),
        width = gutter_width
    ));
    out
}
