//! Formatting options and normalization.

use serde::{Deserialize, Serialize};
use thrift_diagnostics::Error;

/// Caller-supplied options; `None` fields take defaults during
/// normalization, so an explicit zero is distinguishable from "unset".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Maximum preferred line width (default 100)
    #[serde(rename = "lineWidth")]
    pub line_width: Option<usize>,
    /// One indent level (default two spaces)
    pub indent: Option<String>,
    /// Maximum consecutive blank lines kept between content lines
    /// (default 2)
    #[serde(rename = "maxBlankLines")]
    pub max_blank_lines: Option<usize>,
}

/// Options after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// Maximum preferred line width
    pub line_width: usize,
    /// One indent level
    pub indent: String,
    /// Maximum consecutive blank lines
    pub max_blank_lines: usize,
}

impl ResolvedOptions {
    /// Emitted breaks are capped at `max_blank_lines + 1` newlines, never
    /// below one.
    pub fn break_cap(&self) -> usize {
        (self.max_blank_lines + 1).max(1)
    }
}

/// Applies defaults and validates.
pub fn resolve_options(options: &FormatOptions) -> Result<ResolvedOptions, Error> {
    let indent = options.indent.clone().unwrap_or_else(|| "  ".to_string());
    if indent.bytes().any(|b| b == b'\n' || b == b'\r') {
        return Err(Error::InvalidOption("indent must not contain line terminators".into()));
    }
    Ok(ResolvedOptions {
        line_width: options.line_width.unwrap_or(100),
        indent,
        max_blank_lines: options.max_blank_lines.unwrap_or(2),
    })
}
