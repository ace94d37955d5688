//! Document and range formatting handlers.

use crate::convert::{offset_to_position, range_to_span, span_to_range};
use thrift_diagnostics::Error;
use thrift_format::FormatOptions;
use thrift_ls_protocol::{
    DocumentFormattingParams, DocumentRangeFormattingParams, Position, Range, TextEdit,
};
use thrift_store::SnapshotStore;
use thrift_text::Context;

/// Maps the client's `FormattingOptions` (tab size / spaces) onto the
/// formatter's options. Unknown fields are ignored.
fn format_options(options: &serde_json::Value) -> FormatOptions {
    let tab_size = options.get("tabSize").and_then(|v| v.as_u64()).unwrap_or(2) as usize;
    let insert_spaces = options
        .get("insertSpaces")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    let indent = if insert_spaces { " ".repeat(tab_size.max(1)) } else { "\t".to_string() };
    FormatOptions { indent: Some(indent), ..FormatOptions::default() }
}

/// `textDocument/formatting`: a single whole-document edit, or none.
pub fn formatting(
    ctx: &Context,
    store: &SnapshotStore,
    params: &DocumentFormattingParams,
) -> Result<Vec<TextEdit>, Error> {
    let uri = &params.text_document.uri;
    let snapshot = match params.version {
        Some(version) => store.snapshot_at_version(uri, version)?,
        None => store
            .snapshot(uri)
            .ok_or_else(|| Error::DocumentNotOpen { uri: uri.clone() })?,
    };

    let result = thrift_format::document(ctx, &snapshot.tree, &format_options(&params.options))?;
    if !result.changed {
        return Ok(Vec::new());
    }
    let end = offset_to_position(&snapshot.tree, snapshot.tree.source.len());
    Ok(vec![TextEdit {
        range: Range::new(Position::new(0, 0), end),
        new_text: String::from_utf8_lossy(&result.output).into_owned(),
    }])
}

/// `textDocument/rangeFormatting`: edits for the smallest format-safe
/// ancestor of the requested range.
pub fn range_formatting(
    ctx: &Context,
    store: &SnapshotStore,
    params: &DocumentRangeFormattingParams,
) -> Result<Vec<TextEdit>, Error> {
    let uri = &params.text_document.uri;
    let snapshot = store
        .snapshot(uri)
        .ok_or_else(|| Error::DocumentNotOpen { uri: uri.clone() })?;

    let span = range_to_span(&snapshot.tree, params.range)?;
    let result =
        thrift_format::range(ctx, &snapshot.tree, span, &format_options(&params.options))?;
    Ok(result
        .edits
        .into_iter()
        .map(|edit| TextEdit {
            range: span_to_range(&snapshot.tree, edit.span),
            new_text: String::from_utf8_lossy(&edit.text).into_owned(),
        })
        .collect())
}
