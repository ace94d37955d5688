//! Diagnostics collection and publication.

use crate::convert::diagnostic_to_wire;
use thrift_diagnostics::sort_diagnostics;
use thrift_lint::Runner;
use thrift_ls_protocol::PublishDiagnosticsParams;
use thrift_store::SnapshotStore;
use thrift_text::Context;
use tracing::debug;

/// Collects tree + lint diagnostics for the current snapshot of `uri`.
///
/// Returns `None` when the document is not open or when its version moved
/// while collecting (the publication is skipped; a newer one will follow).
pub fn collect(
    ctx: &Context,
    store: &SnapshotStore,
    lint: &Runner,
    uri: &str,
) -> Option<PublishDiagnosticsParams> {
    let snapshot = store.snapshot(uri)?;
    let mut diagnostics = snapshot.tree.diagnostics.clone();
    if let Ok(lint_diagnostics) = lint.run(ctx, &snapshot.tree) {
        diagnostics.extend(lint_diagnostics);
    }
    sort_diagnostics(&mut diagnostics);

    // A later change invalidates this batch.
    let current = store.snapshot(uri)?;
    if current.version != snapshot.version {
        debug!(uri, stale = snapshot.version, current = current.version, "skipping publication");
        return None;
    }

    let wire = diagnostics
        .iter()
        .map(|d| diagnostic_to_wire(&snapshot.tree, d))
        .collect();
    Some(PublishDiagnosticsParams {
        uri: uri.to_string(),
        diagnostics: wire,
        version: Some(snapshot.version),
    })
}

/// The empty publication sent on `didClose` (no version).
pub fn cleared(uri: &str) -> PublishDiagnosticsParams {
    PublishDiagnosticsParams { uri: uri.to_string(), diagnostics: Vec::new(), version: None }
}
