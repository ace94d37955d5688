//! Versioned snapshot store for open documents.
//!
//! The store maps document URIs to immutable snapshots under a read/write
//! lock. `open`/`change`/`close` mutate under the write lock; readers take
//! snapshots under the read lock. Versions are strictly monotonic per URI,
//! and a change to a document that is not open is an error.
//!
//! `change` translates LSP UTF-16 ranges into byte edits and decides
//! between the incremental and full reparse paths: incremental eligibility
//! is lost on whole-document changes, on batches above
//! [`MAX_INCREMENTAL_CHANGES`], and on edit volumes above
//! [`MAX_INCREMENTAL_BYTES`].

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use thrift_diagnostics::Error;
use thrift_syntax::{InputEdit, ParseOptions, Tree, parse, reparse};
use thrift_text::{Context, LineIndex, Utf16Position};
use tracing::debug;

/// Incremental reparse is skipped for batches with more changes than this.
pub const MAX_INCREMENTAL_CHANGES: usize = 1024;
/// Incremental reparse is skipped when the edited byte volume (removed
/// plus inserted) exceeds this budget.
pub const MAX_INCREMENTAL_BYTES: usize = 256 * 1024;

/// An immutable parse result pinned to one document version.
#[derive(Debug)]
pub struct Snapshot {
    /// Document URI
    pub uri: String,
    /// Version the snapshot was parsed from
    pub version: i32,
    /// The parse tree
    pub tree: Arc<Tree>,
}

/// One change from a `didChange` notification.
#[derive(Debug, Clone)]
pub struct DocumentChange {
    /// UTF-16 range being replaced; `None` replaces the whole document
    pub range: Option<(Utf16Position, Utf16Position)>,
    /// Replacement text
    pub text: String,
}

impl DocumentChange {
    /// A whole-document replacement.
    pub fn whole(text: impl Into<String>) -> Self {
        Self { range: None, text: text.into() }
    }

    /// A ranged replacement.
    pub fn ranged(start: Utf16Position, end: Utf16Position, text: impl Into<String>) -> Self {
        Self { range: Some((start, end)), text: text.into() }
    }
}

/// The uri → snapshot map.
pub struct SnapshotStore {
    documents: RwLock<FxHashMap<String, Arc<Snapshot>>>,
    options: ParseOptions,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Creates an empty store with default parse options.
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    /// Creates an empty store with explicit parse options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { documents: RwLock::new(FxHashMap::default()), options }
    }

    /// Opens (or re-opens) a document, parsing it in full. Replacing a
    /// previous entry closes its tree.
    pub fn open(
        &self,
        ctx: &Context,
        uri: &str,
        version: i32,
        text: String,
    ) -> Result<Arc<Snapshot>, Error> {
        let tree = parse(ctx, uri, version, text.into_bytes(), &self.options)?;
        let snapshot = Arc::new(Snapshot {
            uri: uri.to_string(),
            version,
            tree: Arc::new(tree),
        });
        let previous = self.documents.write().insert(uri.to_string(), snapshot.clone());
        if let Some(previous) = previous {
            previous.tree.close();
        }
        debug!(uri, version, "document opened");
        Ok(snapshot)
    }

    /// Applies a change batch and reparses.
    ///
    /// Requires the document to be open and `version` to be strictly
    /// greater than the stored version. The previous snapshot is replaced
    /// atomically and its tree closed.
    pub fn change(
        &self,
        ctx: &Context,
        uri: &str,
        version: i32,
        changes: &[DocumentChange],
    ) -> Result<Arc<Snapshot>, Error> {
        let previous = self
            .snapshot(uri)
            .ok_or_else(|| Error::DocumentNotOpen { uri: uri.to_string() })?;
        if version <= previous.version {
            return Err(Error::StaleVersion {
                uri: uri.to_string(),
                current: previous.version,
                requested: version,
            });
        }

        let translated = translate_changes(&previous.tree.source, changes)?;
        let edits = if translated.incremental_eligible {
            Some(translated.edits.as_slice())
        } else {
            None
        };
        let tree = reparse(
            ctx,
            &previous.tree,
            uri,
            version,
            translated.source,
            edits,
            &self.options,
        )?;

        let snapshot =
            Arc::new(Snapshot { uri: uri.to_string(), version, tree: Arc::new(tree) });
        let replaced = self.documents.write().insert(uri.to_string(), snapshot.clone());
        if let Some(replaced) = replaced {
            replaced.tree.close();
        }
        debug!(uri, version, incremental = translated.incremental_eligible, "document changed");
        Ok(snapshot)
    }

    /// Closes a document, releasing its tree.
    pub fn close(&self, uri: &str) -> Result<(), Error> {
        match self.documents.write().remove(uri) {
            Some(snapshot) => {
                snapshot.tree.close();
                debug!(uri, "document closed");
                Ok(())
            }
            None => Err(Error::DocumentNotOpen { uri: uri.to_string() }),
        }
    }

    /// The current snapshot for a URI, if open.
    pub fn snapshot(&self, uri: &str) -> Option<Arc<Snapshot>> {
        self.documents.read().get(uri).cloned()
    }

    /// The snapshot for a URI only if its version matches exactly.
    pub fn snapshot_at_version(&self, uri: &str, version: i32) -> Result<Arc<Snapshot>, Error> {
        let snapshot = self
            .snapshot(uri)
            .ok_or_else(|| Error::DocumentNotOpen { uri: uri.to_string() })?;
        if snapshot.version != version {
            return Err(Error::StaleVersion {
                uri: uri.to_string(),
                current: snapshot.version,
                requested: version,
            });
        }
        Ok(snapshot)
    }

    /// URIs of all open documents.
    pub fn open_uris(&self) -> Vec<String> {
        self.documents.read().keys().cloned().collect()
    }
}

struct TranslatedChanges {
    source: Vec<u8>,
    edits: Vec<InputEdit>,
    incremental_eligible: bool,
}

/// Applies the change batch to a copy of `source`, producing the new buffer
/// and the per-change edit descriptors. Each change's range refers to the
/// buffer produced by the previous change.
fn translate_changes(
    source: &[u8],
    changes: &[DocumentChange],
) -> Result<TranslatedChanges, Error> {
    let mut buffer = source.to_vec();
    let mut edits = Vec::with_capacity(changes.len());
    let mut eligible = changes.len() <= MAX_INCREMENTAL_CHANGES;
    let mut edited_bytes = 0usize;

    for change in changes {
        match &change.range {
            None => {
                buffer = change.text.clone().into_bytes();
                edits.clear();
                eligible = false;
            }
            Some((start, end)) => {
                let index = LineIndex::new(&buffer);
                let start_byte = index.utf16_to_offset(&buffer, *start)?;
                let end_byte = index.utf16_to_offset(&buffer, *end)?;
                if end_byte < start_byte {
                    return Err(Error::InvalidSpan {
                        span: thrift_text::ByteSpan { start: start_byte, end: end_byte },
                        message: "change range end precedes start".to_string(),
                    });
                }
                let start_point = index.offset_to_point(&buffer, start_byte)?;
                let old_end_point = index.offset_to_point(&buffer, end_byte)?;

                let new_end_byte = start_byte + change.text.len();
                buffer.splice(start_byte..end_byte, change.text.bytes());

                let new_index = LineIndex::new(&buffer);
                let new_end_point = new_index.offset_to_point(&buffer, new_end_byte)?;

                edited_bytes += (end_byte - start_byte) + change.text.len();
                edits.push(InputEdit {
                    start_byte,
                    old_end_byte: end_byte,
                    new_end_byte,
                    start_point,
                    old_end_point,
                    new_end_point,
                });
            }
        }
    }
    if edited_bytes > MAX_INCREMENTAL_BYTES {
        eligible = false;
    }
    Ok(TranslatedChanges { source: buffer, edits, incremental_eligible: eligible })
}
