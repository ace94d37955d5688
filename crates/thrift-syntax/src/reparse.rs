//! Full and incremental reparse with verified fallback.
//!
//! The incremental path edits the previous raw tree, reparses with it as a
//! hint, extracts and validates the changed ranges, and rebuilds the CST.
//! Every [`ParseOptions::verification_interval`]-th incremental reparse is
//! checked against an independent full parse; a mismatch keeps the full
//! result, disables incremental reparse for the document, and appends a
//! warning diagnostic. Any failure along the incremental path falls back to
//! a full reparse with the existing parser handle.

use crate::builder;
use crate::grammar::{
    self, GrammarTree, InputEdit, acquire_parser, validate_changed_ranges,
};
use crate::tree::{NO_NODE, RuntimeState, Tree};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thrift_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSource, Error};
use thrift_lexer::lex;
use thrift_text::{ByteSpan, Context, LineIndex};
use tracing::{debug, warn};

/// Options for parse and reparse.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Run a verifying full parse every N-th incremental reparse (N ≥ 1).
    pub verification_interval: u64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { verification_interval: 256 }
    }
}

impl ParseOptions {
    fn interval(&self) -> u64 {
        self.verification_interval.max(1)
    }
}

/// How a reparse was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReparseMode {
    /// Full parse
    Full,
    /// Incremental parse using the edited old tree
    Incremental,
    /// Incremental was requested but a failure forced a full parse
    FallbackFull,
}

impl ReparseMode {
    /// Stable string form.
    pub fn as_str(self) -> &'static str {
        match self {
            ReparseMode::Full => "full",
            ReparseMode::Incremental => "incremental",
            ReparseMode::FallbackFull => "fallback_full",
        }
    }
}

/// Observable record of one reparse, for telemetry and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReparseEvent {
    /// How the reparse was performed
    pub mode: ReparseMode,
    /// An old tree (with runtime handle) was available
    pub provided_old_tree: bool,
    /// Edits were applied to the old raw tree
    pub applied_tree_edits: bool,
    /// Number of validated changed ranges (0 for full parses)
    pub changed_range_count: usize,
    /// The periodic verifying full parse ran
    pub verification_run: bool,
    /// The verifying full parse disagreed with the incremental result
    pub verification_failed: bool,
    /// Why the incremental path was abandoned, when it was
    pub fallback_reason: Option<String>,
}

type Observer = Arc<dyn Fn(&ReparseEvent) + Send + Sync>;

static REPARSE_OBSERVER: Lazy<RwLock<Option<Observer>>> = Lazy::new(|| RwLock::new(None));

/// Registers the process-wide reparse observer. Test-only; pass `None` to
/// clear.
pub fn set_reparse_observer(observer: Option<Observer>) {
    *REPARSE_OBSERVER.write() = observer;
}

fn emit_event(event: &ReparseEvent) {
    debug!(
        mode = event.mode.as_str(),
        changed_ranges = event.changed_range_count,
        verification_run = event.verification_run,
        verification_failed = event.verification_failed,
        fallback_reason = event.fallback_reason.as_deref().unwrap_or(""),
        "reparse"
    );
    let observer = REPARSE_OBSERVER.read().clone();
    if let Some(observer) = observer {
        observer(event);
    }
}

/// Parses `source` into a fresh tree.
///
/// When no grammar parser is available, the result is a degraded tree: root
/// is `NO_NODE` and a non-recoverable `INTERNAL_PARSE` diagnostic is
/// attached. Callers treat degraded trees as unsafe.
pub fn parse(
    ctx: &Context,
    uri: &str,
    version: i32,
    source: Vec<u8>,
    _opts: &ParseOptions,
) -> Result<Tree, Error> {
    ctx.check()?;
    let lexed = lex(&source);
    let Some(mut parser) = acquire_parser() else {
        return Ok(degraded_tree(uri, version, source, "no grammar parser available"));
    };
    ctx.check()?;
    let grammar_tree = match parser.parse(&source, &lexed.tokens, None) {
        Ok(tree) => tree,
        Err(err) => {
            return Ok(degraded_tree(uri, version, source, &err.to_string()));
        }
    };
    let whole = ByteSpan::whole(&source);
    Ok(assemble(
        uri,
        version,
        source,
        lexed.tokens,
        lexed.diagnostics,
        grammar_tree,
        vec![whole],
        Some(parser),
        false,
        0,
    ))
}

/// Reparses a document after edits.
///
/// `edits` describe the change from `old.source` to `source`; pass `None`
/// for a whole-document replacement. The incremental path is taken only
/// when edits are present, valid, and incremental reparse has not been
/// disabled for the document.
pub fn reparse(
    ctx: &Context,
    old: &Tree,
    uri: &str,
    version: i32,
    source: Vec<u8>,
    edits: Option<&[InputEdit]>,
    opts: &ParseOptions,
) -> Result<Tree, Error> {
    ctx.check()?;
    let runtime = old.take_runtime();
    let provided_old_tree = runtime.is_some();

    let mut event = ReparseEvent {
        mode: ReparseMode::Full,
        provided_old_tree,
        applied_tree_edits: false,
        changed_range_count: 0,
        verification_run: false,
        verification_failed: false,
        fallback_reason: None,
    };

    let lexed = lex(&source);
    ctx.check()?;

    let Some(mut runtime) = runtime else {
        // No runtime handle: full parse on a fresh parser.
        let whole = ByteSpan::whole(&source);
        let tree = match acquire_parser() {
            Some(mut parser) => match parser.parse(&source, &lexed.tokens, None) {
                Ok(grammar_tree) => assemble(
                    uri,
                    version,
                    source,
                    lexed.tokens,
                    lexed.diagnostics,
                    grammar_tree,
                    vec![whole],
                    Some(parser),
                    false,
                    0,
                ),
                Err(err) => degraded_tree(uri, version, source, &err.to_string()),
            },
            None => degraded_tree(uri, version, source, "no grammar parser available"),
        };
        if edits.is_some() {
            event.mode = ReparseMode::FallbackFull;
            event.fallback_reason = Some("no_runtime_handle".to_string());
        }
        emit_event(&event);
        return Ok(tree);
    };

    let incremental_ok = match edits {
        None => Err("whole_document_change".to_string()),
        Some(_) if runtime.incremental_disabled => Err("incremental_disabled".to_string()),
        Some(edits) => validate_edits(edits, old.source.len(), source.len()),
    };

    match incremental_ok {
        Err(reason) => {
            // Full reparse keeping the same parser handle.
            if edits.is_some() {
                event.mode = ReparseMode::FallbackFull;
                event.fallback_reason = Some(reason);
            }
            let tree = full_with_runtime(uri, version, source, lexed, runtime);
            emit_event(&event);
            Ok(tree)
        }
        Ok(()) => {
            let edits = edits.unwrap_or(&[]);
            let mut edited = runtime.grammar_tree.clone();
            edited.edit(edits);
            event.applied_tree_edits = true;

            let incremental = runtime
                .parser
                .parse(&source, &lexed.tokens, Some(&edited))
                .map_err(|e| e.to_string())
                .and_then(|new_tree| {
                    let ranges = edited.changed_ranges(&new_tree, source.len());
                    validate_changed_ranges(&ranges, source.len())
                        .map_err(|e| e.to_string())
                        .map(|()| (new_tree, ranges))
                });

            match incremental {
                Err(reason) => {
                    warn!(reason = reason.as_str(), "incremental reparse failed; falling back");
                    event.mode = ReparseMode::FallbackFull;
                    event.fallback_reason = Some(reason);
                    let tree = full_with_runtime(uri, version, source, lexed, runtime);
                    emit_event(&event);
                    Ok(tree)
                }
                Ok((new_tree, ranges)) => {
                    ctx.check()?;
                    event.mode = ReparseMode::Incremental;
                    event.changed_range_count = ranges.len();
                    runtime.incremental_count += 1;

                    let mut grammar_tree = new_tree;
                    let mut extra_diagnostic = None;
                    if runtime.incremental_count % opts.interval() == 0 {
                        event.verification_run = true;
                        if let Some(mut verifier) = acquire_parser() {
                            match verifier.parse(&source, &lexed.tokens, None) {
                                Ok(reference) if reference == grammar_tree => {}
                                Ok(reference) => {
                                    warn!(
                                        uri,
                                        "incremental verification mismatch; disabling incremental reparse"
                                    );
                                    event.verification_failed = true;
                                    runtime.incremental_disabled = true;
                                    grammar_tree = reference;
                                    extra_diagnostic = Some(Diagnostic::new(
                                        DiagnosticCode::InternalVerification,
                                        ByteSpan::whole(&source),
                                        DiagnosticSource::Parser,
                                        "incremental reparse verification failed; incremental \
                                         reparse disabled for this document",
                                    ));
                                }
                                Err(_) => {}
                            }
                        }
                    }

                    let mut diagnostics = lexed.diagnostics;
                    if let Some(diag) = extra_diagnostic {
                        diagnostics.push(diag);
                    }
                    let incremental_count = runtime.incremental_count;
                    let incremental_disabled = runtime.incremental_disabled;
                    let tree = assemble(
                        uri,
                        version,
                        source,
                        lexed.tokens,
                        diagnostics,
                        grammar_tree,
                        ranges,
                        Some(runtime.parser),
                        incremental_disabled,
                        incremental_count,
                    );
                    emit_event(&event);
                    Ok(tree)
                }
            }
        }
    }
}

fn validate_edits(
    edits: &[InputEdit],
    old_len: usize,
    new_len: usize,
) -> Result<(), String> {
    let mut previous_start = 0;
    for (i, edit) in edits.iter().enumerate() {
        if edit.start_byte > edit.old_end_byte
            || edit.start_byte > edit.new_end_byte
            || edit.old_end_byte > old_len
            || edit.new_end_byte > new_len
        {
            return Err(format!("edit_validation: edit {i} out of bounds"));
        }
        if i > 0 && edit.start_byte < previous_start {
            return Err(format!("edit_validation: edit {i} not monotone"));
        }
        previous_start = edit.start_byte;
    }
    Ok(())
}

fn full_with_runtime(
    uri: &str,
    version: i32,
    source: Vec<u8>,
    lexed: thrift_lexer::LexOutput,
    mut runtime: RuntimeState,
) -> Tree {
    match runtime.parser.parse(&source, &lexed.tokens, None) {
        Ok(grammar_tree) => {
            let whole = ByteSpan::whole(&source);
            assemble(
                uri,
                version,
                source,
                lexed.tokens,
                lexed.diagnostics,
                grammar_tree,
                vec![whole],
                Some(runtime.parser),
                runtime.incremental_disabled,
                runtime.incremental_count,
            )
        }
        Err(err) => degraded_tree(uri, version, source, &err.to_string()),
    }
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    uri: &str,
    version: i32,
    source: Vec<u8>,
    tokens: Vec<thrift_token::Token>,
    mut diagnostics: Vec<Diagnostic>,
    grammar_tree: GrammarTree,
    changed_ranges: Vec<ByteSpan>,
    parser: Option<Box<dyn grammar::GrammarParser>>,
    incremental_disabled: bool,
    incremental_count: u64,
) -> Tree {
    diagnostics.extend(builder::validate_tokens(&tokens, source.len()));
    let built = builder::build(&tokens, &grammar_tree);
    diagnostics.extend(built.diagnostics);

    let line_index = LineIndex::new(&source);
    let runtime = parser.map(|parser| RuntimeState {
        parser,
        grammar_tree,
        incremental_disabled,
        incremental_count,
    });
    Tree {
        uri: uri.to_string(),
        version,
        source,
        tokens,
        nodes: built.nodes,
        root: built.root,
        diagnostics,
        line_index,
        changed_ranges,
        runtime: Mutex::new(runtime),
    }
}

fn degraded_tree(uri: &str, version: i32, source: Vec<u8>, message: &str) -> Tree {
    let lexed = lex(&source);
    let mut diagnostics = lexed.diagnostics;
    diagnostics.push(Diagnostic::new(
        DiagnosticCode::InternalParse,
        ByteSpan::whole(&source),
        DiagnosticSource::Parser,
        format!("parser infrastructure failure: {message}"),
    ));
    let line_index = LineIndex::new(&source);
    let whole = ByteSpan::whole(&source);
    Tree {
        uri: uri.to_string(),
        version,
        source,
        tokens: lexed.tokens,
        nodes: Vec::new(),
        root: NO_NODE,
        diagnostics,
        line_index,
        changed_ranges: vec![whole],
        runtime: Mutex::new(None),
    }
}
