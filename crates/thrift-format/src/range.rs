//! Range formatting with safe-ancestor widening.
//!
//! A requested byte range widens to the smallest CST node of a format-safe
//! kind that contains it; only that subtree is re-rendered, and the edit
//! replaces exactly the ancestor's bytes. Anything outside the ancestor is
//! untouched.

use crate::hints::collect_hints;
use crate::options::FormatOptions;
use crate::policy::prepare_formatting;
use crate::writer::TokenWriter;
use thrift_diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticSource, Error, UnsafeReason,
};
use thrift_syntax::{Node, Tree, kinds};
use thrift_text::{ByteSpan, Context, Edit};

/// Node kinds permitted as a root for range formatting.
const FORMAT_SAFE_KINDS: &[&str] = &[
    kinds::INCLUDE_DECLARATION,
    kinds::CPP_INCLUDE_DECLARATION,
    kinds::NAMESPACE_DECLARATION,
    kinds::TYPEDEF_DECLARATION,
    kinds::CONST_DECLARATION,
    kinds::STRUCT_DEFINITION,
    kinds::UNION_DEFINITION,
    kinds::EXCEPTION_DEFINITION,
    kinds::ENUM_DEFINITION,
    kinds::SENUM_DEFINITION,
    kinds::SERVICE_DEFINITION,
    kinds::FIELD_BLOCK,
    kinds::FUNCTION_BLOCK,
    kinds::ENUM_BLOCK,
    kinds::FIELD,
    kinds::FUNCTION_DEFINITION,
    kinds::ENUM_VALUE,
    kinds::SENUM_VALUE,
    kinds::CONST_LIST,
    kinds::CONST_MAP,
    kinds::ANNOTATIONS,
];

/// Result of a range format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeResult {
    /// Zero edits (already formatted) or one edit covering the ancestor
    pub edits: Vec<Edit>,
    /// Informational diagnostics gathered while formatting
    pub diagnostics: Vec<Diagnostic>,
}

/// Formats the smallest format-safe ancestor of `span`.
pub fn range(
    ctx: &Context,
    tree: &Tree,
    span: ByteSpan,
    options: &FormatOptions,
) -> Result<RangeResult, Error> {
    if !span.is_ordered() || span.end > tree.source.len() {
        return Err(Error::InvalidRange {
            span,
            message: format!("range outside document of {} bytes", tree.source.len()),
        });
    }
    let prepared = prepare_formatting(ctx, tree, options)?;

    let Some(ancestor) = find_safe_ancestor(tree, span) else {
        let diagnostic = Diagnostic::new(
            DiagnosticCode::FmtRangeNoSafeAncestor,
            span,
            DiagnosticSource::Formatter,
            "no format-safe node contains the requested range",
        );
        return Err(Error::UnsafeToFormat {
            reason: UnsafeReason::SyntaxErrors,
            message: format!("{}: {}", diagnostic.code, diagnostic.message),
        });
    };
    if !ancestor.is_token_bounded() {
        let diagnostic = Diagnostic::new(
            DiagnosticCode::FmtRangeUnboundedAncestor,
            ancestor.span,
            DiagnosticSource::Formatter,
            "the enclosing node is not token-aligned",
        );
        return Err(Error::UnsafeToFormat {
            reason: UnsafeReason::SyntaxErrors,
            message: format!("{}: {}", diagnostic.code, diagnostic.message),
        });
    }
    let Some((first, last)) = ancestor.token_range else {
        return Err(Error::UnsafeToFormat {
            reason: UnsafeReason::SyntaxErrors,
            message: "the enclosing node has no tokens".to_string(),
        });
    };

    let hints = collect_hints(tree, &prepared.options);

    // Indent depth at the ancestor: body braces opened before it and not
    // yet closed.
    let mut depth = 0usize;
    for index in 0..first {
        if hints.decl_block_open.get(&index).is_some_and(|b| b.has_members) {
            depth += 1;
        }
        if let Some(open) = hints.decl_block_close.get(&index) {
            if hints.decl_block_open.get(open).is_some_and(|b| b.has_members) {
                depth = depth.saturating_sub(1);
            }
        }
    }
    let start = ancestor.span.start;
    let at_line_start =
        start == 0 || matches!(tree.source.get(start - 1), Some(b'\n') | Some(b'\r'));

    let mut writer =
        TokenWriter::new(tree, &hints, &prepared.options, &prepared.policy, depth, at_line_start);
    writer.write_range(ctx, first, last, false, true)?;
    let rendered = writer.finish_range();

    let old = ancestor.span.slice(&tree.source);
    let edits = if rendered == old {
        Vec::new()
    } else {
        vec![Edit::replace(ancestor.span, rendered)]
    };
    Ok(RangeResult { edits, diagnostics: prepared.diagnostics })
}

/// The smallest format-safe node containing `span`. An empty selection is
/// contained when it lies within or at either boundary of the node span.
fn find_safe_ancestor(tree: &Tree, span: ByteSpan) -> Option<&Node> {
    let mut best: Option<&Node> = None;
    for node in &tree.nodes {
        if node.id.is_none() || !FORMAT_SAFE_KINDS.contains(&tree.kind_of(node)) {
            continue;
        }
        let contains = if span.is_empty() {
            node.span.touches(span.start)
        } else {
            node.span.contains_span(span)
        };
        if !contains {
            continue;
        }
        let better = match best {
            None => true,
            Some(current) => node.span.len() < current.span.len(),
        };
        if better {
            best = Some(node);
        }
    }
    best
}
