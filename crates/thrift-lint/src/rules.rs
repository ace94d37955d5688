//! Built-in lint rules.

use crate::Rule;
use thrift_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSource, Error};
use thrift_syntax::{
    NodeFlags, NodeId, Tree, child_node_ids, kinds, member_node_ids, top_level_declaration_ids,
};
use thrift_text::Context;

/// True when the node is in an error-recovery state and should be skipped.
fn in_recovery(tree: &Tree, id: NodeId) -> bool {
    tree.node(id).is_none_or(|node| {
        node.flags.contains(NodeFlags::ERROR)
            || node.flags.contains(NodeFlags::MISSING)
            || node.flags.contains(NodeFlags::RECOVERED)
    })
}

fn fields_of_containers(tree: &Tree) -> Vec<NodeId> {
    let mut fields = Vec::new();
    for declaration in top_level_declaration_ids(tree) {
        let Some(node) = tree.node(declaration) else { continue };
        let container = matches!(
            tree.kind_of(node),
            kinds::STRUCT_DEFINITION | kinds::UNION_DEFINITION | kinds::EXCEPTION_DEFINITION
        );
        if !container || in_recovery(tree, declaration) {
            continue;
        }
        fields.extend(member_node_ids(tree, declaration));
    }
    fields
}

/// Every well-formed field must carry an explicit field id.
pub struct FieldIdRequired;

impl Rule for FieldIdRequired {
    fn id(&self) -> &'static str {
        "field_id_required"
    }

    fn description(&self) -> &'static str {
        "struct, union, and exception fields must have an explicit field id"
    }

    fn run(&self, _ctx: &Context, tree: &Tree) -> Result<Vec<Diagnostic>, Error> {
        let mut diagnostics = Vec::new();
        for field in fields_of_containers(tree) {
            if in_recovery(tree, field) {
                continue;
            }
            let children = child_node_ids(tree, field);
            let has_id = children
                .iter()
                .any(|&c| tree.node(c).is_some_and(|n| tree.kind_of(n) == kinds::FIELD_ID));
            if has_id {
                continue;
            }
            // Report on the field name when present, else the whole field.
            let span = children
                .iter()
                .filter_map(|&c| tree.node(c))
                .find(|n| tree.kind_of(n) == kinds::FIELD_NAME)
                .map(|n| n.span)
                .or_else(|| tree.node(field).map(|n| n.span));
            if let Some(span) = span {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::LintFieldIdRequired,
                    span,
                    DiagnosticSource::Parser,
                    "field has no explicit id",
                ));
            }
        }
        Ok(diagnostics)
    }
}

/// Warns on the deprecated `xsd_optional`/`xsd_nillable`/`xsd_attrs` field
/// modifiers.
pub struct DeprecatedFieldModifiers;

impl Rule for DeprecatedFieldModifiers {
    fn id(&self) -> &'static str {
        "deprecated_field_modifiers"
    }

    fn description(&self) -> &'static str {
        "xsd_optional, xsd_nillable, and xsd_attrs are deprecated"
    }

    fn run(&self, _ctx: &Context, tree: &Tree) -> Result<Vec<Diagnostic>, Error> {
        let mut diagnostics = Vec::new();
        for field in fields_of_containers(tree) {
            if in_recovery(tree, field) {
                continue;
            }
            for child in child_node_ids(tree, field) {
                let Some(node) = tree.node(child) else { continue };
                let code = match tree.kind_of(node) {
                    kinds::XSD_OPTIONAL => DiagnosticCode::LintDeprecatedFieldXsdOptional,
                    kinds::XSD_NILLABLE => DiagnosticCode::LintDeprecatedFieldXsdNillable,
                    kinds::XSD_ATTRS => DiagnosticCode::LintDeprecatedFieldXsdAttrs,
                    _ => continue,
                };
                diagnostics.push(Diagnostic::new(
                    code,
                    node.span,
                    DiagnosticSource::Parser,
                    format!("deprecated field modifier `{}`", tree.kind_of(node)),
                ));
            }
        }
        Ok(diagnostics)
    }
}
