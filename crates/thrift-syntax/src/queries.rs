//! Read-only queries over the CST.

use crate::grammar::kinds;
use crate::tree::{Child, Node, NodeId, Tree};

/// Direct child nodes of `node` in source order (token children excluded).
pub fn child_node_ids(tree: &Tree, node: NodeId) -> Vec<NodeId> {
    let Some(node) = tree.node(node) else {
        return Vec::new();
    };
    node.children
        .iter()
        .filter_map(|child| match child {
            Child::Node(id) => Some(*id),
            Child::Token(_) => None,
        })
        .collect()
}

/// Top-level declarations: the child nodes of the root.
pub fn top_level_declaration_ids(tree: &Tree) -> Vec<NodeId> {
    child_node_ids(tree, tree.root)
}

/// Member nodes of a container declaration:
///
/// - struct/union/exception: the fields of its `field_block`
/// - service: the function definitions of its `function_block`
/// - enum: the values of its `enum_block`
/// - senum: its direct `senum_value` children
pub fn member_node_ids(tree: &Tree, container: NodeId) -> Vec<NodeId> {
    let Some(node) = tree.node(container) else {
        return Vec::new();
    };
    match tree.kind_of(node) {
        kinds::STRUCT_DEFINITION | kinds::UNION_DEFINITION | kinds::EXCEPTION_DEFINITION => {
            body_members(tree, node, kinds::FIELD_BLOCK, kinds::FIELD)
        }
        kinds::SERVICE_DEFINITION => {
            body_members(tree, node, kinds::FUNCTION_BLOCK, kinds::FUNCTION_DEFINITION)
        }
        kinds::ENUM_DEFINITION => body_members(tree, node, kinds::ENUM_BLOCK, kinds::ENUM_VALUE),
        kinds::SENUM_DEFINITION => child_node_ids(tree, container)
            .into_iter()
            .filter(|&id| node_kind_is(tree, id, kinds::SENUM_VALUE))
            .collect(),
        _ => Vec::new(),
    }
}

fn body_members(tree: &Tree, container: &Node, body_kind: &str, member_kind: &str) -> Vec<NodeId> {
    child_node_ids(tree, container.id)
        .into_iter()
        .find(|&id| node_kind_is(tree, id, body_kind))
        .map(|body| {
            child_node_ids(tree, body)
                .into_iter()
                .filter(|&id| node_kind_is(tree, id, member_kind))
                .collect()
        })
        .unwrap_or_default()
}

fn node_kind_is(tree: &Tree, id: NodeId, kind: &str) -> bool {
    tree.node(id).is_some_and(|n| tree.kind_of(n) == kind)
}
