//! Selection ranges: the chain of named nodes around a position.

use crate::convert::{position_to_offset, span_to_range};
use thrift_ls_protocol::{Position, SelectionRange};
use thrift_syntax::{NO_NODE, NodeFlags, NodeId, Tree};

/// Computes one selection chain per requested position. Positions that fail
/// to translate or fall outside every named node yield no entry.
pub fn selection_ranges(tree: &Tree, positions: &[Position]) -> Vec<SelectionRange> {
    positions
        .iter()
        .filter_map(|&position| {
            let offset = position_to_offset(tree, position).ok()?;
            let node = smallest_named_node_at(tree, offset)?;
            chain_for(tree, node)
        })
        .collect()
}

/// The smallest named node whose span contains the offset; ties broken by
/// greater depth.
fn smallest_named_node_at(tree: &Tree, offset: usize) -> Option<NodeId> {
    let mut best: Option<(usize, usize, NodeId)> = None; // (len, depth, id)
    for node in &tree.nodes {
        if node.id.is_none() || !node.flags.contains(NodeFlags::NAMED) {
            continue;
        }
        let contains = node.span.contains(offset)
            || (node.span.is_empty() && node.span.start == offset)
            || (offset == tree.source.len() && node.span.end == offset);
        if !contains {
            continue;
        }
        let depth = depth_of(tree, node.id);
        let candidate = (node.span.len(), usize::MAX - depth, node.id);
        let better = match best {
            None => true,
            Some((len, inv_depth, _)) => (candidate.0, candidate.1) < (len, inv_depth),
        };
        if better {
            best = Some(candidate);
        }
    }
    best.map(|(_, _, id)| id)
}

fn depth_of(tree: &Tree, mut id: NodeId) -> usize {
    let mut depth = 0;
    while let Some(node) = tree.node(id) {
        if node.parent == NO_NODE {
            break;
        }
        id = node.parent;
        depth += 1;
    }
    depth
}

/// Builds the inner-to-outer chain, deduplicating consecutive identical
/// spans; the outermost link has no parent.
fn chain_for(tree: &Tree, id: NodeId) -> Option<SelectionRange> {
    let mut spans = Vec::new();
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        let node = tree.node(current)?;
        if spans.last() != Some(&node.span) {
            spans.push(node.span);
        }
        cursor = if node.parent == NO_NODE { None } else { Some(node.parent) };
    }

    let mut chain: Option<SelectionRange> = None;
    for span in spans.into_iter().rev() {
        chain = Some(SelectionRange {
            range: span_to_range(tree, span),
            parent: chain.map(Box::new),
        });
    }
    chain
}
