//! Raw tree produced by a grammar parser.
//!
//! Raw nodes carry only what the CST builder needs: a kind name, a byte
//! span, flags, and child ids. Tokens are not part of the raw tree; the
//! builder joins node spans with the lexer's token stream.

use super::InputEdit;
use thrift_text::ByteSpan;

/// Index of a raw node within its [`GrammarTree`].
pub type RawNodeId = usize;

/// One raw grammar node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNode {
    /// Grammar kind name
    pub kind: &'static str,
    /// Byte span
    pub span: ByteSpan,
    /// Named (non-anonymous) node
    pub named: bool,
    /// Error recovery node
    pub error: bool,
    /// Zero-width inserted node
    pub missing: bool,
    /// This node or a descendant is an error/missing node
    pub has_error: bool,
    /// Child node ids in source order
    pub children: Vec<RawNodeId>,
}

/// An immutable-after-parse raw tree; [`edit`](Self::edit) adjusts spans so
/// an old tree can serve as a reuse hint after source edits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GrammarTree {
    /// Node arena; index 0 is the root
    pub nodes: Vec<RawNode>,
}

impl GrammarTree {
    /// The root node, if the tree is non-empty.
    pub fn root(&self) -> Option<&RawNode> {
        self.nodes.first()
    }

    /// Adjusts every node span for the given edits, mirroring the
    /// tree-sitter `ts_tree_edit` offset rules: offsets at or past the old
    /// edit end shift by the length delta; offsets inside the replaced
    /// range clamp to the new end.
    ///
    /// Edits apply sequentially: each edit's coordinates refer to the text
    /// produced by the previous one, matching LSP change semantics.
    pub fn edit(&mut self, edits: &[InputEdit]) {
        for edit in edits {
            for node in &mut self.nodes {
                node.span.start = shift_offset(node.span.start, edit);
                node.span.end = shift_offset(node.span.end, edit);
                if node.span.end < node.span.start {
                    node.span.end = node.span.start;
                }
            }
        }
    }

    /// Computes the changed ranges between an edited old tree and a fresh
    /// tree over the new source: spans of top-level children whose structure
    /// differs, merged and monotone.
    pub fn changed_ranges(&self, new: &GrammarTree, new_source_len: usize) -> Vec<ByteSpan> {
        let old_children = self.root().map(|r| r.children.as_slice()).unwrap_or(&[]);
        let new_children = new.root().map(|r| r.children.as_slice()).unwrap_or(&[]);

        let mut ranges: Vec<ByteSpan> = Vec::new();
        let common = old_children.len().min(new_children.len());
        for i in 0..common {
            if !same_structure(self, old_children[i], new, new_children[i]) {
                push_range(&mut ranges, new.nodes[new_children[i]].span);
            }
        }
        for &child in &new_children[common..] {
            push_range(&mut ranges, new.nodes[child].span);
        }
        if old_children.len() > new_children.len() {
            // Declarations were removed; the tail of the document changed.
            let start = new_children
                .last()
                .map(|&c| new.nodes[c].span.end)
                .unwrap_or(0)
                .min(new_source_len);
            push_range(&mut ranges, ByteSpan::new(start, new_source_len));
        }
        ranges
    }
}

fn shift_offset(offset: usize, edit: &InputEdit) -> usize {
    if offset >= edit.old_end_byte {
        offset - edit.old_end_byte + edit.new_end_byte
    } else if offset > edit.start_byte {
        edit.new_end_byte
    } else {
        offset
    }
}

fn push_range(ranges: &mut Vec<ByteSpan>, span: ByteSpan) {
    if let Some(last) = ranges.last_mut() {
        if span.start <= last.end {
            last.end = last.end.max(span.end);
            return;
        }
    }
    ranges.push(span);
}

fn same_structure(a: &GrammarTree, a_id: RawNodeId, b: &GrammarTree, b_id: RawNodeId) -> bool {
    let (na, nb) = (&a.nodes[a_id], &b.nodes[b_id]);
    if na.kind != nb.kind
        || na.span != nb.span
        || na.named != nb.named
        || na.error != nb.error
        || na.missing != nb.missing
        || na.children.len() != nb.children.len()
    {
        return false;
    }
    na.children
        .iter()
        .zip(&nb.children)
        .all(|(&ca, &cb)| same_structure(a, ca, b, cb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use thrift_text::Point;

    fn edit(start: usize, old_end: usize, new_end: usize) -> InputEdit {
        InputEdit {
            start_byte: start,
            old_end_byte: old_end,
            new_end_byte: new_end,
            start_point: Point::new(0, start as u32),
            old_end_point: Point::new(0, old_end as u32),
            new_end_point: Point::new(0, new_end as u32),
        }
    }

    fn leaf(kind: &'static str, start: usize, end: usize) -> RawNode {
        RawNode {
            kind,
            span: ByteSpan::new(start, end),
            named: true,
            error: false,
            missing: false,
            has_error: false,
            children: Vec::new(),
        }
    }

    #[test]
    fn edit_shifts_spans_past_the_edit() {
        let mut tree = GrammarTree { nodes: vec![leaf("document", 0, 20), leaf("field", 10, 20)] };
        tree.edit(&[edit(0, 2, 5)]);
        assert_eq!(tree.nodes[1].span, ByteSpan::new(13, 23));
    }

    #[test]
    fn edit_clamps_inside_the_replaced_range() {
        let mut tree = GrammarTree { nodes: vec![leaf("field", 4, 8)] };
        tree.edit(&[edit(2, 6, 3)]);
        // start was inside [2, 6): clamps to new end 3; end shifts by -3.
        assert_eq!(tree.nodes[0].span, ByteSpan::new(3, 5));
    }

    #[test]
    fn changed_ranges_flag_differing_children() {
        let old = GrammarTree {
            nodes: vec![
                RawNode { children: vec![1, 2], ..leaf("document", 0, 20) },
                leaf("struct_definition", 0, 10),
                leaf("struct_definition", 11, 20),
            ],
        };
        let mut new = old.clone();
        new.nodes[2].kind = "enum_definition";
        let ranges = old.changed_ranges(&new, 20);
        assert_eq!(ranges, vec![ByteSpan::new(11, 20)]);
        assert_eq!(old.changed_ranges(&old.clone(), 20), Vec::<ByteSpan>::new());
    }
}
