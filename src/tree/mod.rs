//! Visual tree: a disposable projection of the block model
//!
//! One node per block, stored in an arena and indexed by block id. A full
//! [`VisualTree::render`] throws every node away and bumps the generation,
//! so node ids and overlay handles taken before the rebuild stop resolving.
//! Components that need "the node for block X" re-query by [`BlockId`].
//!
//! Node content is a run of inlines. A line break counts as one char of the
//! flattened text; the ghost overlay counts as none and is never editable.

mod cursor;

use std::collections::HashMap;

use crate::model::{Block, BlockId, BlockKind};

/// Arena slot plus the render generation that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(u64);

/// Inline content of a block node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Break,
    Overlay { id: OverlayId, text: String },
}

impl Inline {
    /// Contribution to the flattened text length
    fn flat_len(&self) -> usize {
        match self {
            Inline::Text(s) => s.chars().count(),
            Inline::Break => 1,
            Inline::Overlay { .. } => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub block_id: BlockId,
    pub kind: BlockKind,
    pub children: Vec<Inline>,
}

impl Node {
    /// Flattened text, overlay excluded
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Inline::Text(s) => out.push_str(s),
                Inline::Break => out.push('\n'),
                Inline::Overlay { .. } => {}
            }
        }
        out
    }

    pub fn text_len(&self) -> usize {
        self.children.iter().map(Inline::flat_len).sum()
    }

    /// The overlay, if one is attached: (flat offset, id, text)
    fn overlay(&self) -> Option<(usize, OverlayId, &str)> {
        let mut offset = 0;
        for child in &self.children {
            match child {
                Inline::Overlay { id, text } => return Some((offset, *id, text)),
                other => offset += other.flat_len(),
            }
        }
        None
    }
}

/// A DOM-like selection point: child index plus char offset inside it
///
/// `child == children.len()` means the end of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub node: NodeId,
    pub child: usize,
    pub offset: usize,
}

/// Handle to the ghost overlay; dead after the next full render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayHandle {
    pub id: OverlayId,
    pub block_id: BlockId,
    generation: u32,
}

#[derive(Debug, Default)]
pub struct VisualTree {
    generation: u32,
    nodes: Vec<Node>,
    by_block: HashMap<BlockId, NodeId>,
    selection: Option<Selection>,
    /// Block order of the previous render, used for cursor fallback
    retired_order: Vec<BlockId>,
    next_overlay: u64,
}

impl VisualTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every node from `blocks`
    ///
    /// Destructive: the selection, all node ids and any overlay are dropped.
    pub fn render(&mut self, blocks: &[Block]) {
        self.retired_order = self.nodes.iter().map(|n| n.block_id).collect();
        self.generation = self.generation.wrapping_add(1);
        self.nodes.clear();
        self.by_block.clear();
        self.selection = None;

        for (index, block) in blocks.iter().enumerate() {
            let id = NodeId {
                index: index as u32,
                generation: self.generation,
            };
            self.nodes.push(Node {
                id,
                block_id: block.id,
                kind: block.kind,
                children: build_children(&block.text, None),
            });
            self.by_block.insert(block.id, id);
        }

        tracing::trace!(
            generation = self.generation,
            nodes = self.nodes.len(),
            "tree rendered"
        );
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn retired_order(&self) -> &[BlockId] {
        &self.retired_order
    }

    /// Resolve a node id; ids from older generations resolve to nothing
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        if id.generation != self.generation {
            return None;
        }
        self.nodes.get(id.index as usize)
    }

    #[inline]
    pub fn node_for_block(&self, block_id: BlockId) -> Option<NodeId> {
        self.by_block.get(&block_id).copied()
    }

    pub fn block_node(&self, block_id: BlockId) -> Option<&Node> {
        self.node_for_block(block_id).and_then(|id| self.node(id))
    }

    fn block_node_mut(&mut self, block_id: BlockId) -> Option<&mut Node> {
        let id = self.node_for_block(block_id)?;
        self.nodes.get_mut(id.index as usize)
    }

    /// Flattened text of a block's node, overlay excluded
    pub fn live_text(&self, block_id: BlockId) -> Option<String> {
        self.block_node(block_id).map(Node::text)
    }

    #[inline]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Flat offset of the selection if it sits inside `node`
    fn selected_offset_in(&self, node: NodeId) -> Option<usize> {
        let sel = self.selection.filter(|s| s.node == node)?;
        self.node(node).map(|n| selection_offset(&n.children, &sel))
    }

    /// Place the selection inside `block_id` at a clamped flat offset
    ///
    /// Returns `None` when the block has no node or cannot hold a caret.
    pub fn select(&mut self, block_id: BlockId, offset: usize) -> Option<usize> {
        let node = self.block_node(block_id)?;
        if !node.kind.is_editable() {
            return None;
        }
        let offset = offset.min(node.text_len());
        let (child, inner) = point_for_offset(&node.children, offset);
        self.selection = Some(Selection {
            node: node.id,
            child,
            offset: inner,
        });
        Some(offset)
    }

    /// Rewrite one node's text in place; no generation bump
    ///
    /// An attached overlay stays at the same flat offset (clamped) and a
    /// selection inside the node keeps its flat offset (clamped).
    pub fn patch_text(&mut self, block_id: BlockId, text: &str) -> bool {
        let Some(node_id) = self.node_for_block(block_id) else {
            return false;
        };
        let selected = self.selected_offset_in(node_id);
        let Some(node) = self.block_node_mut(block_id) else {
            return false;
        };
        let overlay = node
            .overlay()
            .map(|(offset, id, text)| (offset, id, text.to_string()));
        node.children = build_children(text, overlay);
        if let Some(offset) = selected {
            self.select(block_id, offset);
        }
        true
    }

    /// Screen-ish (row, col) of a caret; rows count line breaks and blocks
    pub fn caret_point(&self, block_id: BlockId, offset: usize) -> Option<(usize, usize)> {
        let mut row = 0;
        for node in &self.nodes {
            let text = node.text();
            if node.block_id == block_id {
                let before: String = text.chars().take(offset).collect();
                row += before.matches('\n').count();
                let col = before.chars().rev().take_while(|c| *c != '\n').count();
                return Some((row, col));
            }
            row += text.matches('\n').count() + 1;
        }
        None
    }

    /// Whether node order, kinds and texts mirror `blocks`
    pub fn mirrors(&self, blocks: &[Block]) -> bool {
        self.nodes.len() == blocks.len()
            && self
                .nodes
                .iter()
                .zip(blocks)
                .all(|(n, b)| n.block_id == b.id && n.kind == b.kind && n.text() == b.text)
    }

    // === Overlay ===

    /// Attach an empty overlay inside `block_id` at a flat offset
    ///
    /// Only one overlay may exist in the tree at a time.
    pub fn attach_overlay(&mut self, block_id: BlockId, offset: usize) -> Option<OverlayHandle> {
        if self.has_overlay() {
            return None;
        }
        let node_id = self.node_for_block(block_id)?;
        let selected = self.selected_offset_in(node_id);
        self.next_overlay += 1;
        let id = OverlayId(self.next_overlay);

        let node = self.block_node_mut(block_id)?;
        if !node.kind.is_editable() {
            return None;
        }
        let text = node.text();
        let offset = offset.min(text.chars().count());
        node.children = build_children(&text, Some((offset, id, String::new())));

        if let Some(offset) = selected {
            self.select(block_id, offset);
        }
        Some(OverlayHandle {
            id,
            block_id,
            generation: self.generation,
        })
    }

    fn overlay_slot(&mut self, handle: &OverlayHandle) -> Option<&mut String> {
        if handle.generation != self.generation {
            return None;
        }
        let node = self.block_node_mut(handle.block_id)?;
        node.children.iter_mut().find_map(|child| match child {
            Inline::Overlay { id, text } if *id == handle.id => Some(text),
            _ => None,
        })
    }

    /// Replace the overlay's text wholesale
    pub fn set_overlay_text(&mut self, handle: &OverlayHandle, text: &str) -> bool {
        match self.overlay_slot(handle) {
            Some(slot) => {
                slot.clear();
                slot.push_str(text);
                true
            }
            None => false,
        }
    }

    pub fn overlay_text(&self, handle: &OverlayHandle) -> Option<&str> {
        if handle.generation != self.generation {
            return None;
        }
        self.block_node(handle.block_id)?
            .children
            .iter()
            .find_map(|child| match child {
                Inline::Overlay { id, text } if *id == handle.id => Some(text.as_str()),
                _ => None,
            })
    }

    /// Remove the overlay; adjacent text runs merge back together
    pub fn detach_overlay(&mut self, handle: &OverlayHandle) -> bool {
        if self.overlay_text(handle).is_none() {
            return false;
        }
        let Some(node_id) = self.node_for_block(handle.block_id) else {
            return false;
        };
        let selected = self.selected_offset_in(node_id);
        let Some(node) = self.block_node_mut(handle.block_id) else {
            return false;
        };
        let text = node.text();
        node.children = build_children(&text, None);
        if let Some(offset) = selected {
            self.select(handle.block_id, offset);
        }
        true
    }

    pub fn has_overlay(&self) -> bool {
        self.nodes.iter().any(|n| n.overlay().is_some())
    }

    /// One line per node; the caret shows as `|` and the overlay in braces
    pub fn dump(&self) -> String {
        let caret = self.save_cursor();
        let mut out = format!("generation {}\n", self.generation);
        for node in &self.nodes {
            let caret_at = caret
                .filter(|c| c.block_id == node.block_id)
                .map(|c| c.offset);
            let mut line = String::new();
            let mut offset = 0;
            for child in &node.children {
                match child {
                    Inline::Text(s) => {
                        for ch in s.chars() {
                            if caret_at == Some(offset) {
                                line.push('|');
                            }
                            line.push(ch);
                            offset += 1;
                        }
                    }
                    Inline::Break => {
                        if caret_at == Some(offset) {
                            line.push('|');
                        }
                        line.push_str("\\n");
                        offset += 1;
                    }
                    Inline::Overlay { text, .. } => {
                        line.push('{');
                        line.push_str(text);
                        line.push('}');
                    }
                }
            }
            if caret_at == Some(offset) {
                line.push('|');
            }
            out.push_str(&format!(
                "  {} {:<9} {}\n",
                node.block_id,
                node.kind.name(),
                line
            ));
        }
        out
    }
}

/// Build inline runs for `text`, inserting an overlay at a flat offset
fn build_children(text: &str, overlay: Option<(usize, OverlayId, String)>) -> Vec<Inline> {
    let mut children = Vec::new();
    match overlay {
        None => push_runs(&mut children, text),
        Some((offset, id, overlay_text)) => {
            let split = crate::model::byte_index(text, offset);
            push_runs(&mut children, &text[..split]);
            children.push(Inline::Overlay {
                id,
                text: overlay_text,
            });
            push_runs(&mut children, &text[split..]);
        }
    }
    children
}

fn push_runs(children: &mut Vec<Inline>, text: &str) {
    for (i, segment) in text.split('\n').enumerate() {
        if i > 0 {
            children.push(Inline::Break);
        }
        if !segment.is_empty() {
            children.push(Inline::Text(segment.to_string()));
        }
    }
}

/// Resolve a flat offset to (child, inner offset); the offset must be clamped
fn point_for_offset(children: &[Inline], offset: usize) -> (usize, usize) {
    let mut remaining = offset;
    for (i, child) in children.iter().enumerate() {
        match child {
            Inline::Text(s) => {
                let len = s.chars().count();
                if remaining <= len {
                    return (i, remaining);
                }
                remaining -= len;
            }
            Inline::Break => {
                if remaining == 0 {
                    return (i, 0);
                }
                remaining -= 1;
            }
            Inline::Overlay { .. } => {}
        }
    }
    (children.len(), 0)
}

/// Walk the runs before the selection point to get its flat offset
fn selection_offset(children: &[Inline], sel: &Selection) -> usize {
    let before: usize = children
        .iter()
        .take(sel.child)
        .map(Inline::flat_len)
        .sum();
    let inner = match children.get(sel.child) {
        Some(Inline::Text(s)) => sel.offset.min(s.chars().count()),
        _ => 0,
    };
    before + inner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;

    fn tree_for(raw: &str) -> (Document, VisualTree) {
        let doc = Document::from_markdown(raw);
        let mut tree = VisualTree::new();
        tree.render(doc.blocks());
        (doc, tree)
    }

    #[test]
    fn test_render_indexes_nodes_by_block() {
        let (doc, tree) = tree_for("# a\n\nb\n\n---");
        assert_eq!(tree.nodes().len(), 3);
        for block in doc.blocks() {
            let node = tree.block_node(block.id).unwrap();
            assert_eq!(node.block_id, block.id);
        }
        assert!(tree.mirrors(doc.blocks()));
    }

    #[test]
    fn test_stale_node_ids_do_not_resolve() {
        let (doc, mut tree) = tree_for("a");
        let old = tree.node_for_block(doc.blocks()[0].id).unwrap();
        tree.render(doc.blocks());
        assert!(tree.node(old).is_none());
        assert!(tree.node_for_block(doc.blocks()[0].id).is_some());
    }

    #[test]
    fn test_line_breaks_are_break_runs() {
        let (doc, tree) = tree_for("one\ntwo");
        let node = tree.block_node(doc.blocks()[0].id).unwrap();
        assert_eq!(
            node.children,
            vec![
                Inline::Text("one".into()),
                Inline::Break,
                Inline::Text("two".into())
            ]
        );
        assert_eq!(node.text_len(), 7);
    }

    #[test]
    fn test_select_clamps_and_refuses_dividers() {
        let (doc, mut tree) = tree_for("abc\n\n---");
        let para = doc.blocks()[0].id;
        let divider = doc.blocks()[1].id;
        assert_eq!(tree.select(para, 99), Some(3));
        assert_eq!(tree.select(divider, 0), None);
    }

    #[test]
    fn test_overlay_is_zero_width() {
        let (doc, mut tree) = tree_for("hello world");
        let id = doc.blocks()[0].id;
        tree.select(id, 5);
        let handle = tree.attach_overlay(id, 5).unwrap();
        assert!(tree.set_overlay_text(&handle, " there"));
        assert_eq!(tree.live_text(id).as_deref(), Some("hello world"));
        assert_eq!(tree.overlay_text(&handle), Some(" there"));
        assert_eq!(tree.save_cursor().map(|c| c.offset), Some(5));

        assert!(tree.detach_overlay(&handle));
        assert!(!tree.has_overlay());
        assert_eq!(tree.block_node(id).unwrap().children.len(), 1);
    }

    #[test]
    fn test_overlay_handle_dies_with_render() {
        let (doc, mut tree) = tree_for("text here");
        let id = doc.blocks()[0].id;
        let handle = tree.attach_overlay(id, 4).unwrap();
        tree.render(doc.blocks());
        assert!(!tree.set_overlay_text(&handle, "x"));
        assert!(!tree.has_overlay());
    }

    #[test]
    fn test_patch_text_keeps_overlay_offset() {
        let (doc, mut tree) = tree_for("abcdef");
        let id = doc.blocks()[0].id;
        let handle = tree.attach_overlay(id, 6).unwrap();
        tree.set_overlay_text(&handle, "!");
        tree.patch_text(id, "abcdefgh");
        assert_eq!(tree.overlay_text(&handle), Some("!"));
        let node = tree.block_node(id).unwrap();
        assert_eq!(node.overlay().map(|(offset, _, _)| offset), Some(6));
    }

    #[test]
    fn test_caret_point_counts_rows() {
        let (doc, tree) = tree_for("first\n\nline one\nline two");
        let second = doc.blocks()[1].id;
        assert_eq!(tree.caret_point(second, 0), Some((1, 0)));
        assert_eq!(tree.caret_point(second, 12), Some((2, 3)));
    }

    #[test]
    fn test_dump_marks_caret_and_overlay() {
        let (doc, mut tree) = tree_for("# hi\n\nab");
        let para = doc.blocks()[1].id;
        tree.select(para, 1);
        let handle = tree.attach_overlay(para, 2).unwrap();
        tree.set_overlay_text(&handle, "cd");

        let dump = tree.dump();
        assert!(dump.contains("block-1 heading1  hi\n"), "{}", dump);
        assert!(dump.contains("block-2 paragraph a|b{cd}\n"), "{}", dump);
    }
}
