//! Cursor save/restore across tree rebuilds
//!
//! The caret is saved as (block id, char offset) before a rebuild and
//! re-placed afterwards, because a rebuild invalidates every node while
//! block ids survive.

use super::{selection_offset, VisualTree};
use crate::model::CursorPosition;

impl VisualTree {
    /// Walk the focused node's runs up to the selection point
    pub fn save_cursor(&self) -> Option<CursorPosition> {
        let sel = self.selection?;
        let node = self.node(sel.node)?;
        Some(CursorPosition::new(
            node.block_id,
            selection_offset(&node.children, &sel),
        ))
    }

    /// Re-place a saved caret, falling back when its block is gone
    ///
    /// Fallback order: end of the nearest preceding editable block that
    /// survived (by the previous render's order), then offset 0 of the
    /// first editable block. Returns where the caret actually landed.
    pub fn restore_cursor(&mut self, saved: CursorPosition) -> Option<CursorPosition> {
        if let Some(offset) = self.select(saved.block_id, saved.offset) {
            return Some(CursorPosition::new(saved.block_id, offset));
        }

        let preceding = self
            .retired_order
            .iter()
            .position(|id| *id == saved.block_id)
            .and_then(|index| {
                self.retired_order[..index].iter().rev().copied().find(|id| {
                    self.block_node(*id)
                        .is_some_and(|node| node.kind.is_editable())
                })
            });

        if let Some(block_id) = preceding {
            let offset = self.select(block_id, usize::MAX)?;
            tracing::debug!(
                target: "cursor",
                missing = %saved.block_id,
                fallback = %block_id,
                "restored to end of preceding block"
            );
            return Some(CursorPosition::new(block_id, offset));
        }

        let first = self
            .nodes
            .iter()
            .find(|node| node.kind.is_editable())
            .map(|node| node.block_id)?;
        self.select(first, 0)?;
        tracing::debug!(
            target: "cursor",
            missing = %saved.block_id,
            fallback = %first,
            "restored to start of first block"
        );
        Some(CursorPosition::new(first, 0))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{BlockKind, CursorPosition, Document};
    use crate::tree::VisualTree;

    #[test]
    fn test_save_restore_same_block() {
        let doc = Document::from_markdown("alpha\n\nbeta gamma");
        let mut tree = VisualTree::new();
        tree.render(doc.blocks());
        let beta = doc.blocks()[1].id;
        tree.select(beta, 3);

        let saved = tree.save_cursor().unwrap();
        tree.render(doc.blocks());
        assert!(tree.save_cursor().is_none());
        assert_eq!(
            tree.restore_cursor(saved),
            Some(CursorPosition::new(beta, 3))
        );
        assert_eq!(tree.save_cursor(), Some(CursorPosition::new(beta, 3)));
    }

    #[test]
    fn test_removed_block_falls_back_to_previous_end() {
        let mut doc = Document::from_markdown("alpha\n\nbeta");
        let mut tree = VisualTree::new();
        tree.render(doc.blocks());
        let alpha = doc.blocks()[0].id;
        let beta = doc.blocks()[1].id;

        doc.remove(beta);
        tree.render(doc.blocks());
        let landed = tree.restore_cursor(CursorPosition::new(beta, 2));
        assert_eq!(landed, Some(CursorPosition::new(alpha, 5)));
    }

    #[test]
    fn test_removed_first_block_falls_back_to_start() {
        let mut doc = Document::from_markdown("alpha\n\nbeta");
        let mut tree = VisualTree::new();
        tree.render(doc.blocks());
        let alpha = doc.blocks()[0].id;
        let beta = doc.blocks()[1].id;

        doc.remove(alpha);
        tree.render(doc.blocks());
        let landed = tree.restore_cursor(CursorPosition::new(alpha, 4));
        assert_eq!(landed, Some(CursorPosition::new(beta, 0)));
    }

    #[test]
    fn test_fallback_skips_dividers() {
        let mut doc = Document::from_markdown("alpha\n\n---\n\nbeta");
        let mut tree = VisualTree::new();
        tree.render(doc.blocks());
        let alpha = doc.blocks()[0].id;
        let beta = doc.blocks()[2].id;
        assert_eq!(doc.blocks()[1].kind, BlockKind::Divider);

        doc.remove(beta);
        tree.render(doc.blocks());
        let landed = tree.restore_cursor(CursorPosition::new(beta, 0));
        assert_eq!(landed, Some(CursorPosition::new(alpha, 5)));
    }
}
