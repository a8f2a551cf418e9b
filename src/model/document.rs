//! Document model - the ordered block sequence and its id generator
//!
//! The document is the single source of truth for content; the visual tree
//! is rebuilt from it. A document is never empty: removing the last block
//! re-seeds an empty paragraph.

use serde::Serialize;

use super::block::{Block, BlockId, BlockIdGen, BlockKind};
use crate::markdown;

/// Word and character counts shown alongside the editor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub words: usize,
    pub chars: usize,
}

#[derive(Debug, Clone)]
pub struct Document {
    blocks: Vec<Block>,
    ids: BlockIdGen,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document holding one empty paragraph
    pub fn new() -> Self {
        Self::from_markdown("")
    }

    /// Parse raw markdown-like text; never fails
    pub fn from_markdown(raw: &str) -> Self {
        let mut ids = BlockIdGen::new();
        let blocks = markdown::parse(raw, &mut ids);
        Self { blocks, ids }
    }

    /// Canonical markdown form of the document
    pub fn to_markdown(&self) -> String {
        markdown::serialize(&self.blocks)
    }

    pub fn to_html(&self) -> String {
        markdown::blocks_to_html(&self.blocks)
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn block_at(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Insert a new block right after `after`, or at the end if `after` is gone
    pub fn insert_after(&mut self, after: BlockId, kind: BlockKind, text: &str) -> BlockId {
        let index = self
            .index_of(after)
            .map(|i| i + 1)
            .unwrap_or(self.blocks.len());
        self.insert_at(index, kind, text)
    }

    /// Insert a new block at `index` (clamped to the end)
    pub fn insert_at(&mut self, index: usize, kind: BlockKind, text: &str) -> BlockId {
        let id = self.ids.next_id();
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, Block::new(id, kind, text));
        id
    }

    /// Remove a block, re-seeding an empty paragraph if it was the last one
    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        let index = self.index_of(id)?;
        let removed = self.blocks.remove(index);
        if self.blocks.is_empty() {
            let seed = self.ids.next_id();
            self.blocks.push(Block::new(seed, BlockKind::Paragraph, ""));
        }
        Some(removed)
    }

    /// Change a block's kind; turning it into a divider discards its text
    pub fn set_kind(&mut self, id: BlockId, kind: BlockKind) -> bool {
        let Some(block) = self.blocks.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        block.kind = kind;
        if !kind.is_editable() {
            block.text.clear();
        } else if !kind.allows_line_breaks() && block.text.contains('\n') {
            block.text = block.text.replace('\n', " ");
        }
        true
    }

    /// Replace a block's text; dividers ignore the write
    pub fn set_text(&mut self, id: BlockId, text: &str) -> bool {
        match self.blocks.iter_mut().find(|b| b.id == id) {
            Some(block) if block.kind.is_editable() => {
                block.text = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Nearest editable block before `id`
    pub fn previous_editable(&self, id: BlockId) -> Option<BlockId> {
        let index = self.index_of(id)?;
        self.blocks[..index]
            .iter()
            .rev()
            .find(|b| b.kind.is_editable())
            .map(|b| b.id)
    }

    /// Nearest editable block after `id`
    pub fn next_editable(&self, id: BlockId) -> Option<BlockId> {
        let index = self.index_of(id)?;
        self.blocks[index + 1..]
            .iter()
            .find(|b| b.kind.is_editable())
            .map(|b| b.id)
    }

    /// The block immediately before `id`, editable or not
    pub fn previous(&self, id: BlockId) -> Option<&Block> {
        let index = self.index_of(id)?;
        index.checked_sub(1).and_then(|i| self.blocks.get(i))
    }

    /// The block immediately after `id`, editable or not
    pub fn next(&self, id: BlockId) -> Option<&Block> {
        let index = self.index_of(id)?;
        self.blocks.get(index + 1)
    }

    pub fn first_editable(&self) -> Option<BlockId> {
        self.blocks.iter().find(|b| b.kind.is_editable()).map(|b| b.id)
    }

    pub fn last_editable(&self) -> Option<BlockId> {
        self.blocks
            .iter()
            .rev()
            .find(|b| b.kind.is_editable())
            .map(|b| b.id)
    }

    /// Append an empty paragraph if no block can hold the cursor
    pub fn ensure_editable(&mut self) -> BlockId {
        match self.last_editable() {
            Some(id) => id,
            None => self.insert_at(self.blocks.len(), BlockKind::Paragraph, ""),
        }
    }

    /// Text the user sees, without markers: editable block texts joined by
    /// a blank line
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| b.kind.is_editable())
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(markdown::BLOCK_SEPARATOR)
    }

    /// Char count of [`Document::plain_text`]
    pub fn text_len(&self) -> usize {
        self.stats().chars
    }

    pub fn stats(&self) -> TextStats {
        let text = self.plain_text();
        TextStats {
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_one_empty_paragraph() {
        let doc = Document::new();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].kind, BlockKind::Paragraph);
        assert!(doc.blocks()[0].text.is_empty());
    }

    #[test]
    fn test_insert_after_assigns_fresh_id() {
        let mut doc = Document::from_markdown("a\n\nb");
        let first = doc.blocks()[0].id;
        let existing: Vec<_> = doc.blocks().iter().map(|b| b.id).collect();
        let id = doc.insert_after(first, BlockKind::Quote, "q");
        assert!(!existing.contains(&id));
        assert_eq!(doc.index_of(id), Some(1));
    }

    #[test]
    fn test_remove_last_block_reseeds() {
        let mut doc = Document::new();
        let only = doc.blocks()[0].id;
        assert!(doc.remove(only).is_some());
        assert_eq!(doc.len(), 1);
        assert_ne!(doc.blocks()[0].id, only);
    }

    #[test]
    fn test_set_kind_divider_clears_text() {
        let mut doc = Document::from_markdown("text");
        let id = doc.blocks()[0].id;
        doc.set_kind(id, BlockKind::Divider);
        assert!(doc.get(id).is_some_and(|b| b.text.is_empty()));
        assert!(!doc.set_text(id, "nope"));
    }

    #[test]
    fn test_set_kind_heading_flattens_line_breaks() {
        let mut doc = Document::from_markdown("one\ntwo");
        let id = doc.blocks()[0].id;
        doc.set_kind(id, BlockKind::Heading1);
        assert_eq!(doc.get(id).map(|b| b.text.as_str()), Some("one two"));
    }

    #[test]
    fn test_editable_neighbours_skip_dividers() {
        let doc = Document::from_markdown("a\n\n---\n\nb");
        let a = doc.blocks()[0].id;
        let b = doc.blocks()[2].id;
        assert_eq!(doc.next_editable(a), Some(b));
        assert_eq!(doc.previous_editable(b), Some(a));
        assert_eq!(doc.previous(b).map(|blk| blk.kind), Some(BlockKind::Divider));
    }

    #[test]
    fn test_stats_count_words_and_chars() {
        let doc = Document::from_markdown("# Hello world\n\n---\n\nthree more words");
        let stats = doc.stats();
        assert_eq!(stats.words, 5);
        assert_eq!(doc.plain_text(), "Hello world\n\nthree more words");
        assert_eq!(stats.chars, 29);
    }
}
