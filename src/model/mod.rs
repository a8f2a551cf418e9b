//! Core model types for the editor
//!
//! `EditorModel` ties the block document (source of truth) to its visual
//! tree projection and the transient UI state: the slash menu, the ghost
//! suggestion and status messages.

pub mod block;
pub mod cursor;
pub mod document;
pub mod ui;

pub use block::{byte_index, Block, BlockId, BlockIdGen, BlockKind};
pub use cursor::CursorPosition;
pub use document::{Document, TextStats};
pub use ui::UiState;

use std::time::Duration;

use crate::commands::Cmd;
use crate::config::EditorConfig;
use crate::ghost::GhostEngine;
use crate::keymap::FocusContext;
use crate::slash::SlashState;
use crate::tree::VisualTree;

/// The complete editing state
#[derive(Debug)]
pub struct EditorModel {
    pub document: Document,
    pub tree: VisualTree,
    pub slash: SlashState,
    pub ghost: GhostEngine,
    pub ui: UiState,
    pub config: EditorConfig,
}

impl EditorModel {
    /// An editor holding one empty paragraph
    pub fn new(config: EditorConfig) -> Self {
        Self::from_markdown("", config)
    }

    /// An editor seeded from markdown, caret at the start of the first
    /// editable block
    pub fn from_markdown(raw: &str, config: EditorConfig) -> Self {
        let guard = Duration::from_millis(config.ghost.guard_ms);
        let mut model = Self {
            document: Document::new(),
            tree: VisualTree::new(),
            slash: SlashState::new(),
            ghost: GhostEngine::new(guard),
            ui: UiState::new(),
            config,
        };
        model.load_document(Document::from_markdown(raw));
        model
    }

    /// Replace the document wholesale; transient state is dropped
    pub fn load_document(&mut self, mut document: Document) -> Option<Cmd> {
        let cancelled = self.ghost.cancel(&mut self.tree);
        self.slash.close();
        document.ensure_editable();
        self.document = document;
        self.tree.render(self.document.blocks());
        if let Some(first) = self.document.first_editable() {
            self.tree.select(first, 0);
        }
        tracing::debug!(blocks = self.document.len(), "document loaded");
        Some(Cmd::batch(vec![
            cancelled
                .map(|request_id| Cmd::CancelCompletion { request_id })
                .unwrap_or_default(),
            Cmd::Redraw,
        ]))
    }

    /// The caret, read back from the visual tree's selection
    #[inline]
    pub fn cursor(&self) -> Option<CursorPosition> {
        self.tree.save_cursor()
    }

    /// Move the caret; the offset is clamped to the block text
    pub fn set_cursor(&mut self, block_id: BlockId, offset: usize) -> Option<CursorPosition> {
        self.tree
            .select(block_id, offset)
            .map(|offset| CursorPosition::new(block_id, offset))
    }

    /// The block holding the caret
    pub fn current_block(&self) -> Option<&Block> {
        let cursor = self.cursor()?;
        self.document.get(cursor.block_id)
    }

    /// Snapshot of focus handed to the key interpreters
    pub fn focus_context(&self) -> FocusContext {
        let cursor = self.cursor();
        let block = cursor.and_then(|c| self.document.get(c.block_id));
        FocusContext {
            block_id: block.map(|b| b.id),
            kind: block.map(|b| b.kind),
            offset: cursor.map(|c| c.offset).unwrap_or(0),
            text_len: block.map(Block::char_len).unwrap_or(0),
            slash_open: self.slash.is_open(),
            ghost_live: self.ghost.is_live(),
        }
    }

    /// Pure text edit inside one block: patch its node, no rebuild
    pub fn edit_text(&mut self, block_id: BlockId, text: &str, caret: usize) -> bool {
        if !self.document.set_text(block_id, text) {
            return false;
        }
        self.tree.patch_text(block_id, text);
        self.set_cursor(block_id, caret);
        true
    }

    /// Rebuild the visual tree after a structural change
    ///
    /// The caret is saved before and restored after the rebuild; `focus`
    /// overrides where it should land. Any live ghost suggestion is
    /// cancelled because its overlay does not survive the rebuild.
    pub fn reconcile(&mut self, focus: Option<CursorPosition>) -> Cmd {
        let saved = self.cursor();
        let cancelled = self.ghost.cancel(&mut self.tree);

        self.tree.render(self.document.blocks());

        let landed = match focus.or(saved) {
            Some(target) => self.tree.restore_cursor(target),
            None => self
                .document
                .first_editable()
                .and_then(|first| self.set_cursor(first, 0)),
        };

        if let Some(slash_block) = self.slash.block_id {
            if self.document.get(slash_block).is_none() {
                self.slash.close();
            }
        }

        tracing::debug!(
            target: "tree",
            generation = self.tree.generation(),
            cursor = ?landed,
            "reconciled"
        );

        Cmd::batch(vec![
            cancelled
                .map(|request_id| Cmd::CancelCompletion { request_id })
                .unwrap_or_default(),
            Cmd::Redraw,
        ])
    }

    /// Check structural invariants after an update (debug builds only)
    #[cfg(debug_assertions)]
    pub fn assert_invariants_with_context(&self, context: &str) {
        assert!(
            !self.document.is_empty(),
            "[{}] document has no blocks",
            context
        );
        assert!(
            self.tree.mirrors(self.document.blocks()),
            "[{}] visual tree diverged from the block model",
            context
        );
        if let Some(cursor) = self.cursor() {
            let block = self.document.get(cursor.block_id);
            assert!(
                block.is_some_and(|b| b.kind.is_editable()),
                "[{}] cursor {} is not in an editable block",
                context,
                cursor
            );
            assert!(
                block.is_some_and(|b| cursor.offset <= b.char_len()),
                "[{}] cursor {} is past the end of its block",
                context,
                cursor
            );
        } else {
            assert!(
                self.document.first_editable().is_none() || !self.ui.mounted,
                "[{}] no cursor although an editable block exists",
                context
            );
        }
        assert_eq!(
            self.tree.has_overlay(),
            self.ghost.has_suggestion(),
            "[{}] overlay presence disagrees with ghost status {:?}",
            context,
            self.ghost.status()
        );
        if self.slash.is_open() {
            assert!(
                self.slash.block_id == self.cursor().map(|c| c.block_id),
                "[{}] slash menu open outside its block",
                context
            );
        }
    }

    #[cfg(not(debug_assertions))]
    pub fn assert_invariants_with_context(&self, _context: &str) {}
}

impl Default for EditorModel {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
