//! Focus context handed to every key interpreter
//!
//! Interpreters never read ambient state to learn where the caret is; the
//! dispatcher snapshots it into a [`FocusContext`] and passes it in.

use crate::model::{BlockId, BlockKind};

/// Snapshot of focus and selection taken before an event is routed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusContext {
    /// Block holding the caret
    pub block_id: Option<BlockId>,
    pub kind: Option<BlockKind>,
    /// Caret offset within the block (chars)
    pub offset: usize,
    /// Length of the focused block's text (chars)
    pub text_len: usize,
    /// Whether the slash menu is open
    pub slash_open: bool,
    /// Whether a ghost suggestion is requesting, streaming or complete
    pub ghost_live: bool,
}

impl FocusContext {
    /// Whether the focused block is a heading or quote
    pub fn in_special_block(&self) -> bool {
        self.kind.is_some_and(BlockKind::is_special)
    }
}
