//! Cursor position: which character in which block

use std::fmt;

use serde::Serialize;

use super::block::BlockId;

/// A caret expressed against the block model rather than the visual tree
///
/// `offset` counts chars of the block's flattened text (a line break is one
/// char, a ghost overlay contributes nothing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CursorPosition {
    pub block_id: BlockId,
    pub offset: usize,
}

impl CursorPosition {
    pub const fn new(block_id: BlockId, offset: usize) -> Self {
        Self { block_id, offset }
    }

    /// Same block, offset clamped to `[0, len]`
    pub fn clamped(self, len: usize) -> Self {
        Self {
            block_id: self.block_id,
            offset: self.offset.min(len),
        }
    }
}

impl fmt::Display for CursorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_id, self.offset)
    }
}
