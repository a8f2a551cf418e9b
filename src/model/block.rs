//! Blocks: the typed units of document structure

use std::fmt;

use serde::Serialize;

/// Stable block identifier
///
/// Assigned once at creation and never reused within a document, so it
/// survives every rebuild of the visual tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

/// Hands out strictly increasing block ids
#[derive(Debug, Clone, Default)]
pub struct BlockIdGen {
    last: u64,
}

impl BlockIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> BlockId {
        self.last += 1;
        BlockId(self.last)
    }
}

/// The kind of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Quote,
    Divider,
}

impl BlockKind {
    /// Dividers are the only blocks the cursor can never enter
    #[inline]
    pub fn is_editable(self) -> bool {
        !matches!(self, BlockKind::Divider)
    }

    #[inline]
    pub fn is_heading(self) -> bool {
        matches!(
            self,
            BlockKind::Heading1 | BlockKind::Heading2 | BlockKind::Heading3
        )
    }

    /// Headings and quotes: the kinds Backspace demotes when empty
    #[inline]
    pub fn is_special(self) -> bool {
        self.is_heading() || matches!(self, BlockKind::Quote)
    }

    /// Whether a soft line break may live inside the block text
    #[inline]
    pub fn allows_line_breaks(self) -> bool {
        matches!(self, BlockKind::Paragraph | BlockKind::Quote)
    }

    pub fn heading(level: u8) -> Option<BlockKind> {
        match level {
            1 => Some(BlockKind::Heading1),
            2 => Some(BlockKind::Heading2),
            3 => Some(BlockKind::Heading3),
            _ => None,
        }
    }

    /// Line-prefix marker in markdown; empty for paragraphs
    pub fn marker(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "",
            BlockKind::Heading1 => "#",
            BlockKind::Heading2 => "##",
            BlockKind::Heading3 => "###",
            BlockKind::Quote => ">",
            BlockKind::Divider => "---",
        }
    }

    pub fn html_tag(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "p",
            BlockKind::Heading1 => "h1",
            BlockKind::Heading2 => "h2",
            BlockKind::Heading3 => "h3",
            BlockKind::Quote => "blockquote",
            BlockKind::Divider => "hr",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading1 => "heading1",
            BlockKind::Heading2 => "heading2",
            BlockKind::Heading3 => "heading3",
            BlockKind::Quote => "quote",
            BlockKind::Divider => "divider",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One typed unit of document content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub text: String,
}

impl Block {
    /// Create a block; a divider never keeps text
    pub fn new(id: BlockId, kind: BlockKind, text: impl Into<String>) -> Self {
        let text = if kind.is_editable() {
            text.into()
        } else {
            String::new()
        };
        Self { id, kind, text }
    }

    /// Length of the block text in chars
    #[inline]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Byte index of the `char_idx`-th char, clamped to the end of `text`
pub fn byte_index(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
