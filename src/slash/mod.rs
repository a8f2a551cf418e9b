//! Slash menu: the block-type catalog and the menu's transient state
//!
//! The menu opens when `/` is typed inside an editable block, filters the
//! catalog by the text typed after the slash, and hands the chosen command
//! name to the line transformer.

use crate::model::BlockId;

/// Grouping shown in the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Basic,
    Heading,
}

/// One entry of the block-type catalog
#[derive(Debug, Clone)]
pub struct BlockTypeDef {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
    /// Command name handed to the line transformer
    pub command: &'static str,
    pub category: Category,
}

impl BlockTypeDef {
    /// Case-insensitive substring match on the label or any keyword
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.label.to_lowercase().contains(&query)
            || self.keywords.iter().any(|k| k.to_lowercase().contains(&query))
    }
}

/// Static catalog, in menu order
pub static BLOCK_TYPES: &[BlockTypeDef] = &[
    BlockTypeDef {
        id: "paragraph",
        label: "Text",
        description: "Just start writing with plain text.",
        keywords: &["text", "paragraph", "plain"],
        command: "text",
        category: Category::Basic,
    },
    BlockTypeDef {
        id: "heading1",
        label: "Heading 1",
        description: "Big section heading.",
        keywords: &["heading", "h1", "title", "big"],
        command: "h1",
        category: Category::Heading,
    },
    BlockTypeDef {
        id: "heading2",
        label: "Heading 2",
        description: "Medium section heading.",
        keywords: &["heading", "h2", "subtitle"],
        command: "h2",
        category: Category::Heading,
    },
    BlockTypeDef {
        id: "heading3",
        label: "Heading 3",
        description: "Small section heading.",
        keywords: &["heading", "h3", "subheading"],
        command: "h3",
        category: Category::Heading,
    },
    BlockTypeDef {
        id: "quote",
        label: "Quote",
        description: "Capture a quote.",
        keywords: &["quote", "blockquote", "citation"],
        command: "quote",
        category: Category::Basic,
    },
    BlockTypeDef {
        id: "divider",
        label: "Divider",
        description: "Visually divide blocks.",
        keywords: &["divider", "separator", "line", "hr"],
        command: "divider",
        category: Category::Basic,
    },
];

/// Filter the catalog; an empty query keeps everything
pub fn filter_block_types(query: &str) -> Vec<&'static BlockTypeDef> {
    if query.is_empty() {
        return BLOCK_TYPES.iter().collect();
    }
    BLOCK_TYPES.iter().filter(|def| def.matches(query)).collect()
}

/// Transient menu state; never written by the block model
#[derive(Debug, Clone, Default)]
pub struct SlashState {
    open: bool,
    /// Block holding the triggering slash
    pub block_id: Option<BlockId>,
    /// Char offset of the slash within that block
    pub slash_offset: usize,
    pub query: String,
    /// (row, col) of the caret when the menu opened; fixed while open
    pub anchor: (usize, usize),
    pub selected_index: usize,
    pub candidates: Vec<&'static BlockTypeDef>,
}

impl SlashState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open with an empty query; the anchor is computed once here
    pub fn open(&mut self, block_id: BlockId, slash_offset: usize, anchor: (usize, usize)) {
        self.open = true;
        self.block_id = Some(block_id);
        self.slash_offset = slash_offset;
        self.anchor = anchor;
        self.query.clear();
        self.selected_index = 0;
        self.candidates = filter_block_types("");
        tracing::debug!(target: "slash", %block_id, slash_offset, "menu opened");
    }

    pub fn close(&mut self) {
        if self.open {
            tracing::debug!(target: "slash", query = %self.query, "menu closed");
        }
        *self = Self::default();
    }

    /// Re-filter; the selection is clamped to the new candidate count
    pub fn set_query(&mut self, query: &str) {
        if self.query == query {
            return;
        }
        self.query = query.to_string();
        self.candidates = filter_block_types(query);
        self.selected_index = self
            .selected_index
            .min(self.candidates.len().saturating_sub(1));
    }

    /// Move the selection down, wrapping to the top
    pub fn select_next(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        self.selected_index = (self.selected_index + 1) % self.candidates.len();
    }

    /// Move the selection up, wrapping to the bottom
    pub fn select_previous(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        self.selected_index = match self.selected_index {
            0 => self.candidates.len() - 1,
            i => i - 1,
        };
    }

    pub fn selected(&self) -> Option<&'static BlockTypeDef> {
        self.candidates.get(self.selected_index).copied()
    }

    pub fn candidate(&self, index: usize) -> Option<&'static BlockTypeDef> {
        self.candidates.get(index).copied()
    }
}
