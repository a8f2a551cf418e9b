//! Line-oriented markdown subset: parse raw text into blocks and back
//!
//! The grammar is deliberately small: `#`/`##`/`###` headings, `>` quotes,
//! `---`/`***` dividers, and paragraphs separated by blank lines. Anything
//! unrecognized is paragraph text; parsing never fails.

use crate::model::{Block, BlockIdGen, BlockKind};

/// Blocks render to their marker form and are joined with this separator
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Classification of a single trimmed input line
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Divider,
    Heading(BlockKind, &'a str),
    Quote(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if line.is_empty() {
        return Line::Blank;
    }
    if line == "---" || line == "***" {
        return Line::Divider;
    }
    for (marker, kind) in [
        ("###", BlockKind::Heading3),
        ("##", BlockKind::Heading2),
        ("#", BlockKind::Heading1),
    ] {
        if line == marker {
            return Line::Heading(kind, "");
        }
        if let Some(rest) = line.strip_prefix(marker).and_then(|r| r.strip_prefix(' ')) {
            return Line::Heading(kind, rest.trim());
        }
    }
    if line == ">" {
        return Line::Quote("");
    }
    if let Some(rest) = line.strip_prefix("> ") {
        return Line::Quote(rest.trim());
    }
    Line::Text(line)
}

/// Accumulates lines of the block in progress
struct Pending<'a> {
    kind: BlockKind,
    lines: Vec<&'a str>,
}

impl<'a> Pending<'a> {
    fn new() -> Self {
        Self {
            kind: BlockKind::Paragraph,
            lines: Vec::new(),
        }
    }

    fn flush(&mut self, ids: &mut BlockIdGen, out: &mut Vec<Block>) {
        if self.lines.is_empty() {
            return;
        }
        let text = self.lines.join("\n");
        out.push(Block::new(ids.next_id(), self.kind, text.trim()));
        self.lines.clear();
        self.kind = BlockKind::Paragraph;
    }

    fn push(&mut self, kind: BlockKind, line: &'a str, ids: &mut BlockIdGen, out: &mut Vec<Block>) {
        if self.kind != kind {
            self.flush(ids, out);
            self.kind = kind;
        }
        self.lines.push(line);
    }
}

/// Parse raw text into blocks, drawing ids from `ids`
///
/// Always returns at least one block (an empty paragraph for empty input).
pub fn parse(raw: &str, ids: &mut BlockIdGen) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut pending = Pending::new();

    for line in raw.split('\n') {
        match classify(line.trim()) {
            Line::Blank => pending.flush(ids, &mut blocks),
            Line::Divider => {
                pending.flush(ids, &mut blocks);
                blocks.push(Block::new(ids.next_id(), BlockKind::Divider, ""));
            }
            Line::Heading(kind, text) => {
                pending.flush(ids, &mut blocks);
                blocks.push(Block::new(ids.next_id(), kind, text));
            }
            Line::Quote(text) => pending.push(BlockKind::Quote, text, ids, &mut blocks),
            Line::Text(text) => pending.push(BlockKind::Paragraph, text, ids, &mut blocks),
        }
    }
    pending.flush(ids, &mut blocks);

    if blocks.is_empty() {
        blocks.push(Block::new(ids.next_id(), BlockKind::Paragraph, ""));
    }
    blocks
}

/// Render one block to its marker form
pub fn render_block(block: &Block) -> String {
    let marker = block.kind.marker();
    match block.kind {
        BlockKind::Divider => marker.to_string(),
        BlockKind::Paragraph => block.text.clone(),
        BlockKind::Quote => block
            .text
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    marker.to_string()
                } else {
                    format!("{} {}", marker, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ if block.text.is_empty() => marker.to_string(),
        _ => format!("{} {}", marker, block.text),
    }
}

/// Render blocks verbatim, without canonicalizing their text
pub fn render(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Canonical markdown for a block sequence
///
/// Rendering the parse of the verbatim rendering normalizes whitespace and
/// multi-line headings, which makes
/// `serialize(parse(serialize(b))) == serialize(b)` hold for every `b`.
pub fn serialize(blocks: &[Block]) -> String {
    let mut scratch = BlockIdGen::new();
    render(&parse(&render(blocks), &mut scratch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockId;

    fn kinds_and_text(blocks: &[Block]) -> Vec<(BlockKind, &str)> {
        blocks.iter().map(|b| (b.kind, b.text.as_str())).collect()
    }

    fn parse_fresh(raw: &str) -> Vec<Block> {
        parse(raw, &mut BlockIdGen::new())
    }

    #[test]
    fn test_parse_all_markers() {
        let blocks = parse_fresh("# Title\n\nSome text\n\n## Sub\n### Small\n> a quote\n---\nafter");
        assert_eq!(
            kinds_and_text(&blocks),
            vec![
                (BlockKind::Heading1, "Title"),
                (BlockKind::Paragraph, "Some text"),
                (BlockKind::Heading2, "Sub"),
                (BlockKind::Heading3, "Small"),
                (BlockKind::Quote, "a quote"),
                (BlockKind::Divider, ""),
                (BlockKind::Paragraph, "after"),
            ]
        );
    }

    #[test]
    fn test_consecutive_quote_lines_merge() {
        let blocks = parse_fresh("> one\n> two\n>\n> three");
        assert_eq!(
            kinds_and_text(&blocks),
            vec![(BlockKind::Quote, "one\ntwo\n\nthree")]
        );
    }

    #[test]
    fn test_paragraph_lines_accumulate_until_marker() {
        let blocks = parse_fresh("first\n  second  \n> quoted");
        assert_eq!(
            kinds_and_text(&blocks),
            vec![
                (BlockKind::Paragraph, "first\nsecond"),
                (BlockKind::Quote, "quoted"),
            ]
        );
    }

    #[test]
    fn test_unrecognized_markers_are_text() {
        let blocks = parse_fresh("#nospace\n####four\n>tight");
        assert_eq!(
            kinds_and_text(&blocks),
            vec![(BlockKind::Paragraph, "#nospace\n####four\n>tight")]
        );
    }

    #[test]
    fn test_bare_markers_are_empty_blocks() {
        let blocks = parse_fresh("#\n\n>");
        assert_eq!(
            kinds_and_text(&blocks),
            vec![(BlockKind::Heading1, ""), (BlockKind::Quote, "")]
        );
    }

    #[test]
    fn test_empty_input_is_one_empty_paragraph() {
        for raw in ["", "\n\n", "   "] {
            let blocks = parse_fresh(raw);
            assert_eq!(kinds_and_text(&blocks), vec![(BlockKind::Paragraph, "")]);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let blocks = parse_fresh("a\n\nb\n\n---\n\n# c");
        let mut ids: Vec<_> = blocks.iter().map(|b| b.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_render_quote_reprefixes_lines() {
        let block = Block::new(BlockId(1), BlockKind::Quote, "one\n\ntwo");
        assert_eq!(render_block(&block), "> one\n>\n> two");
    }

    #[test]
    fn test_serialize_normalizes_messy_blocks() {
        let blocks = vec![
            Block::new(BlockId(1), BlockKind::Heading1, "  spaced  "),
            Block::new(BlockId(2), BlockKind::Paragraph, ""),
            Block::new(BlockId(3), BlockKind::Heading2, "two\nlines"),
        ];
        let once = serialize(&blocks);
        assert_eq!(once, "# spaced\n\n## two\n\nlines");
        let again = serialize(&parse_fresh(&once));
        assert_eq!(again, once);
    }
}
