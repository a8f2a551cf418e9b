//! Block-tagged HTML projection of the document
//!
//! Every element carries `data-block-id` so a host page can map a DOM node
//! back to its block without scanning.

use std::fmt::Write;

use crate::model::{Block, BlockKind};

/// Render blocks to HTML, one element per block
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        write_block(&mut out, block);
    }
    out
}

fn write_block(out: &mut String, block: &Block) {
    let tag = block.kind.html_tag();
    let id = block.id;
    match block.kind {
        BlockKind::Divider => {
            let _ = write!(out, r#"<hr data-block-id="{}">"#, id);
        }
        BlockKind::Paragraph if block.is_blank() => {
            let _ = write!(out, r#"<p data-block-id="{}"><br></p>"#, id);
        }
        _ => {
            let body = escape_html(&block.text).replace('\n', "<br>");
            let _ = write!(out, r#"<{tag} data-block-id="{id}">{body}</{tag}>"#);
        }
    }
}

/// Escape text for use inside an element body or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
