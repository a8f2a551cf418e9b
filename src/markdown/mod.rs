//! Markdown subset for the block model
//!
//! Parsing and canonical serialization, the block-tagged HTML projection,
//! and a CommonMark preview of the serialized text.

mod html;
mod parser;
mod preview;

pub use html::{blocks_to_html, escape_html};
pub use parser::{parse, render, render_block, serialize, BLOCK_SEPARATOR};
pub use preview::{preview_document, preview_html};
