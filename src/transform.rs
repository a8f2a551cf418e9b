//! Line transformer: block-kind commands and structural edits
//!
//! Everything here mutates the document and then either patches the one
//! affected node (pure text edits) or reconciles the whole tree (anything
//! that adds, removes or re-kinds a block). Functions return `None` when the
//! edit does not apply at the current cursor.

use crate::commands::Cmd;
use crate::model::{byte_index, BlockId, BlockKind, CursorPosition, EditorModel};

/// Block conversions reachable from the slash menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCommand {
    Text,
    Heading1,
    Heading2,
    Heading3,
    Quote,
    Divider,
}

impl BlockCommand {
    /// Resolve a catalog command name; unknown names degrade to plain text
    pub fn from_name(name: &str) -> Self {
        match name {
            "h1" | "heading1" => BlockCommand::Heading1,
            "h2" | "heading2" => BlockCommand::Heading2,
            "h3" | "heading3" => BlockCommand::Heading3,
            "quote" => BlockCommand::Quote,
            "divider" => BlockCommand::Divider,
            "text" | "paragraph" => BlockCommand::Text,
            other => {
                tracing::debug!(target: "transform", command = other, "unknown command, using text");
                BlockCommand::Text
            }
        }
    }

    pub fn kind(self) -> BlockKind {
        match self {
            BlockCommand::Text => BlockKind::Paragraph,
            BlockCommand::Heading1 => BlockKind::Heading1,
            BlockCommand::Heading2 => BlockKind::Heading2,
            BlockCommand::Heading3 => BlockKind::Heading3,
            BlockCommand::Quote => BlockKind::Quote,
            BlockCommand::Divider => BlockKind::Divider,
        }
    }

    /// Placeholder text used when the stripped line is empty
    pub fn default_text(self) -> &'static str {
        match self {
            BlockCommand::Heading1 => "Heading 1",
            BlockCommand::Heading2 => "Heading 2",
            BlockCommand::Heading3 => "Heading 3",
            BlockCommand::Quote => "Quote",
            BlockCommand::Text | BlockCommand::Divider => "",
        }
    }
}

fn split_chars(text: &str, at: usize) -> (&str, &str) {
    text.split_at(byte_index(text, at))
}

/// Remove the `/query` token that triggered a command
///
/// The token runs from the last `/` before `cursor` up to the cursor, or up
/// to the first space after the slash if that comes first. Text after that
/// space is kept. Returns the trimmed remainder and the slash offset.
pub fn strip_slash_token(text: &str, cursor: usize) -> (String, Option<usize>) {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());

    let Some(slash) = chars[..cursor].iter().rposition(|&c| c == '/') else {
        return (text.trim().to_string(), None);
    };

    let end = chars[slash + 1..]
        .iter()
        .position(|&c| c == ' ')
        .map(|i| slash + 1 + i)
        .unwrap_or(chars.len())
        .min(cursor);

    let before: String = chars[..slash].iter().collect();
    let mut rest = &chars[end..];
    if rest.first() == Some(&' ') {
        rest = &rest[1..];
    }
    let rest: String = rest.iter().collect();

    (format!("{}{}", before, rest).trim().to_string(), Some(slash))
}

/// Convert `block_id` per `command`, stripping the slash token first
///
/// Headings and quotes land the cursor at the end of the new text. A divider
/// either replaces an empty line or follows the line's remaining text; the
/// cursor then moves to the next editable block, created if needed.
pub fn apply_command(
    model: &mut EditorModel,
    block_id: BlockId,
    command: BlockCommand,
    cursor_offset: usize,
) -> Option<Cmd> {
    let block = model.document.get(block_id)?;
    if !block.kind.is_editable() {
        return None;
    }
    let (clean, _) = strip_slash_token(&block.text, cursor_offset);

    tracing::debug!(
        target: "transform",
        block = %block_id,
        from = %block.kind,
        ?command,
        "applying command"
    );

    let focus = match command {
        BlockCommand::Divider => {
            let divider = if clean.is_empty() {
                model.document.set_kind(block_id, BlockKind::Divider);
                block_id
            } else {
                model.document.set_kind(block_id, BlockKind::Paragraph);
                model.document.set_text(block_id, &clean);
                model
                    .document
                    .insert_after(block_id, BlockKind::Divider, "")
            };
            let target = match model.document.next_editable(divider) {
                Some(next) => next,
                None => model
                    .document
                    .insert_after(divider, BlockKind::Paragraph, ""),
            };
            CursorPosition::new(target, 0)
        }
        _ => {
            let kind = command.kind();
            let text = if clean.is_empty() {
                command.default_text().to_string()
            } else {
                clean
            };
            model.document.set_text(block_id, &text);
            model.document.set_kind(block_id, kind);
            let len = model.document.get(block_id).map_or(0, |b| b.char_len());
            CursorPosition::new(block_id, len)
        }
    };

    Some(model.reconcile(Some(focus)))
}

/// Backspace on an empty heading or quote: demote it to a paragraph in place
pub fn demote_if_empty(model: &mut EditorModel) -> Option<Cmd> {
    let block = model.current_block()?;
    if !block.kind.is_special() || !block.text.is_empty() {
        return None;
    }
    let id = block.id;
    tracing::debug!(target: "transform", block = %id, from = %block.kind, "demoting empty block");
    model.document.set_kind(id, BlockKind::Paragraph);
    Some(model.reconcile(Some(CursorPosition::new(id, 0))))
}

/// Insert text at the cursor as a pure text edit
///
/// Newlines are flattened to spaces in blocks that cannot hold them.
pub fn insert_text(model: &mut EditorModel, text: &str) -> Option<Cmd> {
    let cursor = model.cursor()?;
    let block = model.document.get(cursor.block_id)?;
    let inserted = if block.kind.allows_line_breaks() {
        text.to_string()
    } else {
        text.replace('\n', " ")
    };
    let (before, after) = split_chars(&block.text, cursor.offset);
    let updated = format!("{}{}{}", before, inserted, after);
    let caret = cursor.offset + inserted.chars().count();

    model.edit_text(cursor.block_id, &updated, caret);
    Some(Cmd::Redraw)
}

/// Enter: split the block at the cursor, or leave a quote
pub fn split_block(model: &mut EditorModel) -> Option<Cmd> {
    let cursor = model.cursor()?;
    let block = model.document.get(cursor.block_id)?;
    if block.kind == BlockKind::Quote {
        return exit_quote(model);
    }

    let (before, after) = split_chars(&block.text, cursor.offset);
    let (before, after) = (before.to_string(), after.to_string());
    let id = cursor.block_id;

    model.document.set_text(id, &before);
    let tail = model.document.insert_after(id, BlockKind::Paragraph, &after);
    tracing::debug!(target: "transform", block = %id, %tail, "split block");

    Some(model.reconcile(Some(CursorPosition::new(tail, 0))))
}

/// Enter inside a quote: the text after the cursor moves into a new
/// paragraph below, and the quote disappears if nothing is left in it
pub fn exit_quote(model: &mut EditorModel) -> Option<Cmd> {
    let cursor = model.cursor()?;
    let block = model.document.get(cursor.block_id)?;
    if block.kind != BlockKind::Quote {
        return None;
    }

    let (before, after) = split_chars(&block.text, cursor.offset);
    let before = before.trim_end().to_string();
    let after = after.trim_start().to_string();
    let id = cursor.block_id;

    let paragraph = model.document.insert_after(id, BlockKind::Paragraph, &after);
    if before.trim().is_empty() {
        model.document.remove(id);
    } else {
        model.document.set_text(id, &before);
    }
    tracing::debug!(target: "transform", quote = %id, %paragraph, "exited quote");

    Some(model.reconcile(Some(CursorPosition::new(paragraph, 0))))
}

/// Shift+Enter: a soft line break where the block allows one, otherwise a split
pub fn insert_line_break(model: &mut EditorModel) -> Option<Cmd> {
    let kind = model.current_block()?.kind;
    if kind.allows_line_breaks() {
        insert_text(model, "\n")
    } else {
        split_block(model)
    }
}

/// Backspace: delete the char before the cursor, or join with what precedes
pub fn delete_backward(model: &mut EditorModel) -> Option<Cmd> {
    let cursor = model.cursor()?;
    if cursor.offset == 0 {
        return backspace_at_start(model);
    }
    let block = model.document.get(cursor.block_id)?;
    let (before, after) = split_chars(&block.text, cursor.offset);
    let mut before = before.to_string();
    before.pop();
    let updated = format!("{}{}", before, after);

    model.edit_text(cursor.block_id, &updated, cursor.offset - 1);
    Some(Cmd::Redraw)
}

/// Backspace at offset 0
///
/// A directly preceding divider is removed; an empty paragraph is removed in
/// favor of the end of the previous editable block; otherwise the block is
/// merged into an editable predecessor with the cursor at the join.
pub fn backspace_at_start(model: &mut EditorModel) -> Option<Cmd> {
    let cursor = model.cursor()?;
    let block = model.document.get(cursor.block_id)?.clone();
    let previous = model.document.previous(block.id).cloned();

    match previous {
        Some(prev) if prev.kind == BlockKind::Divider => {
            model.document.remove(prev.id);
            tracing::debug!(target: "transform", divider = %prev.id, "removed divider");
            Some(model.reconcile(Some(CursorPosition::new(block.id, 0))))
        }
        _ if block.kind == BlockKind::Paragraph && block.text.is_empty() => {
            let target = model.document.previous_editable(block.id)?;
            let end = model.document.get(target).map_or(0, |b| b.char_len());
            model.document.remove(block.id);
            tracing::debug!(target: "transform", block = %block.id, "removed empty paragraph");
            Some(model.reconcile(Some(CursorPosition::new(target, end))))
        }
        Some(prev) if !block.text.is_empty() => merge_into(model, prev.id, block.id),
        _ => None,
    }
}

/// Delete: remove the char after the cursor, or pull the next block up
pub fn delete_forward(model: &mut EditorModel) -> Option<Cmd> {
    let cursor = model.cursor()?;
    let block = model.document.get(cursor.block_id)?;
    if cursor.offset < block.char_len() {
        let (before, after) = split_chars(&block.text, cursor.offset);
        let updated: String = before.chars().chain(after.chars().skip(1)).collect();
        model.edit_text(cursor.block_id, &updated, cursor.offset);
        return Some(Cmd::Redraw);
    }

    let next = model.document.next(cursor.block_id)?.clone();
    if next.kind == BlockKind::Divider {
        model.document.remove(next.id);
        tracing::debug!(target: "transform", divider = %next.id, "removed divider");
        return Some(model.reconcile(Some(cursor)));
    }
    merge_into(model, cursor.block_id, next.id)
}

/// Append `source` to `target` and drop `source`; cursor at the join point
fn merge_into(model: &mut EditorModel, target: BlockId, source: BlockId) -> Option<Cmd> {
    let into = model.document.get(target)?;
    if !into.kind.is_editable() {
        return None;
    }
    let join = into.char_len();
    let source_text = model.document.get(source)?.text.clone();
    let appended = if into.kind.allows_line_breaks() {
        source_text
    } else {
        source_text.replace('\n', " ")
    };
    let merged = format!("{}{}", into.text, appended);

    model.document.set_text(target, &merged);
    model.document.remove(source);
    tracing::debug!(target: "transform", %target, %source, join, "merged blocks");

    Some(model.reconcile(Some(CursorPosition::new(target, join))))
}
