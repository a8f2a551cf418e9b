//! Default editing actions and non-keyboard editor messages

use crate::commands::Cmd;
use crate::keymap::{KeyCode, Keystroke};
use crate::messages::EditorMsg;
use crate::model::{CursorPosition, EditorModel};
use crate::transform;

use super::dispatch::{broadcast, InputEvent};

/// What an unclaimed key does: type, edit structure, or move the caret
///
/// Returns the resulting command and the input event to broadcast.
pub fn default_action(model: &mut EditorModel, key: Keystroke) -> (Option<Cmd>, Option<InputEvent>) {
    if key.mods.is_chord() {
        return (None, None);
    }
    if let Some(ch) = key.inserted_char() {
        let cmd = transform::insert_text(model, &ch.to_string());
        let event = cmd.as_ref().map(|_| InputEvent::Insert(ch.to_string()));
        return (cmd, event);
    }

    match key.key {
        KeyCode::Enter if key.mods.shift() => {
            let structural = model
                .current_block()
                .is_some_and(|b| !b.kind.allows_line_breaks());
            let cmd = transform::insert_line_break(model);
            let event = cmd.as_ref().map(|_| {
                if structural {
                    InputEvent::Structural
                } else {
                    InputEvent::Insert("\n".to_string())
                }
            });
            (cmd, event)
        }
        KeyCode::Enter => {
            let cmd = transform::split_block(model);
            let event = cmd.as_ref().map(|_| InputEvent::Structural);
            (cmd, event)
        }
        KeyCode::Backspace => {
            let cmd = transform::delete_backward(model);
            let event = cmd.as_ref().map(|_| InputEvent::Delete);
            (cmd, event)
        }
        KeyCode::Delete => {
            let cmd = transform::delete_forward(model);
            let event = cmd.as_ref().map(|_| InputEvent::Delete);
            (cmd, event)
        }
        _ if key.is_navigation() => (move_cursor(model, key.key), None),
        _ => (None, None),
    }
}

/// Caret movement; Left/Right cross block boundaries, Up/Down keep the
/// column where the target block allows it
fn move_cursor(model: &mut EditorModel, key: KeyCode) -> Option<Cmd> {
    let cursor = model.cursor()?;
    let doc = &model.document;
    let len = doc.get(cursor.block_id)?.char_len();
    let end_of = |id| CursorPosition::new(id, doc.get(id).map_or(0, |b| b.char_len()));

    let target = match key {
        KeyCode::Left if cursor.offset > 0 => CursorPosition::new(cursor.block_id, cursor.offset - 1),
        KeyCode::Left => end_of(doc.previous_editable(cursor.block_id)?),
        KeyCode::Right if cursor.offset < len => {
            CursorPosition::new(cursor.block_id, cursor.offset + 1)
        }
        KeyCode::Right => CursorPosition::new(doc.next_editable(cursor.block_id)?, 0),
        KeyCode::Up => match doc.previous_editable(cursor.block_id) {
            Some(id) => CursorPosition::new(id, cursor.offset),
            None => CursorPosition::new(cursor.block_id, 0),
        },
        KeyCode::Down => match doc.next_editable(cursor.block_id) {
            Some(id) => CursorPosition::new(id, cursor.offset),
            None => CursorPosition::new(cursor.block_id, len),
        },
        KeyCode::Home => CursorPosition::new(cursor.block_id, 0),
        KeyCode::End => CursorPosition::new(cursor.block_id, len),
        KeyCode::PageUp => CursorPosition::new(doc.first_editable()?, 0),
        KeyCode::PageDown => end_of(doc.last_editable()?),
        _ => return None,
    };

    if target == cursor {
        return None;
    }
    model.set_cursor(target.block_id, target.offset)?;
    Some(Cmd::Redraw)
}

/// Handle editor messages that do not come from a keydown
pub fn update_editor(model: &mut EditorModel, msg: EditorMsg) -> Option<Cmd> {
    let before = model.cursor();
    let mut out = Vec::new();

    let event = match msg {
        EditorMsg::InsertText(text) => {
            let cmd = transform::insert_text(model, &text);
            let event = cmd.as_ref().map(|_| InputEvent::Insert(text));
            out.extend(cmd);
            event
        }
        EditorMsg::ClickBlock { block_id, offset } => {
            if model.set_cursor(block_id, offset).is_none() {
                tracing::debug!(%block_id, offset, "click on a block that cannot hold the caret");
                return None;
            }
            out.push(Cmd::Redraw);
            None
        }
        EditorMsg::ClickOutside => {
            if model.slash.is_open() {
                model.slash.close();
                out.push(Cmd::Redraw);
            }
            None
        }
    };

    broadcast(model, event, before, &mut out);
    Cmd::batch(out).into_option()
}
