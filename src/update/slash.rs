//! Slash-menu interpreter and pointer messages

use crate::commands::Cmd;
use crate::keymap::{FocusContext, KeyCode, Keystroke};
use crate::messages::SlashMsg;
use crate::model::EditorModel;
use crate::slash::BlockTypeDef;
use crate::transform::{self, BlockCommand};

use super::dispatch::{InputEvent, KeyHandler};

pub struct SlashInterpreter;

impl KeyHandler for SlashInterpreter {
    fn name(&self) -> &'static str {
        "slash"
    }

    /// While open, the menu owns Up, Down, Enter and Escape
    fn on_key(
        &self,
        model: &mut EditorModel,
        ctx: &FocusContext,
        key: Keystroke,
        out: &mut Vec<Cmd>,
    ) -> bool {
        if !ctx.slash_open || key.mods.is_chord() {
            return false;
        }
        match key.key {
            KeyCode::Up => model.slash.select_previous(),
            KeyCode::Down => model.slash.select_next(),
            KeyCode::Escape => model.slash.close(),
            KeyCode::Enter => {
                if let Some(def) = model.slash.selected() {
                    out.extend(execute(model, def));
                }
            }
            _ => return false,
        }
        out.push(Cmd::Redraw);
        true
    }

    fn on_input(
        &self,
        model: &mut EditorModel,
        _ctx: &FocusContext,
        event: &InputEvent,
        out: &mut Vec<Cmd>,
    ) {
        let was_open = model.slash.is_open();
        match event {
            InputEvent::Insert(text) if text.ends_with('/') => open_at_cursor(model),
            _ => refresh(model),
        }
        if was_open || model.slash.is_open() {
            out.push(Cmd::Redraw);
        }
    }

    fn on_selection_change(&self, model: &mut EditorModel, _ctx: &FocusContext, out: &mut Vec<Cmd>) {
        if model.slash.is_open() {
            refresh(model);
            out.push(Cmd::Redraw);
        }
    }
}

/// Open the menu for a slash just typed before the caret, unless a space
/// directly follows it
fn open_at_cursor(model: &mut EditorModel) {
    let Some(cursor) = model.cursor() else {
        return;
    };
    let Some(block) = model.document.get(cursor.block_id) else {
        return;
    };
    if cursor.offset == 0 || !block.kind.is_editable() {
        return;
    }
    let slash_offset = cursor.offset - 1;
    if block.text.chars().nth(cursor.offset) == Some(' ') {
        model.slash.close();
        return;
    }
    let anchor = model
        .tree
        .caret_point(cursor.block_id, cursor.offset)
        .unwrap_or_default();
    model.slash.open(cursor.block_id, slash_offset, anchor);
}

/// Re-derive the query from the live block text, closing the menu when the
/// triggering context is gone
fn refresh(model: &mut EditorModel) {
    if !model.slash.is_open() {
        return;
    }
    let Some(query) = current_query(model) else {
        model.slash.close();
        return;
    };
    model.slash.set_query(&query);
}

fn current_query(model: &EditorModel) -> Option<String> {
    let block_id = model.slash.block_id?;
    let cursor = model.cursor().filter(|c| c.block_id == block_id)?;
    let block = model.document.get(block_id)?;
    let slash = model.slash.slash_offset;

    let chars: Vec<char> = block.text.chars().collect();
    if chars.get(slash) != Some(&'/') || cursor.offset <= slash {
        return None;
    }
    let region = &chars[slash + 1..cursor.offset.min(chars.len())];
    if region.first() == Some(&' ') {
        return None;
    }
    Some(region.iter().take_while(|&&c| c != ' ').collect())
}

/// Hand the chosen entry to the line transformer and close the menu
fn execute(model: &mut EditorModel, def: &BlockTypeDef) -> Option<Cmd> {
    let block_id = model.slash.block_id?;
    let offset = model
        .cursor()
        .filter(|c| c.block_id == block_id)
        .map(|c| c.offset)
        .unwrap_or(model.slash.slash_offset + 1 + model.slash.query.chars().count());
    let command = BlockCommand::from_name(def.command);

    tracing::debug!(target: "slash", entry = def.id, query = %model.slash.query, "executing");
    model.slash.close();
    transform::apply_command(model, block_id, command, offset)
}

/// Handle slash-menu messages from the pointer
pub fn update_slash(model: &mut EditorModel, msg: SlashMsg) -> Option<Cmd> {
    if !model.slash.is_open() {
        return None;
    }
    match msg {
        SlashMsg::Pick(index) => {
            let def = model.slash.candidate(index)?;
            let cmd = execute(model, def);
            Some(Cmd::batch(vec![cmd.unwrap_or_default(), Cmd::Redraw]))
        }
        SlashMsg::Close => {
            model.slash.close();
            Some(Cmd::Redraw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::messages::Msg;
    use crate::model::BlockKind;
    use crate::update::update;

    fn typed(text: &str) -> EditorModel {
        let mut model = EditorModel::new(EditorConfig::default());
        for ch in text.chars() {
            update(&mut model, Msg::type_char(ch));
        }
        model
    }

    #[test]
    fn test_slash_opens_with_empty_query() {
        let model = typed("/");
        assert!(model.slash.is_open());
        assert_eq!(model.slash.query, "");
        assert_eq!(model.slash.slash_offset, 0);
        assert_eq!(model.slash.candidates.len(), 6);
    }

    #[test]
    fn test_query_follows_typing() {
        let model = typed("hi /quo");
        assert!(model.slash.is_open());
        assert_eq!(model.slash.query, "quo");
        let labels: Vec<_> = model.slash.candidates.iter().map(|d| d.label).collect();
        assert_eq!(labels, vec!["Quote"]);
    }

    #[test]
    fn test_space_after_slash_closes() {
        let model = typed("/ ");
        assert!(!model.slash.is_open());
    }

    #[test]
    fn test_deleting_slash_closes() {
        let mut model = typed("/");
        update(&mut model, Msg::key(Keystroke::key(KeyCode::Backspace)));
        assert!(!model.slash.is_open());
    }

    #[test]
    fn test_enter_on_empty_list_keeps_menu_open() {
        let mut model = typed("/zzz");
        assert!(model.slash.candidates.is_empty());
        update(&mut model, Msg::key(Keystroke::key(KeyCode::Enter)));
        assert!(model.slash.is_open());
        assert_eq!(model.document.len(), 1);
    }

    #[test]
    fn test_pick_ignores_keyboard_selection() {
        let mut model = typed("note /");
        update(&mut model, Msg::key(Keystroke::key(KeyCode::Down)));
        assert_eq!(model.slash.selected_index, 1);
        update(&mut model, Msg::Slash(SlashMsg::Pick(4)));

        assert!(!model.slash.is_open());
        let block = &model.document.blocks()[0];
        assert_eq!(block.kind, BlockKind::Quote);
        assert_eq!(block.text, "note");
    }
}
