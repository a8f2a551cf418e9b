//! Line interpreter: structural interceptors that run before anything else

use crate::commands::Cmd;
use crate::keymap::{FocusContext, KeyCode, Keystroke};
use crate::model::EditorModel;
use crate::transform;

use super::dispatch::KeyHandler;

pub struct LineInterpreter;

impl KeyHandler for LineInterpreter {
    fn name(&self) -> &'static str {
        "line"
    }

    /// Backspace on an empty heading or quote demotes it in place.
    /// Backspace on an empty paragraph or next to a divider is left to the
    /// default action.
    fn on_key(
        &self,
        model: &mut EditorModel,
        ctx: &FocusContext,
        key: Keystroke,
        out: &mut Vec<Cmd>,
    ) -> bool {
        if key.key != KeyCode::Backspace || key.mods.is_chord() {
            return false;
        }
        if !ctx.in_special_block() || ctx.text_len != 0 {
            return false;
        }
        match transform::demote_if_empty(model) {
            Some(cmd) => {
                out.push(cmd);
                true
            }
            None => false,
        }
    }
}
