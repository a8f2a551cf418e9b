//! Keystroke dispatcher: a fixed-priority chain of key interpreters
//!
//! Every keydown is offered to the line interpreter, then the slash menu,
//! then ghost text. The first one to claim it stops propagation. Unclaimed
//! keys run the default editing action, after which every interpreter hears
//! about the resulting input and selection change, claimed or not.

use crate::commands::Cmd;
use crate::keymap::{FocusContext, Keystroke};
use crate::model::{CursorPosition, EditorModel};

use super::editing;
use super::ghost::GhostInterpreter;
use super::line::LineInterpreter;
use super::slash::SlashInterpreter;

/// What an edit did to the document, as seen by the interpreters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Text inserted at the caret
    Insert(String),
    /// Chars removed, within a block or across a join
    Delete,
    /// Blocks split, merged, added or removed
    Structural,
}

/// One interpreter in the chain
///
/// `on_key` returns true when the key is consumed. Side effects go into
/// `out`; they are kept even when the key is passed on.
pub trait KeyHandler: Sync {
    fn name(&self) -> &'static str;

    fn on_key(
        &self,
        model: &mut EditorModel,
        ctx: &FocusContext,
        key: Keystroke,
        out: &mut Vec<Cmd>,
    ) -> bool;

    fn on_input(
        &self,
        _model: &mut EditorModel,
        _ctx: &FocusContext,
        _event: &InputEvent,
        _out: &mut Vec<Cmd>,
    ) {
    }

    fn on_selection_change(
        &self,
        _model: &mut EditorModel,
        _ctx: &FocusContext,
        _out: &mut Vec<Cmd>,
    ) {
    }
}

/// Priority order: structural line edits, then the menu, then ghost text
pub static CHAIN: [&dyn KeyHandler; 3] = [&LineInterpreter, &SlashInterpreter, &GhostInterpreter];

/// Route one keystroke through the chain and the default action
pub fn dispatch_key(model: &mut EditorModel, key: Keystroke) -> Option<Cmd> {
    let ctx = model.focus_context();
    let mut out = Vec::new();

    for handler in CHAIN.iter() {
        if handler.on_key(model, &ctx, key, &mut out) {
            tracing::debug!(target: "dispatch", %key, handler = handler.name(), "key consumed");
            return Cmd::batch(out).into_option();
        }
    }

    let before = model.cursor();
    let (cmd, event) = editing::default_action(model, key);
    out.extend(cmd);
    broadcast(model, event, before, &mut out);

    Cmd::batch(out).into_option()
}

/// Notify every interpreter of an input event and of a moved selection
pub fn broadcast(
    model: &mut EditorModel,
    event: Option<InputEvent>,
    before: Option<CursorPosition>,
    out: &mut Vec<Cmd>,
) {
    let ctx = model.focus_context();

    if let Some(event) = &event {
        for handler in CHAIN.iter() {
            handler.on_input(model, &ctx, event, out);
        }
    }

    if model.cursor() != before {
        for handler in CHAIN.iter() {
            handler.on_selection_change(model, &ctx, out);
        }
    }
}
