//! Ghost-text interpreter and stream message handling

use std::time::Instant;

use crate::commands::Cmd;
use crate::ghost::trailing_window;
use crate::keymap::{FocusContext, KeyCode, Keystroke};
use crate::messages::GhostMsg;
use crate::model::EditorModel;

use super::dispatch::{InputEvent, KeyHandler};

pub struct GhostInterpreter;

impl KeyHandler for GhostInterpreter {
    fn name(&self) -> &'static str {
        "ghost"
    }

    /// Tab triggers or accepts and is always consumed. Escape rejects a live
    /// suggestion. Any other content-modifying key rejects it too but is
    /// passed on so the edit still happens.
    fn on_key(
        &self,
        model: &mut EditorModel,
        _ctx: &FocusContext,
        key: Keystroke,
        out: &mut Vec<Cmd>,
    ) -> bool {
        match key.key {
            KeyCode::Tab if !key.mods.is_chord() => {
                if model.ghost.has_suggestion() {
                    out.extend(accept(model));
                } else if !model.ghost.is_live() {
                    out.extend(trigger(model));
                }
                true
            }
            KeyCode::Escape if model.ghost.is_live() => {
                out.extend(reject(model));
                true
            }
            _ if key.modifies_content() && model.ghost.is_live() => {
                out.extend(reject(model));
                false
            }
            _ => false,
        }
    }

    /// Input reaching the anchor block rejects the suggestion once the guard
    /// window after the overlay appeared has passed
    fn on_input(
        &self,
        model: &mut EditorModel,
        _ctx: &FocusContext,
        _event: &InputEvent,
        out: &mut Vec<Cmd>,
    ) {
        if let Some(request_id) = model.ghost.observe_input(&mut model.tree, Instant::now()) {
            out.push(Cmd::CancelCompletion { request_id });
            out.push(Cmd::Redraw);
        }
    }
}

/// Start a completion for the trailing window of the document
///
/// Any live request is cancelled first. Documents shorter than the
/// configured minimum are left alone.
pub fn trigger(model: &mut EditorModel) -> Option<Cmd> {
    let settings = &model.config.ghost;
    let text = model.document.plain_text();
    let len = text.chars().count();
    if len < settings.min_text_length {
        tracing::debug!(target: "ghost", len, min = settings.min_text_length, "too little text to complete");
        return None;
    }
    let prompt = trailing_window(&text, settings.context_length).to_string();
    let anchor = model.cursor()?;

    let (superseded, request_id) = model.ghost.begin(&mut model.tree, anchor, prompt.clone());
    model.ui.clear_status();

    let cancel = superseded
        .map(|request_id| Cmd::CancelCompletion { request_id })
        .unwrap_or_default();
    Some(Cmd::batch(vec![
        cancel,
        Cmd::RequestCompletion { request_id, prompt },
        Cmd::Redraw,
    ]))
}

/// Write the streamed-so-far text into the anchor block, caret after it
pub fn accept(model: &mut EditorModel) -> Option<Cmd> {
    let accepted = model.ghost.accept(&mut model.tree)?;
    let anchor = accepted.anchor;
    let block = model.document.get(anchor.block_id)?;

    let inserted = if block.kind.allows_line_breaks() {
        accepted.text.clone()
    } else {
        accepted.text.replace('\n', " ")
    };
    let anchor = anchor.clamped(block.char_len());
    let split = crate::model::byte_index(&block.text, anchor.offset);
    let updated = format!("{}{}{}", &block.text[..split], inserted, &block.text[split..]);
    let caret = anchor.offset + inserted.chars().count();

    model.edit_text(anchor.block_id, &updated, caret);
    model.slash.close();

    Some(Cmd::batch(vec![
        Cmd::CancelCompletion {
            request_id: accepted.request_id,
        },
        Cmd::Redraw,
    ]))
}

fn reject(model: &mut EditorModel) -> Option<Cmd> {
    let request_id = model.ghost.reject(&mut model.tree)?;
    Some(Cmd::batch(vec![
        Cmd::CancelCompletion { request_id },
        Cmd::Redraw,
    ]))
}

/// Handle ghost lifecycle messages, including stream deliveries
pub fn update_ghost(model: &mut EditorModel, msg: GhostMsg) -> Option<Cmd> {
    match msg {
        GhostMsg::Trigger => trigger(model),
        GhostMsg::Accept => accept(model),
        GhostMsg::Reject => reject(model),
        GhostMsg::Chunk { request_id, text } => model
            .ghost
            .apply_chunk(&mut model.tree, request_id, &text)
            .then_some(Cmd::Redraw),
        GhostMsg::Finished { request_id } => model
            .ghost
            .finish(&mut model.tree, request_id)
            .then_some(Cmd::Redraw),
        GhostMsg::Failed { request_id, error } => {
            if !model.ghost.fail(&mut model.tree, request_id, &error) {
                return None;
            }
            model.ui.set_status(format!("Completion failed: {}", error));
            Some(Cmd::Redraw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::ghost::{GhostStatus, RequestId};

    const TEXT: &str = "The quick brown fox";

    fn model() -> EditorModel {
        let mut model = EditorModel::from_markdown(TEXT, EditorConfig::default());
        let id = model.document.blocks()[0].id;
        model.set_cursor(id, TEXT.len());
        model
    }

    #[test]
    fn test_trigger_requests_trailing_window() {
        let mut m = model();
        m.config.ghost.context_length = 3;
        let cmd = trigger(&mut m).unwrap();
        assert_eq!(
            cmd,
            Cmd::Batch(vec![
                Cmd::RequestCompletion {
                    request_id: RequestId(1),
                    prompt: "fox".to_string()
                },
                Cmd::Redraw
            ])
        );
        assert_eq!(m.ghost.status(), GhostStatus::Requesting);
    }

    #[test]
    fn test_trigger_below_minimum_does_nothing() {
        let mut m = EditorModel::from_markdown("short", EditorConfig::default());
        assert_eq!(trigger(&mut m), None);
        assert_eq!(m.ghost.status(), GhostStatus::Idle);
    }

    #[test]
    fn test_accept_inserts_at_anchor() {
        let mut m = model();
        trigger(&mut m);
        update_ghost(
            &mut m,
            GhostMsg::Chunk {
                request_id: RequestId(1),
                text: " jumps".to_string(),
            },
        );
        accept(&mut m);

        assert_eq!(m.document.blocks()[0].text, "The quick brown fox jumps");
        assert_eq!(m.cursor().map(|c| c.offset), Some(25));
        assert!(!m.tree.has_overlay());
    }

    #[test]
    fn test_failure_sets_status_message() {
        let mut m = model();
        trigger(&mut m);
        update_ghost(
            &mut m,
            GhostMsg::Failed {
                request_id: RequestId(1),
                error: "timeout".to_string(),
            },
        );
        assert_eq!(m.ghost.status(), GhostStatus::Rejected);
        assert_eq!(
            m.ui.status_message.as_deref(),
            Some("Completion failed: timeout")
        );
        assert_eq!(m.document.to_markdown(), TEXT);
    }
}
