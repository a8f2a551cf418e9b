//! Ghost-text tests - streaming, acceptance, rejection and stale deliveries

mod common;

use blockpad::commands::Cmd;
use blockpad::ghost::{GhostStatus, RequestId};
use blockpad::keymap::{KeyCode, Keystroke};
use blockpad::messages::{GhostMsg, Msg};
use blockpad::model::EditorModel;
use blockpad::update::update;
use common::{press, test_config, test_model_at, type_text};

const TEXT: &str = "The quick brown fox";

fn model() -> EditorModel {
    test_model_at(TEXT, 0, TEXT.len())
}

fn chunk(model: &mut EditorModel, id: u64, text: &str) -> Option<Cmd> {
    update(
        model,
        Msg::Ghost(GhostMsg::Chunk {
            request_id: RequestId(id),
            text: text.to_string(),
        }),
    )
}

fn overlay_text(model: &EditorModel) -> Option<String> {
    let handle = model.ghost.overlay()?;
    model.tree.overlay_text(&handle).map(str::to_string)
}

#[test]
fn test_tab_requests_then_chunks_stream_into_overlay() {
    let mut model = model();
    let cmd = update(&mut model, Msg::key(Keystroke::key(KeyCode::Tab)));
    assert_eq!(
        cmd,
        Some(Cmd::Batch(vec![
            Cmd::RequestCompletion {
                request_id: RequestId(1),
                prompt: TEXT.to_string(),
            },
            Cmd::Redraw,
        ]))
    );
    assert_eq!(model.ghost.status(), GhostStatus::Requesting);
    assert!(!model.tree.has_overlay());

    chunk(&mut model, 1, " jumps");
    chunk(&mut model, 1, " over");
    assert_eq!(model.ghost.status(), GhostStatus::Streaming);
    assert_eq!(overlay_text(&model).as_deref(), Some(" jumps over"));
}

#[test]
fn test_overlay_never_reaches_the_document() {
    let mut model = model();
    press(&mut model, KeyCode::Tab);
    chunk(&mut model, 1, " jumps");

    assert_eq!(model.document.to_markdown(), TEXT);
    assert_eq!(model.document.to_html(), "<p data-block-id=\"block-1\">The quick brown fox</p>");
    assert_eq!(model.document.text_len(), TEXT.len());
    assert_eq!(model.tree.live_text(model.document.blocks()[0].id).as_deref(), Some(TEXT));
}

#[test]
fn test_finish_marks_complete() {
    let mut model = model();
    press(&mut model, KeyCode::Tab);
    chunk(&mut model, 1, " jumps");
    update(
        &mut model,
        Msg::Ghost(GhostMsg::Finished {
            request_id: RequestId(1),
        }),
    );
    assert_eq!(model.ghost.status(), GhostStatus::Complete);
    assert!(model.tree.has_overlay());
}

#[test]
fn test_empty_stream_returns_to_idle() {
    let mut model = model();
    press(&mut model, KeyCode::Tab);
    update(
        &mut model,
        Msg::Ghost(GhostMsg::Finished {
            request_id: RequestId(1),
        }),
    );
    assert_eq!(model.ghost.status(), GhostStatus::Idle);
    assert!(!model.tree.has_overlay());
}

#[test]
fn test_second_trigger_supersedes_first() {
    let mut model = model();
    press(&mut model, KeyCode::Tab);
    chunk(&mut model, 1, " jumps");

    let cmd = update(&mut model, Msg::Ghost(GhostMsg::Trigger));
    assert_eq!(
        cmd,
        Some(Cmd::Batch(vec![
            Cmd::CancelCompletion {
                request_id: RequestId(1)
            },
            Cmd::RequestCompletion {
                request_id: RequestId(2),
                prompt: TEXT.to_string(),
            },
            Cmd::Redraw,
        ]))
    );
    assert!(!model.tree.has_overlay());

    // Late deliveries from the superseded stream are dropped
    assert_eq!(chunk(&mut model, 1, " over"), None);
    assert!(!model.tree.has_overlay());

    chunk(&mut model, 2, " leaps");
    assert_eq!(overlay_text(&model).as_deref(), Some(" leaps"));
}

#[test]
fn test_tab_while_requesting_is_consumed_without_effect() {
    let mut model = model();
    press(&mut model, KeyCode::Tab);
    assert_eq!(
        update(&mut model, Msg::key(Keystroke::key(KeyCode::Tab))),
        None
    );
    assert_eq!(model.ghost.current_request(), Some(RequestId(1)));
    assert_eq!(model.document.to_markdown(), TEXT);
}

#[test]
fn test_accept_mid_stream_takes_partial_text() {
    let mut model = model();
    press(&mut model, KeyCode::Tab);
    chunk(&mut model, 1, " jum");
    press(&mut model, KeyCode::Tab);

    assert_eq!(model.document.to_markdown(), "The quick brown fox jum");
    assert_eq!(model.ghost.status(), GhostStatus::Accepted);
    assert_eq!(common::cursor_at(&model), Some((0, 23)));

    // The rest of the stream arrives after acceptance and is ignored
    assert_eq!(chunk(&mut model, 1, "ps"), None);
    assert_eq!(model.document.to_markdown(), "The quick brown fox jum");
    assert!(!model.tree.has_overlay());
}

#[test]
fn test_typing_rejects_and_still_types() {
    let mut model = model();
    press(&mut model, KeyCode::Tab);
    chunk(&mut model, 1, " jumps");
    type_text(&mut model, "!");

    assert_eq!(model.ghost.status(), GhostStatus::Rejected);
    assert!(!model.tree.has_overlay());
    assert_eq!(model.document.to_markdown(), "The quick brown fox!");
}

#[test]
fn test_escape_rejects_without_touching_text() {
    let mut model = model();
    press(&mut model, KeyCode::Tab);
    chunk(&mut model, 1, " jumps");
    press(&mut model, KeyCode::Escape);

    assert_eq!(model.ghost.status(), GhostStatus::Rejected);
    assert!(!model.tree.has_overlay());
    assert_eq!(model.document.to_markdown(), TEXT);
}

#[test]
fn test_escape_before_first_chunk_cancels() {
    let mut model = model();
    press(&mut model, KeyCode::Tab);
    press(&mut model, KeyCode::Escape);
    assert_eq!(model.ghost.status(), GhostStatus::Cancelled);
}

#[test]
fn test_structural_rebuild_cancels_suggestion() {
    let mut model = model();
    press(&mut model, KeyCode::Tab);
    chunk(&mut model, 1, " jumps");

    let cmd = model.reconcile(None);
    assert_eq!(
        cmd,
        Cmd::Batch(vec![
            Cmd::CancelCompletion {
                request_id: RequestId(1)
            },
            Cmd::Redraw,
        ])
    );
    assert_eq!(model.ghost.status(), GhostStatus::Cancelled);
    assert!(!model.tree.has_overlay());
}

#[test]
fn test_failure_reports_and_leaves_text() {
    let mut model = model();
    press(&mut model, KeyCode::Tab);
    chunk(&mut model, 1, " ju");
    update(
        &mut model,
        Msg::Ghost(GhostMsg::Failed {
            request_id: RequestId(1),
            error: "connection reset".to_string(),
        }),
    );

    assert_eq!(model.ghost.status(), GhostStatus::Rejected);
    assert_eq!(model.ghost.last_error(), Some("connection reset"));
    assert!(!model.tree.has_overlay());
    assert_eq!(model.document.to_markdown(), TEXT);
    assert!(model.ui.status_message.is_some());
}

#[test]
fn test_input_inside_guard_window_keeps_suggestion() {
    let mut config = test_config();
    config.ghost.guard_ms = 60_000;
    let mut model = EditorModel::from_markdown(TEXT, config);
    let id = model.document.blocks()[0].id;
    model.set_cursor(id, TEXT.len());

    press(&mut model, KeyCode::Tab);
    chunk(&mut model, 1, " jumps");
    update(&mut model, Msg::insert_text("!"));

    assert_eq!(model.ghost.status(), GhostStatus::Streaming);
    assert!(model.tree.has_overlay());
}

#[test]
fn test_input_after_guard_window_rejects() {
    let mut model = model();
    press(&mut model, KeyCode::Tab);
    chunk(&mut model, 1, " jumps");
    update(&mut model, Msg::insert_text("!"));

    assert_eq!(model.ghost.status(), GhostStatus::Rejected);
    assert!(!model.tree.has_overlay());
    assert_eq!(model.document.to_markdown(), "The quick brown fox!");
}
