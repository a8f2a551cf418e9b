//! Update functions for the Elm-style architecture
//!
//! All state transformations flow through these functions.

mod app;
pub mod dispatch;
mod editing;
mod ghost;
mod line;
mod slash;

use crate::commands::Cmd;
use crate::messages::{AppMsg, Msg};
use crate::model::EditorModel;

#[cfg(debug_assertions)]
use crate::tracing::CursorSnapshot;
#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

pub use app::update_app;
pub use dispatch::{dispatch_key, InputEvent, KeyHandler, CHAIN};
pub use editing::update_editor;
pub use ghost::update_ghost;
pub use slash::update_slash;

/// Main update function - dispatches to sub-handlers
///
/// In debug builds, this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn update(model: &mut EditorModel, msg: Msg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(model, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(model, msg)
    }
}

/// Inner update logic (no tracing)
fn update_inner(model: &mut EditorModel, msg: Msg) -> Option<Cmd> {
    // Once unmounted, only a fresh load brings the editor back
    if !model.ui.mounted && !matches!(msg, Msg::App(AppMsg::LoadMarkdown(_))) {
        return None;
    }

    match msg {
        Msg::Key(key) => dispatch::dispatch_key(model, key),
        Msg::Editor(m) => editing::update_editor(model, m),
        Msg::Slash(m) => slash::update_slash(model, m),
        Msg::Ghost(m) => ghost::update_ghost(model, m),
        Msg::App(m) => app::update_app(model, m),
    }
}

/// Traced update wrapper (debug builds only)
///
/// Captures before/after state, logs the diff and checks invariants.
/// Stream chunks are too frequent to log individually.
#[cfg(debug_assertions)]
fn update_traced(model: &mut EditorModel, msg: Msg) -> Option<Cmd> {
    let is_noisy = msg.is_stream_event();

    let msg_name = msg_type_name(&msg);
    let _span = if is_noisy {
        None
    } else {
        Some(span!(Level::DEBUG, "update", msg = %msg_name).entered())
    };

    let before = CursorSnapshot::from_model(model);

    if !is_noisy {
        debug!(target: "message", msg = %msg_name, "processing");
    }

    let result = update_inner(model, msg);

    let after = CursorSnapshot::from_model(model);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "cursor", %diff, "state changed");
    }

    model.assert_invariants_with_context(&msg_name);

    result
}

/// Get a display name for a message type
///
/// Example outputs:
/// - `Key(Shift+Enter)`
/// - `Ghost::Chunk { request_id: RequestId(1), text: "..." }`
/// - `App::Unmount`
#[cfg(debug_assertions)]
fn msg_type_name(msg: &Msg) -> String {
    match msg {
        Msg::Key(k) => format!("Key({})", k),
        Msg::Editor(m) => format!("Editor::{:?}", m),
        Msg::Slash(m) => format!("Slash::{:?}", m),
        Msg::Ghost(m) => format!("Ghost::{:?}", m),
        Msg::App(m) => format!("App::{:?}", m),
    }
}
