//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use crate::ghost::RequestId;
use crate::keymap::Keystroke;
use crate::model::BlockId;

/// Editor input other than keystrokes
#[derive(Debug, Clone)]
pub enum EditorMsg {
    /// Insert text at the caret without a keystroke (paste, IME commit)
    InsertText(String),
    /// Pointer click placing the caret in a block
    ClickBlock { block_id: BlockId, offset: usize },
    /// Pointer press outside the editor surface
    ClickOutside,
}

/// Slash-menu messages that do not come from the keyboard
#[derive(Debug, Clone)]
pub enum SlashMsg {
    /// Pointer pick of a visible candidate; ignores the keyboard selection
    Pick(usize),
    /// Close the menu without executing
    Close,
}

/// Ghost-text lifecycle messages
#[derive(Debug, Clone)]
pub enum GhostMsg {
    /// Start a new completion, cancelling any live one
    Trigger,
    /// Streamed delta for a request
    Chunk { request_id: RequestId, text: String },
    /// The stream for a request ended normally
    Finished { request_id: RequestId },
    /// The stream for a request failed
    Failed { request_id: RequestId, error: String },
    /// Accept the live suggestion into the document
    Accept,
    /// Discard the live suggestion
    Reject,
}

/// Session lifecycle messages
#[derive(Debug, Clone)]
pub enum AppMsg {
    /// Replace the document with parsed markdown
    LoadMarkdown(String),
    /// Tear down: cancel in-flight work and release transient state
    Unmount,
}

/// Top-level message type
#[derive(Debug, Clone)]
pub enum Msg {
    /// A keydown routed through the dispatcher
    Key(Keystroke),
    Editor(EditorMsg),
    Slash(SlashMsg),
    Ghost(GhostMsg),
    App(AppMsg),
}

impl Msg {
    /// Create a keystroke message
    pub fn key(stroke: Keystroke) -> Self {
        Msg::Key(stroke)
    }

    /// Create a message typing one character
    pub fn type_char(ch: char) -> Self {
        Msg::Key(Keystroke::char(ch))
    }

    /// Create a non-keyboard text insertion message
    pub fn insert_text(text: impl Into<String>) -> Self {
        Msg::Editor(EditorMsg::InsertText(text.into()))
    }

    /// Whether this message is a stream delivery from a worker thread
    pub fn is_stream_event(&self) -> bool {
        matches!(
            self,
            Msg::Ghost(GhostMsg::Chunk { .. } | GhostMsg::Finished { .. } | GhostMsg::Failed { .. })
        )
    }
}
