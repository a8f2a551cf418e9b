//! Ghost text: a streamed, non-editable completion overlay
//!
//! The engine is a small state machine keyed by monotonically increasing
//! request ids. Stream deliveries carry their request id and are dropped
//! unless it matches the live request, so a cancelled or superseded stream
//! can never resurrect an overlay. The engine writes only its own overlay
//! node in the visual tree; accepting hands the text back to the caller,
//! which owns the document.

pub mod provider;

use std::fmt;
use std::time::{Duration, Instant};

use crate::model::CursorPosition;
use crate::tree::{OverlayHandle, VisualTree};

pub use provider::{
    CancelFlag, CompletionProvider, CompletionRequest, OpenAiProvider, ScriptedProvider,
};

/// Identity of one completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostStatus {
    Idle,
    Requesting,
    Streaming,
    Complete,
    Accepted,
    Rejected,
    Cancelled,
}

impl GhostStatus {
    /// Requesting, streaming or complete: a suggestion owns the overlay slot
    #[inline]
    pub fn is_live(self) -> bool {
        matches!(
            self,
            GhostStatus::Requesting | GhostStatus::Streaming | GhostStatus::Complete
        )
    }
}

/// Suggestion text handed back on accept, to be written into the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedText {
    pub request_id: RequestId,
    pub anchor: CursorPosition,
    pub text: String,
}

/// The most recent `max_chars` chars of `text`
pub fn trailing_window(text: &str, max_chars: usize) -> &str {
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }
    let skip = crate::model::byte_index(text, total - max_chars);
    &text[skip..]
}

#[derive(Debug)]
pub struct GhostEngine {
    status: GhostStatus,
    last_issued: u64,
    current: Option<RequestId>,
    prompt: String,
    streamed: String,
    anchor: Option<CursorPosition>,
    overlay: Option<OverlayHandle>,
    /// Live text of the anchor block as last observed by the engine
    snapshot: Option<String>,
    shown_at: Option<Instant>,
    guard: Duration,
    last_error: Option<String>,
}

impl GhostEngine {
    pub fn new(guard: Duration) -> Self {
        Self {
            status: GhostStatus::Idle,
            last_issued: 0,
            current: None,
            prompt: String::new(),
            streamed: String::new(),
            anchor: None,
            overlay: None,
            snapshot: None,
            shown_at: None,
            guard,
            last_error: None,
        }
    }

    #[inline]
    pub fn status(&self) -> GhostStatus {
        self.status
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    pub fn current_request(&self) -> Option<RequestId> {
        self.current
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Running total of everything streamed for the current request
    pub fn streamed_text(&self) -> &str {
        &self.streamed
    }

    pub fn anchor(&self) -> Option<CursorPosition> {
        self.anchor
    }

    pub fn overlay(&self) -> Option<OverlayHandle> {
        self.overlay
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// A suggestion is visible and Tab would accept it
    pub fn has_suggestion(&self) -> bool {
        matches!(self.status, GhostStatus::Streaming | GhostStatus::Complete)
            && !self.streamed.is_empty()
    }

    /// Whether a delivery for `id` may still touch engine state
    pub fn is_current(&self, id: RequestId) -> bool {
        self.current == Some(id) && self.is_live()
    }

    /// Start a new request at `anchor`, cancelling any live one first
    ///
    /// Returns the superseded request (if any) and the new request id.
    pub fn begin(
        &mut self,
        tree: &mut VisualTree,
        anchor: CursorPosition,
        prompt: String,
    ) -> (Option<RequestId>, RequestId) {
        let superseded = self.cancel(tree);

        self.last_issued += 1;
        let id = RequestId(self.last_issued);
        self.current = Some(id);
        self.status = GhostStatus::Requesting;
        self.prompt = prompt;
        self.streamed.clear();
        self.anchor = Some(anchor);
        self.snapshot = tree.live_text(anchor.block_id);
        self.shown_at = None;
        self.last_error = None;

        tracing::debug!(
            target: "ghost",
            request = %id,
            anchor = %anchor,
            prompt_chars = self.prompt.chars().count(),
            "completion requested"
        );
        (superseded, id)
    }

    /// Apply a streamed delta; the overlay text is replaced wholesale with
    /// the running total
    pub fn apply_chunk(&mut self, tree: &mut VisualTree, id: RequestId, delta: &str) -> bool {
        if !self.is_current(id) {
            tracing::debug!(target: "ghost", request = %id, "dropping stale chunk");
            return false;
        }
        self.streamed.push_str(delta);
        if self.streamed.is_empty() {
            return true;
        }

        if self.overlay.is_none() {
            let Some(anchor) = self.anchor else {
                return false;
            };
            let Some(handle) = tree.attach_overlay(anchor.block_id, anchor.offset) else {
                tracing::warn!(target: "ghost", request = %id, anchor = %anchor, "overlay anchor is gone");
                return false;
            };
            self.overlay = Some(handle);
            self.shown_at = Some(Instant::now());
            self.snapshot = tree.live_text(anchor.block_id);
        }

        if let Some(handle) = self.overlay {
            tree.set_overlay_text(&handle, &self.streamed);
        }
        self.status = GhostStatus::Streaming;
        true
    }

    /// The stream for `id` ended; an empty stream returns to idle
    pub fn finish(&mut self, tree: &mut VisualTree, id: RequestId) -> bool {
        if !self.is_current(id) {
            tracing::debug!(target: "ghost", request = %id, "dropping stale finish");
            return false;
        }
        if self.streamed.is_empty() {
            self.detach(tree);
            self.status = GhostStatus::Idle;
            tracing::debug!(target: "ghost", request = %id, "empty completion");
        } else {
            self.status = GhostStatus::Complete;
            tracing::debug!(
                target: "ghost",
                request = %id,
                chars = self.streamed.chars().count(),
                "completion complete"
            );
        }
        true
    }

    /// The stream for `id` failed: reject and remember the error
    pub fn fail(&mut self, tree: &mut VisualTree, id: RequestId, error: &str) -> bool {
        if !self.is_current(id) {
            tracing::debug!(target: "ghost", request = %id, "dropping stale failure");
            return false;
        }
        self.detach(tree);
        self.status = GhostStatus::Rejected;
        self.last_error = Some(error.to_string());
        tracing::warn!(target: "ghost", request = %id, %error, "completion failed");
        true
    }

    /// Convert the visible suggestion into text for the document
    ///
    /// Only what has streamed so far is accepted.
    pub fn accept(&mut self, tree: &mut VisualTree) -> Option<AcceptedText> {
        if !self.has_suggestion() {
            return None;
        }
        let request_id = self.current?;
        let anchor = self.anchor?;
        self.detach(tree);
        self.status = GhostStatus::Accepted;
        tracing::debug!(target: "ghost", request = %request_id, "suggestion accepted");
        Some(AcceptedText {
            request_id,
            anchor,
            text: std::mem::take(&mut self.streamed),
        })
    }

    /// Discard the live suggestion
    ///
    /// A suggestion still waiting for its first chunk ends up cancelled
    /// rather than rejected. Returns the request to stop.
    pub fn reject(&mut self, tree: &mut VisualTree) -> Option<RequestId> {
        if !self.is_live() {
            return None;
        }
        let id = self.current?;
        self.detach(tree);
        self.status = if self.status == GhostStatus::Requesting {
            GhostStatus::Cancelled
        } else {
            GhostStatus::Rejected
        };
        self.streamed.clear();
        tracing::debug!(target: "ghost", request = %id, status = ?self.status, "suggestion discarded");
        Some(id)
    }

    /// Cancel the live suggestion (superseded, reconciled away, unmounted)
    pub fn cancel(&mut self, tree: &mut VisualTree) -> Option<RequestId> {
        if !self.is_live() {
            return None;
        }
        let id = self.current?;
        self.detach(tree);
        self.status = GhostStatus::Cancelled;
        self.streamed.clear();
        tracing::debug!(target: "ghost", request = %id, "suggestion cancelled");
        Some(id)
    }

    /// React to an input event: reject only when the anchor block's live
    /// text differs from the last snapshot and the guard window is over
    pub fn observe_input(&mut self, tree: &mut VisualTree, now: Instant) -> Option<RequestId> {
        if !self.is_live() {
            return None;
        }
        if let Some(shown_at) = self.shown_at {
            if now.saturating_duration_since(shown_at) < self.guard {
                return None;
            }
        }
        let anchor = self.anchor?;
        let live = tree.live_text(anchor.block_id);
        if live == self.snapshot {
            return None;
        }
        self.reject(tree)
    }

    fn detach(&mut self, tree: &mut VisualTree) {
        if let Some(handle) = self.overlay.take() {
            tree.detach_overlay(&handle);
        }
        self.shown_at = None;
    }
}

impl Default for GhostEngine {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
