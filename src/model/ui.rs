//! UI state - status messages shown next to the document

/// UI state owned by the editing session, never part of the document
#[derive(Debug, Clone)]
pub struct UiState {
    /// User-visible message (completion failures land here)
    pub status_message: Option<String>,
    /// Whether the editor is mounted; handlers ignore input once unmounted
    pub mounted: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            status_message: None,
            mounted: true,
        }
    }

    /// Set the status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
