//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after an update.

use crate::ghost::RequestId;

/// Commands returned by update functions
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// The visual tree changed and should be repainted
    Redraw,
    /// Start streaming a completion for `prompt`
    /// Chunks come back as `Msg::Ghost(GhostMsg::Chunk)`
    RequestCompletion { request_id: RequestId, prompt: String },
    /// Tell an in-flight completion to stop producing chunks
    CancelCompletion { request_id: RequestId },
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands, flattening trivial cases
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| *c != Cmd::None).collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.remove(0),
            _ => Cmd::Batch(cmds),
        }
    }

    /// Check if this command requires a redraw
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::None => false,
            Cmd::Redraw => true,
            // Stream commands redraw when their chunks arrive
            Cmd::RequestCompletion { .. } => false,
            Cmd::CancelCompletion { .. } => false,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_redraw()),
        }
    }

    /// Convert to Option, mapping Cmd::None to None
    pub fn into_option(self) -> Option<Cmd> {
        match self {
            Cmd::None => None,
            cmd => Some(cmd),
        }
    }
}

// Allow converting Option<Cmd> to Cmd
impl From<Option<Cmd>> for Cmd {
    fn from(opt: Option<Cmd>) -> Self {
        opt.unwrap_or(Cmd::None)
    }
}
