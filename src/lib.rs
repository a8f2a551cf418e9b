//! Blockpad - Elm-style block editor core
//!
//! This crate provides the editing state machine for a block-structured
//! document: the block model, a visual tree with cursor save/restore, the
//! line transformer, the slash menu and streamed ghost-text completions,
//! arbitrated by a fixed-priority keystroke dispatcher.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod ghost;
pub mod keymap;
pub mod markdown;
pub mod messages;
pub mod model;
pub mod runtime;
pub mod slash;
pub mod tracing;
pub mod transform;
pub mod tree;
pub mod update;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::EditorConfig;
pub use messages::Msg;
pub use model::EditorModel;
pub use runtime::Session;
