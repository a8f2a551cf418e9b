//! Tracing setup and state snapshots for development diagnostics
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=ghost=debug,slash=debug` - scoped filtering by target
//! - `RUST_LOG=blockpad::transform=debug` - module-level filtering
//!
//! Targets used across the crate: `message`, `cursor`, `tree`, `transform`,
//! `slash`, `ghost`, `dispatch`, `session`.
//!
//! # Log Files
//!
//! Logs are written to `~/.config/blockpad/logs/blockpad.log` with daily
//! rotation, always at debug level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config_paths::LOG_FILE_PREFIX;
use crate::ghost::GhostStatus;
use crate::model::{CursorPosition, EditorModel};

/// Initialize tracing with a console layer and, optionally, a file layer
///
/// The console goes to stderr so document output on stdout stays clean.
/// Safe to call once per process; later calls are ignored.
pub fn init(log_to_file: bool) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = if log_to_file {
        match crate::config_paths::ensure_logs_dir() {
            Ok(logs_dir) => {
                let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
                Some(
                    fmt::layer()
                        .with_writer(file_appender)
                        .with_ansi(false)
                        .with_target(true)
                        .with_line_number(true)
                        .with_filter(EnvFilter::new("debug")),
                )
            }
            Err(e) => {
                eprintln!("Warning: Could not initialize file logging: {}", e);
                None
            }
        }
    } else {
        None
    };

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Lightweight snapshot of editing state for diffing across an update
#[derive(Debug, Clone, PartialEq)]
pub struct CursorSnapshot {
    pub cursor: Option<CursorPosition>,
    pub block_count: usize,
    pub generation: u32,
    pub slash_open: bool,
    pub ghost: GhostStatus,
}

impl CursorSnapshot {
    pub fn from_model(model: &EditorModel) -> Self {
        Self {
            cursor: model.cursor(),
            block_count: model.document.len(),
            generation: model.tree.generation(),
            slash_open: model.slash.is_open(),
            ghost: model.ghost.status(),
        }
    }

    /// Describe what changed between two snapshots
    pub fn diff(&self, other: &CursorSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        if self.cursor != other.cursor {
            let show = |c: &Option<CursorPosition>| {
                c.map(|c| c.to_string()).unwrap_or_else(|| "none".into())
            };
            changes.push(format!(
                "cursor: {} → {}",
                show(&self.cursor),
                show(&other.cursor)
            ));
        }
        if self.block_count != other.block_count {
            changes.push(format!(
                "blocks: {} → {}",
                self.block_count, other.block_count
            ));
        }
        if self.generation != other.generation {
            changes.push(format!("reconciled (gen {})", other.generation));
        }
        if self.slash_open != other.slash_open {
            let status = if other.slash_open { "opened" } else { "closed" };
            changes.push(format!("slash {}", status));
        }
        if self.ghost != other.ghost {
            changes.push(format!("ghost: {:?} → {:?}", self.ghost, other.ghost));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
