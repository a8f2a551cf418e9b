//! Keyboard input: keystroke types, the focus context passed to key
//! interpreters, and the key-script format used by the CLI and tests

mod context;
mod script;
mod types;

pub use context::FocusContext;
pub use script::{load_script_file, parse_keystroke, parse_script, KeymapError, ScriptStep};
pub use types::{KeyCode, Keystroke, Modifiers};
