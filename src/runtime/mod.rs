//! Runtime module - drives an `EditorModel` outside of tests
//!
//! - `session` - command execution and completion worker threads

pub mod session;

pub use session::{Session, DEFAULT_WAIT};
