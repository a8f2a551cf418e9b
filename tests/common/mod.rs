//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use blockpad::config::EditorConfig;
use blockpad::keymap::{parse_script, KeyCode, Keystroke, ScriptStep};
use blockpad::messages::Msg;
use blockpad::model::{BlockId, BlockKind, CursorPosition, EditorModel};
use blockpad::update::update;

/// Config with no guard window so input reaches the ghost engine at once
pub fn test_config() -> EditorConfig {
    let mut config = EditorConfig::default();
    config.ghost.guard_ms = 0;
    config
}

/// Create a test model from markdown, caret at the start of the first block
pub fn test_model(raw: &str) -> EditorModel {
    EditorModel::from_markdown(raw, test_config())
}

/// Create a test model with the caret at (block index, char offset)
pub fn test_model_at(raw: &str, block_index: usize, offset: usize) -> EditorModel {
    let mut model = test_model(raw);
    let id = block_id(&model, block_index);
    model.set_cursor(id, offset);
    model
}

pub fn block_id(model: &EditorModel, index: usize) -> BlockId {
    model.document.blocks()[index].id
}

/// (kind, text) of every block, in order
pub fn blocks(model: &EditorModel) -> Vec<(BlockKind, String)> {
    model
        .document
        .blocks()
        .iter()
        .map(|b| (b.kind, b.text.clone()))
        .collect()
}

/// Cursor as (block index, offset)
pub fn cursor_at(model: &EditorModel) -> Option<(usize, usize)> {
    let CursorPosition { block_id, offset } = model.cursor()?;
    Some((model.document.index_of(block_id)?, offset))
}

pub fn press(model: &mut EditorModel, key: KeyCode) {
    update(model, Msg::key(Keystroke::key(key)));
}

/// Type each char as a separate keystroke
pub fn type_text(model: &mut EditorModel, text: &str) {
    for ch in text.chars() {
        update(model, Msg::type_char(ch));
    }
}

/// Run the keystroke steps of a key script directly through `update`
pub fn run_keys(model: &mut EditorModel, script: &str) {
    for step in parse_script(script).unwrap() {
        match step {
            ScriptStep::Key(key) => {
                update(model, Msg::key(key));
            }
            other => panic!("run_keys only handles keys, got {:?}", other),
        }
    }
}
