//! Configuration system tests
//!
//! Tests for config paths and loading/saving the editor config.

use blockpad::config::{EditorConfig, GhostConfig};
use blockpad::config_paths;
use tempfile::TempDir;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_file_lives_in_app_dir() {
    if let Some(file) = config_paths::config_file() {
        assert!(file.ends_with("blockpad/config.yaml"));
    }
}

#[test]
fn test_logs_dir_is_under_config_dir() {
    if let (Some(dir), Some(logs)) = (config_paths::config_dir(), config_paths::logs_dir()) {
        assert!(logs.starts_with(&dir));
    }
}

// ========================================================================
// EditorConfig Tests
// ========================================================================

#[test]
fn test_defaults() {
    let ghost = GhostConfig::default();
    assert_eq!(ghost.min_text_length, 10);
    assert_eq!(ghost.context_length, 500);
    assert_eq!(ghost.guard_ms, 100);
    assert_eq!(ghost.max_tokens, 100);
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let mut config = EditorConfig::default();
    config.ghost.context_length = 120;
    config.ghost.model = "local-model".to_string();
    config.save_to(&path).unwrap();

    assert_eq!(EditorConfig::load_from(&path), config);
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = EditorConfig::load_from(&dir.path().join("absent.yaml"));
    assert_eq!(config, EditorConfig::default());
}

#[test]
fn test_malformed_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "ghost: [this is: not a map").unwrap();
    assert_eq!(EditorConfig::load_from(&path), EditorConfig::default());
}

#[test]
fn test_partial_file_fills_in_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "ghost:\n  min_text_length: 3\n").unwrap();

    let config = EditorConfig::load_from(&path);
    assert_eq!(config.ghost.min_text_length, 3);
    assert_eq!(config.ghost.context_length, 500);
    assert_eq!(config.ghost.api_base, "https://api.openai.com/v1");
}

#[test]
fn test_empty_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "{}\n").unwrap();
    assert_eq!(EditorConfig::load_from(&path), EditorConfig::default());
}
