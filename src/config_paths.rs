//! Where blockpad keeps its ghost-text settings and daily logs
//!
//! `config.yaml` and the `logs/` directory share one base directory,
//! `$XDG_CONFIG_HOME/blockpad` (or `~/.config/blockpad`) on Unix and
//! `%APPDATA%\blockpad` on Windows.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const APP_DIR: &str = "blockpad";
const CONFIG_FILE: &str = "config.yaml";
const LOGS_DIR: &str = "logs";

/// Prefix of the daily-rotated log files
pub const LOG_FILE_PREFIX: &str = "blockpad.log";

/// Pick the base directory from an explicit config root or the home directory
fn base_dir(config_root: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    config_root
        .filter(|root| !root.as_os_str().is_empty())
        .or_else(|| home.map(|home| home.join(".config")))
        .map(|root| root.join(APP_DIR))
}

pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let root = std::env::var_os("APPDATA").map(PathBuf::from);
    #[cfg(not(target_os = "windows"))]
    let root = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);

    base_dir(root, dirs::home_dir())
}

/// Ghost-text settings read at startup and written by `--init-config`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(LOGS_DIR))
}

/// Create the log directory for the file appender
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir().context("no home or config directory for log files")?;
    create(&logs)?;
    Ok(logs)
}

fn create(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))
}
