//! Command-line argument parsing
//!
//! Supports:
//! - Loading a markdown file (or starting from an empty paragraph)
//! - Replaying a key script inline or from a file
//! - Choosing the output format
//! - Offline completions from a fixed suggestion
//! - Writing a default config file

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Suggestion streamed by `--offline` when none is given
pub const DEFAULT_OFFLINE_SUGGESTION: &str = " This is a ghost-text suggestion.";

/// A block editor core driven from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "blockpad",
    version,
    about = "Replay keystrokes against a block document and print the result"
)]
pub struct CliArgs {
    /// Markdown file to load
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Key script to replay, e.g. "/h1<Enter>Title"
    #[arg(short = 'k', long, value_name = "SCRIPT")]
    pub keys: Option<String>,

    /// Read the key script from a file
    #[arg(long, value_name = "PATH")]
    pub keys_file: Option<PathBuf>,

    /// What to print once the script has run
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,

    /// Stream completions from a fixed suggestion instead of the network
    #[arg(long)]
    pub offline: bool,

    /// Suggestion text for --offline
    #[arg(long, value_name = "TEXT")]
    pub suggestion: Option<String>,

    /// Only log to the console
    #[arg(long)]
    pub no_log_file: bool,

    /// Write the default config file (if none exists) and exit
    #[arg(long)]
    pub init_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Canonical markdown
    Markdown,
    /// Block-tagged HTML
    Html,
    /// Full CommonMark preview page
    Preview,
    /// Blocks, cursor and stats as JSON
    Json,
    /// Visual tree dump
    Tree,
}

/// Where the key script comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    None,
    Inline(String),
    File(PathBuf),
}

/// Which completion provider backs ghost text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderChoice {
    Offline { suggestion: String },
    OpenAi,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub file: Option<PathBuf>,
    pub script: ScriptSource,
    pub format: OutputFormat,
    pub provider: ProviderChoice,
    pub log_to_file: bool,
    pub init_config: bool,
}

impl CliArgs {
    /// Convert parsed CLI args into startup configuration
    pub fn into_config(self) -> Result<StartupConfig, String> {
        let script = match (self.keys, self.keys_file) {
            (Some(_), Some(_)) => {
                return Err("--keys and --keys-file cannot be used together".to_string())
            }
            (Some(inline), None) => ScriptSource::Inline(inline),
            (None, Some(path)) => ScriptSource::File(path),
            (None, None) => ScriptSource::None,
        };

        let provider = match (self.offline, self.suggestion) {
            (true, suggestion) => ProviderChoice::Offline {
                suggestion: suggestion.unwrap_or_else(|| DEFAULT_OFFLINE_SUGGESTION.to_string()),
            },
            (false, Some(_)) => return Err("--suggestion requires --offline".to_string()),
            (false, None) => ProviderChoice::OpenAi,
        };

        Ok(StartupConfig {
            file: self.file,
            script,
            format: self.format,
            provider,
            log_to_file: !self.no_log_file,
            init_config: self.init_config,
        })
    }
}
