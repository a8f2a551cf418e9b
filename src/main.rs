//! blockpad - replay keystrokes against a block document
//!
//! Loads a markdown file (or an empty paragraph), runs a key script through
//! the editing session and prints the resulting document.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use blockpad::cli::{CliArgs, OutputFormat, ProviderChoice, ScriptSource, StartupConfig};
use blockpad::config::EditorConfig;
use blockpad::ghost::{CompletionProvider, OpenAiProvider, ScriptedProvider};
use blockpad::keymap::{load_script_file, parse_script, ScriptStep};
use blockpad::markdown;
use blockpad::model::EditorModel;
use blockpad::runtime::Session;

fn main() -> Result<()> {
    let startup = CliArgs::parse().into_config().map_err(|e| anyhow!(e))?;
    blockpad::tracing::init(startup.log_to_file);

    if startup.init_config {
        return init_config();
    }

    let config = EditorConfig::load();
    let raw = match &startup.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => String::new(),
    };

    let provider = build_provider(&startup, &config)?;
    let steps = load_steps(&startup.script)?;
    tracing::info!(steps = steps.len(), "replaying key script");

    let mut session = Session::new(EditorModel::from_markdown(&raw, config), provider);
    session.run_script(&steps)?;

    println!("{}", render_output(session.model(), startup.format)?);
    if let Some(status) = &session.model().ui.status_message {
        eprintln!("{}", status);
    }

    session.unmount();
    Ok(())
}

fn init_config() -> Result<()> {
    let path = blockpad::config_paths::config_file()
        .ok_or_else(|| anyhow!("No config directory available"))?;
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    EditorConfig::default().save().map_err(|e| anyhow!(e))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn build_provider(
    startup: &StartupConfig,
    config: &EditorConfig,
) -> Result<Arc<dyn CompletionProvider>> {
    Ok(match &startup.provider {
        ProviderChoice::Offline { suggestion } => Arc::new(ScriptedProvider::from_text(suggestion)),
        ProviderChoice::OpenAi => Arc::new(OpenAiProvider::new(
            config.ghost.clone(),
            EditorConfig::api_key(),
        )?),
    })
}

fn load_steps(source: &ScriptSource) -> Result<Vec<ScriptStep>> {
    Ok(match source {
        ScriptSource::None => Vec::new(),
        ScriptSource::Inline(script) => parse_script(script)?,
        ScriptSource::File(path) => load_script_file(path)?,
    })
}

fn render_output(model: &EditorModel, format: OutputFormat) -> Result<String> {
    let doc = &model.document;
    Ok(match format {
        OutputFormat::Markdown => doc.to_markdown(),
        OutputFormat::Html => doc.to_html(),
        OutputFormat::Preview => markdown::preview_document(&doc.to_markdown()),
        OutputFormat::Tree => model.tree.dump(),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "blocks": doc.blocks(),
                "cursor": model.cursor(),
                "stats": doc.stats(),
                "slash": {
                    "open": model.slash.is_open(),
                    "query": model.slash.query,
                },
                "ghost": {
                    "status": format!("{:?}", model.ghost.status()),
                    "text": model.ghost.streamed_text(),
                    "error": model.ghost.last_error(),
                },
            });
            serde_json::to_string_pretty(&value)?
        }
    })
}
