//! Key scripts: a compact text form of a keystroke sequence
//!
//! Plain characters type themselves and a newline is Enter. Named keys go
//! in angle brackets with optional `S-`, `C-`, `A-`, `M-` modifier prefixes:
//! `<Enter>`, `<S-Enter>`, `<Tab>`, `<Esc>`, `<BS>`, `<Del>`, `<Up>`,
//! `<Down>`, `<Left>`, `<Right>`, `<Home>`, `<End>`, `<PageUp>`,
//! `<PageDown>`, `<C-a>`, and `<lt>` for a literal `<`. Session steps:
//! `<wait>` (until the pending completion settles), `<wait:MS>`, `<pick:N>`
//! (pointer pick of slash candidate N), `<click-outside>`,
//! `<click:BLOCK:OFFSET>` (block index, char offset).

use std::path::Path;
use std::time::Duration;

use super::types::{KeyCode, Keystroke, Modifiers};

/// One step of a key script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Key(Keystroke),
    /// Drain async results; `None` waits for the pending completion
    Wait(Option<Duration>),
    Pick(usize),
    ClickOutside,
    Click { block_index: usize, offset: usize },
}

/// Errors from reading or parsing key scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeymapError {
    IoError(String),
    ParseError(String),
    InvalidKey(String),
}

impl std::fmt::Display for KeymapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeymapError::IoError(e) => write!(f, "IO error: {}", e),
            KeymapError::ParseError(e) => write!(f, "Parse error: {}", e),
            KeymapError::InvalidKey(k) => write!(f, "Invalid key: {}", k),
        }
    }
}

impl std::error::Error for KeymapError {}

/// Parse a key script into steps
pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>, KeymapError> {
    let mut steps = Vec::new();
    let mut chars = script.chars();

    while let Some(c) = chars.next() {
        match c {
            '<' => {
                let mut token = String::new();
                loop {
                    match chars.next() {
                        Some('>') => break,
                        Some(ch) => token.push(ch),
                        None => {
                            return Err(KeymapError::ParseError(format!(
                                "unterminated <{}",
                                token
                            )))
                        }
                    }
                }
                steps.push(parse_token(&token)?);
            }
            '\n' => steps.push(ScriptStep::Key(Keystroke::key(KeyCode::Enter))),
            '\r' => {}
            c => steps.push(ScriptStep::Key(Keystroke::char(c))),
        }
    }

    Ok(steps)
}

/// Read and parse a key script file
pub fn load_script_file(path: &Path) -> Result<Vec<ScriptStep>, KeymapError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| KeymapError::IoError(format!("{}: {}", path.display(), e)))?;
    parse_script(&content)
}

fn parse_number(token: &str, value: &str) -> Result<usize, KeymapError> {
    value
        .parse()
        .map_err(|_| KeymapError::ParseError(format!("bad number in <{}>", token)))
}

fn parse_token(token: &str) -> Result<ScriptStep, KeymapError> {
    match token {
        "wait" => return Ok(ScriptStep::Wait(None)),
        "click-outside" => return Ok(ScriptStep::ClickOutside),
        "lt" => return Ok(ScriptStep::Key(Keystroke::char('<'))),
        _ => {}
    }

    if let Some(ms) = token.strip_prefix("wait:") {
        let ms = parse_number(token, ms)? as u64;
        return Ok(ScriptStep::Wait(Some(Duration::from_millis(ms))));
    }
    if let Some(index) = token.strip_prefix("pick:") {
        return Ok(ScriptStep::Pick(parse_number(token, index)?));
    }
    if let Some(rest) = token.strip_prefix("click:") {
        let (block, offset) = rest
            .split_once(':')
            .ok_or_else(|| KeymapError::ParseError(format!("expected <click:BLOCK:OFFSET>, got <{}>", token)))?;
        return Ok(ScriptStep::Click {
            block_index: parse_number(token, block)?,
            offset: parse_number(token, offset)?,
        });
    }

    parse_keystroke(token).map(ScriptStep::Key)
}

/// Parse `S-Enter`, `C-a`, `Tab`, ... into a keystroke
pub fn parse_keystroke(token: &str) -> Result<Keystroke, KeymapError> {
    let mut mods = Modifiers::NONE;
    let mut rest = token;
    loop {
        let flag = match rest.get(..2) {
            Some("S-") => Modifiers::SHIFT,
            Some("C-") => Modifiers::CTRL,
            Some("A-") => Modifiers::ALT,
            Some("M-") => Modifiers::META,
            _ => break,
        };
        // A bare "C-" etc. would leave nothing to name
        if rest.len() == 2 {
            break;
        }
        mods = mods | flag;
        rest = &rest[2..];
    }

    let key = match rest {
        "Enter" | "CR" => KeyCode::Enter,
        "Esc" | "Escape" => KeyCode::Escape,
        "Tab" => KeyCode::Tab,
        "BS" | "Backspace" => KeyCode::Backspace,
        "Del" | "Delete" => KeyCode::Delete,
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "Space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return Err(KeymapError::InvalidKey(token.to_string())),
            }
        }
    };

    Ok(Keystroke::new(key, mods))
}
