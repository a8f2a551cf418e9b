//! Completion providers: the external collaborator that turns a prompt
//! into a stream of text deltas
//!
//! Providers run on worker threads and must poll their [`CancelFlag`]
//! between chunks; cancellation is best-effort and the engine drops any
//! chunk that still slips through.

use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::config::GhostConfig;

const SYSTEM_PROMPT: &str = "You are a helpful writing assistant. Complete the text with 1-2 sentences that naturally continue the user's writing. Be concise and match their writing style.";

/// Payload sent to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
}

/// Shared stop signal for one in-flight request
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A source of streamed completions
pub trait CompletionProvider: Send + Sync {
    /// Stream deltas for `request` into `on_chunk` until done, failed or
    /// cancelled. Returning `Ok` after cancellation is fine.
    fn stream(
        &self,
        request: &CompletionRequest,
        cancel: &CancelFlag,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<()>;
}

/// Replays a fixed script of chunks; used offline and in tests
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    chunks: Vec<String>,
    delay: Duration,
    failure: Option<String>,
}

impl ScriptedProvider {
    pub fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            delay: Duration::ZERO,
            failure: None,
        }
    }

    /// Split `text` into word-sized chunks (each keeps its leading space)
    pub fn from_text(text: &str) -> Self {
        let mut chunks = Vec::new();
        let mut current = String::new();
        for ch in text.chars() {
            if ch == ' ' && !current.trim().is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current.push(ch);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        Self::new(chunks)
    }

    /// Sleep between chunks
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail with `message` after the scripted chunks
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

impl CompletionProvider for ScriptedProvider {
    fn stream(
        &self,
        _request: &CompletionRequest,
        cancel: &CancelFlag,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<()> {
        for chunk in &self.chunks {
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            if cancel.is_cancelled() {
                return Ok(());
            }
            on_chunk(chunk);
        }
        if let Some(message) = &self.failure {
            bail!("{}", message);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

/// Streams chat completions from an OpenAI-compatible endpoint
pub struct OpenAiProvider {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    settings: GhostConfig,
}

impl OpenAiProvider {
    pub fn new(settings: GhostConfig, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("blockpad")
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            client,
            api_key,
            settings,
        })
    }
}

/// One line of the server-sent event stream
#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    Delta(String),
    Skip,
    Done,
}

fn parse_sse_line(line: &str) -> SseEvent {
    let Some(data) = line.strip_prefix("data:") else {
        return SseEvent::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseEvent::Done;
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(data) else {
        tracing::debug!(target: "ghost", line = %data, "skipping unparseable event");
        return SseEvent::Skip;
    };
    match value["choices"][0]["delta"]["content"].as_str() {
        Some(delta) if !delta.is_empty() => SseEvent::Delta(delta.to_string()),
        _ => SseEvent::Skip,
    }
}

impl CompletionProvider for OpenAiProvider {
    fn stream(
        &self,
        request: &CompletionRequest,
        cancel: &CancelFlag,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<()> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("API key not configured");
        };

        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            stream: true,
        };

        let url = format!("{}/chat/completions", self.settings.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .with_context(|| format!("POST {}", url))?
            .error_for_status()
            .context("completion request rejected")?;

        let reader = BufReader::new(response);
        for line in reader.lines() {
            if cancel.is_cancelled() {
                tracing::debug!(target: "ghost", "stream cancelled");
                return Ok(());
            }
            let line = line.context("read completion stream")?;
            match parse_sse_line(&line) {
                SseEvent::Delta(delta) => on_chunk(&delta),
                SseEvent::Skip => {}
                SseEvent::Done => break,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(provider: &dyn CompletionProvider, cancel: &CancelFlag) -> (Vec<String>, Result<()>) {
        let mut chunks = Vec::new();
        let request = CompletionRequest {
            prompt: "p".into(),
        };
        let result = provider.stream(&request, cancel, &mut |c: &str| chunks.push(c.to_string()));
        (chunks, result)
    }

    #[test]
    fn test_scripted_provider_replays_chunks() {
        let provider = ScriptedProvider::new(["a", "b"]);
        let (chunks, result) = collect(&provider, &CancelFlag::new());
        assert_eq!(chunks, vec!["a", "b"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_scripted_provider_stops_when_cancelled() {
        let provider = ScriptedProvider::new(["a", "b"]);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let (chunks, result) = collect(&provider, &cancel);
        assert!(chunks.is_empty());
        assert!(result.is_ok());
    }

    #[test]
    fn test_scripted_provider_failure() {
        let provider = ScriptedProvider::new(["a"]).failing_with("network down");
        let (chunks, result) = collect(&provider, &CancelFlag::new());
        assert_eq!(chunks, vec!["a"]);
        assert_eq!(result.unwrap_err().to_string(), "network down");
    }

    #[test]
    fn test_from_text_splits_on_words() {
        let provider = ScriptedProvider::from_text(" and then more");
        assert_eq!(provider.chunks, vec![" and", " then", " more"]);
    }

    #[test]
    fn test_missing_api_key() {
        let provider = OpenAiProvider::new(GhostConfig::default(), None).unwrap();
        let (_, result) = collect(&provider, &CancelFlag::new());
        assert_eq!(result.unwrap_err().to_string(), "API key not configured");
    }

    #[test]
    fn test_parse_sse_line() {
        let line = r#"data: {"choices":[{"delta":{"content":" next"}}]}"#;
        assert_eq!(parse_sse_line(line), SseEvent::Delta(" next".to_string()));
        assert_eq!(parse_sse_line("data: [DONE]"), SseEvent::Done);
        assert_eq!(parse_sse_line(": keep-alive"), SseEvent::Skip);
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{}}]}"#),
            SseEvent::Skip
        );
    }
}
