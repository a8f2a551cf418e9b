//! Editing session: owns the model and runs side effects
//!
//! Commands returned by `update` are executed here. Completion streams run
//! on worker threads and report back through an mpsc channel; every message
//! is applied on the caller's thread by `process_async_messages`.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use crate::commands::Cmd;
use crate::ghost::{CancelFlag, CompletionProvider, CompletionRequest, GhostStatus, RequestId};
use crate::keymap::{Keystroke, ScriptStep};
use crate::messages::{AppMsg, EditorMsg, GhostMsg, Msg, SlashMsg};
use crate::model::EditorModel;
use crate::update::update;

/// Upper bound for `<wait>` in key scripts
pub const DEFAULT_WAIT: Duration = Duration::from_secs(30);

struct InFlight {
    cancel: CancelFlag,
    handle: JoinHandle<()>,
}

pub struct Session {
    model: EditorModel,
    provider: Arc<dyn CompletionProvider>,
    in_flight: HashMap<RequestId, InFlight>,
    /// Cancelled workers still winding down; joined once they exit
    retired: Vec<JoinHandle<()>>,
    msg_tx: Sender<Msg>,
    msg_rx: Receiver<Msg>,
}

impl Session {
    pub fn new(model: EditorModel, provider: Arc<dyn CompletionProvider>) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            model,
            provider,
            in_flight: HashMap::new(),
            retired: Vec::new(),
            msg_tx,
            msg_rx,
        }
    }

    #[inline]
    pub fn model(&self) -> &EditorModel {
        &self.model
    }

    /// Requests whose worker has not reported back or been cancelled
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Worker threads not yet joined, in flight or winding down
    pub fn live_workers(&self) -> usize {
        self.in_flight.len() + self.retired.len()
    }

    /// Run one message through `update` and execute its command
    ///
    /// Returns whether a redraw is needed.
    pub fn dispatch(&mut self, msg: Msg) -> bool {
        if let Msg::Ghost(GhostMsg::Finished { request_id } | GhostMsg::Failed { request_id, .. }) =
            &msg
        {
            self.reap(*request_id);
        }
        match update(&mut self.model, msg) {
            Some(cmd) => {
                let redraw = cmd.needs_redraw();
                self.process_cmd(cmd);
                redraw
            }
            None => false,
        }
    }

    pub fn key(&mut self, key: Keystroke) -> bool {
        self.dispatch(Msg::Key(key))
    }

    /// Type each char of `text` as its own keystroke
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.dispatch(Msg::type_char(ch));
        }
    }

    fn process_cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None | Cmd::Redraw => {}
            Cmd::RequestCompletion { request_id, prompt } => {
                self.spawn_completion(request_id, prompt);
            }
            Cmd::CancelCompletion { request_id } => {
                if let Some(job) = self.in_flight.remove(&request_id) {
                    job.cancel.cancel();
                    self.retired.push(job.handle);
                    tracing::debug!(target: "session", request = %request_id, "cancel signalled");
                }
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.process_cmd(cmd);
                }
            }
        }
    }

    fn spawn_completion(&mut self, request_id: RequestId, prompt: String) {
        let tx = self.msg_tx.clone();
        let provider = Arc::clone(&self.provider);
        let cancel = CancelFlag::new();
        let flag = cancel.clone();

        let handle = std::thread::spawn(move || {
            let request = CompletionRequest { prompt };
            let result = provider.stream(&request, &flag, &mut |delta: &str| {
                if flag.is_cancelled() {
                    return;
                }
                let _ = tx.send(Msg::Ghost(GhostMsg::Chunk {
                    request_id,
                    text: delta.to_string(),
                }));
            });
            if flag.is_cancelled() {
                return;
            }
            let msg = match result {
                Ok(()) => GhostMsg::Finished { request_id },
                Err(e) => GhostMsg::Failed {
                    request_id,
                    error: format!("{:#}", e),
                },
            };
            let _ = tx.send(Msg::Ghost(msg));
        });

        tracing::debug!(target: "session", request = %request_id, "completion worker started");
        self.in_flight.insert(request_id, InFlight { cancel, handle });
    }

    /// Join a worker that has reported its final message
    ///
    /// Sending `Finished` or `Failed` is the worker's last act, so the join
    /// returns as soon as the thread unwinds.
    fn reap(&mut self, request_id: RequestId) {
        if let Some(job) = self.in_flight.remove(&request_id) {
            if job.handle.join().is_err() {
                tracing::warn!(target: "session", request = %request_id, "completion worker panicked");
            }
        }
    }

    /// Join cancelled workers that have exited; the rest stay for later
    fn join_retired(&mut self) {
        let (done, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.retired)
            .into_iter()
            .partition(|handle| handle.is_finished());
        self.retired = running;
        for handle in done {
            let _ = handle.join();
        }
    }

    /// Apply every message the workers have sent so far
    pub fn process_async_messages(&mut self) -> bool {
        self.join_retired();
        let mut needs_redraw = false;
        while let Ok(msg) = self.msg_rx.try_recv() {
            if self.dispatch(msg) {
                needs_redraw = true;
            }
        }
        needs_redraw
    }

    /// Apply worker messages as they arrive for up to `duration`
    pub fn pump_for(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.msg_rx.recv_timeout(remaining) {
                Ok(msg) => {
                    self.dispatch(msg);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.process_async_messages();
    }

    /// Block until the current completion stops requesting or streaming
    ///
    /// Returns false if `timeout` passed first.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.process_async_messages();
            if !matches!(
                self.model.ghost.status(),
                GhostStatus::Requesting | GhostStatus::Streaming
            ) {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(target: "session", "timed out waiting for completion");
                return false;
            }
            match self.msg_rx.recv_timeout(remaining) {
                Ok(msg) => {
                    self.dispatch(msg);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    /// Replay a key script against the session
    pub fn run_script(&mut self, steps: &[ScriptStep]) -> Result<()> {
        for step in steps {
            match step {
                ScriptStep::Key(key) => {
                    self.key(*key);
                }
                ScriptStep::Wait(None) => {
                    self.wait_for_completion(DEFAULT_WAIT);
                }
                ScriptStep::Wait(Some(duration)) => self.pump_for(*duration),
                ScriptStep::Pick(index) => {
                    self.dispatch(Msg::Slash(SlashMsg::Pick(*index)));
                }
                ScriptStep::ClickOutside => {
                    self.dispatch(Msg::Editor(EditorMsg::ClickOutside));
                }
                ScriptStep::Click {
                    block_index,
                    offset,
                } => {
                    let block_id = self
                        .model
                        .document
                        .block_at(*block_index)
                        .map(|b| b.id)
                        .ok_or_else(|| anyhow!("no block at index {}", block_index))?;
                    self.dispatch(Msg::Editor(EditorMsg::ClickBlock {
                        block_id,
                        offset: *offset,
                    }));
                }
            }
            self.process_async_messages();
        }
        Ok(())
    }

    /// Cancel in-flight work and release transient state
    pub fn unmount(&mut self) {
        self.dispatch(Msg::App(AppMsg::Unmount));
        for (_, job) in self.in_flight.drain() {
            job.cancel.cancel();
            self.retired.push(job.handle);
        }
        self.join_retired();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for job in self.in_flight.values() {
            job.cancel.cancel();
        }
    }
}
