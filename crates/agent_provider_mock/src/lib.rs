//! Deterministic mock implementation of the shared `agent_provider` contract.
//!
//! Replies are scripted up front; once the script runs out the provider
//! answers with a well-formed chat envelope echoing the user. No transport is
//! involved, so it backs integration tests and offline runs.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use agent_provider::{ProviderProfile, RunEvent, RunProvider, RunRequest};
use serde_json::json;

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

const FAREWELL_WORDS: [&str; 4] = ["bye", "goodbye", "quit", "exit"];

/// One scripted outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Streams the text back in whitespace-delimited chunks.
    Text(String),
    /// Emits `Failed` with the given error.
    Fail(String),
}

impl From<&str> for MockReply {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MockReply {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

#[derive(Debug)]
pub struct MockProvider {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<RunRequest>>,
    token_delay: Duration,
}

impl MockProvider {
    /// Creates a mock provider that plays `replies` in order.
    #[must_use]
    pub fn new<R: Into<MockReply>>(replies: impl IntoIterator<Item = R>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
            token_delay: Duration::ZERO,
        }
    }

    /// Sleeps between chunks, for demos where the spinner should be visible.
    #[must_use]
    pub fn with_token_delay(mut self, delay: Duration) -> Self {
        self.token_delay = delay;
        self
    }

    /// Appends a reply to the end of the script.
    pub fn push_reply(&self, reply: impl Into<MockReply>) {
        lock_unpoisoned(&self.replies).push_back(reply.into());
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RunRequest> {
        lock_unpoisoned(&self.requests).clone()
    }

    #[must_use]
    pub fn remaining_replies(&self) -> usize {
        lock_unpoisoned(&self.replies).len()
    }

    fn emit_text(&self, run_id: u64, text: &str, emit: &mut dyn FnMut(RunEvent)) {
        let mut pending_token = String::new();
        for ch in text.chars() {
            pending_token.push(ch);
            if matches!(ch, ' ' | '\n') {
                emit(RunEvent::Chunk {
                    run_id,
                    text: std::mem::take(&mut pending_token),
                });
                self.pause();
            }
        }
        if !pending_token.is_empty() {
            emit(RunEvent::Chunk {
                run_id,
                text: pending_token,
            });
            self.pause();
        }
    }

    fn pause(&self) {
        if !self.token_delay.is_zero() {
            thread::sleep(self.token_delay);
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(Vec::<MockReply>::new())
    }
}

impl RunProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: "mock".to_string(),
        }
    }

    fn run(&self, req: RunRequest, emit: &mut dyn FnMut(RunEvent)) -> Result<(), String> {
        let run_id = req.run_id;
        let reply = lock_unpoisoned(&self.replies).pop_front();
        let fallback = echo_envelope(req.last_user_text().unwrap_or_default());
        lock_unpoisoned(&self.requests).push(req);

        emit(RunEvent::Started { run_id });
        match reply {
            Some(MockReply::Fail(error)) => emit(RunEvent::Failed { run_id, error }),
            Some(MockReply::Text(text)) => {
                self.emit_text(run_id, &text, emit);
                emit(RunEvent::Finished { run_id });
            }
            None => {
                self.emit_text(run_id, &fallback, emit);
                emit(RunEvent::Finished { run_id });
            }
        }

        Ok(())
    }
}

/// Envelope used once the script is exhausted.
#[must_use]
pub fn echo_envelope(user_text: &str) -> String {
    let said_goodbye = user_text
        .split(|ch: char| !ch.is_alphanumeric())
        .any(|word| FAREWELL_WORDS.contains(&word.to_lowercase().as_str()));
    let response = if said_goodbye {
        "Goodbye!".to_string()
    } else {
        format!("You said: **{}**", user_text.trim())
    };
    json!({
        "response": response,
        "continue_chatting": !said_goodbye,
    })
    .to_string()
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
