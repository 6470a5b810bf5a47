//! Minimal provider-agnostic contract for executing a single model run.
//!
//! This crate defines the run lifecycle shared by every provider and the
//! rulesets hosts use to steer output. Transport details and conversation
//! memory live elsewhere.

use std::fmt;

/// Identifier for one provider run.
pub type RunId = u64;

/// A provider could not be built from its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

/// One natural-language directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule(String);

impl Rule {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

/// A named, ordered list of rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ruleset {
    pub name: String,
    pub rules: Vec<Rule>,
}

impl Ruleset {
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// Instruction block for this ruleset: the name, then one numbered rule per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut block = format!("Ruleset: {}", self.name);
        for (idx, rule) in self.rules.iter().enumerate() {
            block.push_str(&format!("\n{}. {}", idx + 1, rule.text()));
        }
        block
    }
}

/// Joins several rulesets into one instruction string, in order.
#[must_use]
pub fn render_rulesets(rulesets: &[Ruleset]) -> String {
    rulesets
        .iter()
        .map(Ruleset::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One entry of the conversation history sent with each run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMessage {
    UserText { text: String },
    AssistantText { text: String },
}

impl RunMessage {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::UserText { text } | Self::AssistantText { text } => text,
        }
    }
}

/// History plus system instructions for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub run_id: RunId,
    pub messages: Vec<RunMessage>,
    pub instructions: String,
}

impl RunRequest {
    /// The most recent user message, if any.
    #[must_use]
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|message| match message {
            RunMessage::UserText { text } => Some(text.as_str()),
            RunMessage::AssistantText { .. } => None,
        })
    }
}

/// Streamed run progress: `Started`, any number of `Chunk`s, then exactly one
/// of `Finished` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Started { run_id: RunId },
    Chunk { run_id: RunId, text: String },
    Finished { run_id: RunId },
    Failed { run_id: RunId, error: String },
}

impl RunEvent {
    #[must_use]
    pub fn run_id(&self) -> RunId {
        match self {
            Self::Started { run_id }
            | Self::Chunk { run_id, .. }
            | Self::Finished { run_id }
            | Self::Failed { run_id, .. } => *run_id,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Failed { .. })
    }
}

/// Which backend and model answer the runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub model_id: String,
}

pub trait RunProvider: Send + Sync + 'static {
    fn profile(&self) -> ProviderProfile;

    /// Executes a run request and emits lifecycle events in provider order.
    ///
    /// Blocks until the run finishes. An `Err` means the run could not be
    /// carried out at all; failures after `Started` should be emitted as
    /// `Failed` as well.
    fn run(&self, req: RunRequest, emit: &mut dyn FnMut(RunEvent)) -> Result<(), String>;
}
