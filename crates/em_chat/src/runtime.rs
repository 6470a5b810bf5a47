//! Conversation runtime: rulesets, memory, and one provider run per turn.

use std::sync::Arc;

use agent_provider::{
    render_rulesets, ProviderProfile, RunEvent, RunId, RunMessage, RunProvider, RunRequest,
    Ruleset,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("provider run failed: {0}")]
    Provider(String),

    #[error("provider run {0} ended without finishing")]
    Incomplete(RunId),
}

/// Wraps a provider with fixed rulesets and the running conversation history.
pub struct AgentRuntime {
    provider: Arc<dyn RunProvider>,
    instructions: String,
    memory: Vec<RunMessage>,
    next_run_id: RunId,
}

impl AgentRuntime {
    pub fn new(provider: Arc<dyn RunProvider>, rulesets: &[Ruleset]) -> Self {
        Self {
            provider,
            instructions: render_rulesets(rulesets),
            memory: Vec::new(),
            next_run_id: 1,
        }
    }

    pub fn profile(&self) -> ProviderProfile {
        self.provider.profile()
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Messages exchanged so far, oldest first.
    pub fn memory(&self) -> &[RunMessage] {
        &self.memory
    }

    /// Runs one turn and returns the assistant's raw text.
    ///
    /// Memory is only extended when the run finishes.
    pub fn run(&mut self, input: &str) -> Result<String, RuntimeError> {
        let run_id = self.next_run_id;
        self.next_run_id += 1;

        let mut messages = self.memory.clone();
        messages.push(RunMessage::UserText {
            text: input.to_string(),
        });
        let request = RunRequest {
            run_id,
            messages,
            instructions: self.instructions.clone(),
        };

        let mut output = String::new();
        let mut failure = None;
        let mut finished = false;
        tracing::debug!(run_id, history = self.memory.len(), "starting run");

        self.provider
            .run(request, &mut |event| {
                if event.run_id() != run_id {
                    tracing::warn!(run_id, stray = event.run_id(), "ignoring event for another run");
                    return;
                }
                match event {
                    RunEvent::Started { .. } => {}
                    RunEvent::Chunk { text, .. } => {
                        if !finished && failure.is_none() {
                            output.push_str(&text);
                        }
                    }
                    RunEvent::Finished { .. } => finished = true,
                    RunEvent::Failed { error, .. } => failure = Some(error),
                }
            })
            .map_err(RuntimeError::Provider)?;

        if let Some(error) = failure {
            tracing::error!(run_id, "run failed: {error}");
            return Err(RuntimeError::Provider(error));
        }
        if !finished {
            return Err(RuntimeError::Incomplete(run_id));
        }

        self.memory.push(RunMessage::UserText {
            text: input.to_string(),
        });
        self.memory.push(RunMessage::AssistantText {
            text: output.clone(),
        });
        tracing::debug!(run_id, bytes = output.len(), "run finished");
        Ok(output)
    }
}
