//! The `Em` facade: one runtime call per turn, envelope enforcement, rendering.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use em_tui::{Loader, SharedWriter};

use crate::envelope::{parse_envelope, EnvelopeError};
use crate::render::TurnRenderer;
use crate::runtime::{AgentRuntime, RuntimeError};

/// What the driver should do after a turn.
#[derive(Debug)]
pub enum TurnOutcome {
    Continue,
    Stop,
    Invalid(EnvelopeError),
}

impl TurnOutcome {
    pub fn keeps_chatting(&self) -> bool {
        matches!(self, Self::Continue)
    }
}

pub struct Em {
    runtime: AgentRuntime,
    renderer: TurnRenderer,
    output: SharedWriter,
    spinner: bool,
}

impl Em {
    pub fn new(runtime: AgentRuntime, renderer: TurnRenderer, output: SharedWriter) -> Self {
        Self {
            runtime,
            renderer,
            output,
            spinner: true,
        }
    }

    /// Disables the working indicator (non-interactive output, tests).
    pub fn with_spinner(mut self, spinner: bool) -> Self {
        self.spinner = spinner;
        self
    }

    pub fn runtime(&self) -> &AgentRuntime {
        &self.runtime
    }

    /// Sends `text` through the runtime and renders the decoded reply.
    ///
    /// Envelope failures print a notice and come back as
    /// [`TurnOutcome::Invalid`]; transport failures are returned as errors.
    pub fn respond(&mut self, text: &str) -> Result<TurnOutcome, RuntimeError> {
        let raw = {
            let mut loader = self
                .spinner
                .then(|| Loader::new(None, &self.renderer.palette().accent()));
            if let Some(loader) = loader.as_mut() {
                loader.start(Arc::clone(&self.output));
            }
            let result = self.runtime.run(text);
            if let Some(loader) = loader.as_mut() {
                loader.stop();
            }
            result?
        };

        let mut out = lock_unpoisoned(&self.output);
        match parse_envelope(&raw) {
            Ok(turn) => {
                tracing::debug!(continue_chatting = turn.continue_chatting, "turn decoded");
                write_or_log(self.renderer.write_turn(&mut *out, &turn.response_text));
                Ok(if turn.continue_chatting {
                    TurnOutcome::Continue
                } else {
                    TurnOutcome::Stop
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, raw = %raw, "rejecting model output");
                write_or_log(self.renderer.write_notice(&mut *out, &err.notice()));
                Ok(TurnOutcome::Invalid(err))
            }
        }
    }
}

fn write_or_log(result: std::io::Result<()>) {
    if let Err(err) = result {
        tracing::error!(error = %err, "failed to write turn output");
    }
}

fn lock_unpoisoned(output: &SharedWriter) -> MutexGuard<'_, dyn Write + Send + 'static> {
    match output.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Buffer-backed [`SharedWriter`] for capturing output.
pub fn shared_buffer() -> (SharedWriter, Arc<Mutex<Vec<u8>>>) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer: SharedWriter = buffer.clone();
    (writer, buffer)
}
