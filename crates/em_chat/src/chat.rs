//! Chat loop driver: greeting, then prompt/respond until the session ends.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::agent::{Em, TurnOutcome};
use crate::rulesets::GREETING_INSTRUCTION;
use crate::runtime::RuntimeError;

/// Source of user lines. `Ok(None)` means end of input.
pub trait PromptInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Reads lines from any buffered reader, echoing the prompt to `out`.
pub struct LinePrompt<R, W> {
    reader: R,
    out: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(reader: R, out: W) -> Self {
        Self { reader, out }
    }
}

impl<R: BufRead, W: Write> PromptInput for LinePrompt<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

pub type StdinPrompt = LinePrompt<io::StdinLock<'static>, io::Stdout>;

impl StdinPrompt {
    pub fn stdin() -> Self {
        LinePrompt::new(io::stdin().lock(), io::stdout())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Active,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The assistant set `continue_chatting` to false.
    Stopped,
    /// The assistant's output could not be decoded.
    InvalidEnvelope,
    EndOfInput,
    /// `run` was called on a loop that had already ended.
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatSummary {
    /// User turns answered, excluding the greeting.
    pub turns: usize,
    pub exit: ExitReason,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("failed to read input: {0}")]
    Input(#[from] io::Error),
}

pub struct ChatLoop<'a, P: PromptInput> {
    em: &'a mut Em,
    input: P,
    prompt: String,
    state: ChatState,
}

impl<'a, P: PromptInput> ChatLoop<'a, P> {
    pub fn new(em: &'a mut Em, input: P, prompt: impl Into<String>) -> Self {
        Self {
            em,
            input,
            prompt: prompt.into(),
            state: ChatState::Active,
        }
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Greets, then alternates prompt and response until the session ends.
    ///
    /// The greeting's outcome never ends the session; afterwards only
    /// [`TurnOutcome::Continue`] keeps it active. Once the loop is
    /// [`ChatState::Terminated`] further calls return immediately with no
    /// turns.
    pub fn run(&mut self) -> Result<ChatSummary, ChatError> {
        if self.state == ChatState::Terminated {
            return Ok(ChatSummary {
                turns: 0,
                exit: ExitReason::Terminated,
            });
        }

        let result = self.drive();
        self.state = ChatState::Terminated;
        if let Ok(summary) = &result {
            tracing::debug!(turns = summary.turns, exit = ?summary.exit, "chat ended");
        }
        result
    }

    fn drive(&mut self) -> Result<ChatSummary, ChatError> {
        let greeting = self.em.respond(GREETING_INSTRUCTION)?;
        tracing::debug!(outcome = ?greeting, "greeting sent");

        let mut turns = 0;
        let exit = loop {
            let Some(line) = self.input.read_line(&self.prompt)? else {
                break ExitReason::EndOfInput;
            };
            turns += 1;
            match self.em.respond(&line)? {
                TurnOutcome::Continue => continue,
                TurnOutcome::Stop => break ExitReason::Stopped,
                TurnOutcome::Invalid(_) => break ExitReason::InvalidEnvelope,
            }
        };
        Ok(ChatSummary { turns, exit })
    }
}
