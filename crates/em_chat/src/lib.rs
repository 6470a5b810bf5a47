//! Terminal chat client for the `Em` assistant.
//!
//! ## Provider bootstrap
//!
//! - `EM_PROVIDER=openai` (default) talks to an OpenAI-compatible Chat
//!   Completions endpoint. `OPENAI_API_KEY` is required; `OPENAI_BASE_URL`,
//!   `EM_MODEL`, `EM_TIMEOUT_SEC` and `EM_JSON_MODE` are optional.
//! - `EM_PROVIDER=mock` replies locally with scripted envelopes.
//!
//! A `.env` file in the working directory is loaded first when present.
//!
//! ## Turn protocol
//!
//! Every assistant reply must be a single JSON object:
//!
//! ```json
//! { "response": "Markdown text", "continue_chatting": true }
//! ```
//!
//! The session ends when `continue_chatting` is false, when a reply cannot be
//! decoded, or at end of input.

pub mod agent;
pub mod chat;
pub mod config;
pub mod envelope;
pub mod logging;
pub mod providers;
pub mod render;
pub mod rulesets;
pub mod runtime;

pub use agent::{shared_buffer, Em, TurnOutcome};
pub use chat::{ChatError, ChatLoop, ChatState, ChatSummary, ExitReason, LinePrompt, PromptInput, StdinPrompt};
pub use config::{ChatConfig, ConfigError, ProviderKind};
pub use envelope::{parse_envelope, EnvelopeError, TurnResult};
pub use render::{format_timestamp, startup_timestamp, RenderWidth, TurnRenderer};
pub use runtime::{AgentRuntime, RuntimeError};
