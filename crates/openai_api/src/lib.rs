//! Transport-only client for OpenAI-compatible Chat Completions endpoints.
//!
//! This crate owns request building, retry policy, and response/error parsing.
//! It has no notion of conversations or rendering.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod retry;
pub mod url;

pub use client::OpenAiApiClient;
pub use config::OpenAiApiConfig;
pub use error::OpenAiApiError;
pub use payload::{
    ChatChoice, ChatCompletion, ChatMessage, ChatRequest, ChatRole, ResponseFormat, Usage,
};
pub use url::normalize_chat_url;
