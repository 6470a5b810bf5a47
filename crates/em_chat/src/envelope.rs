//! Decoding of the JSON envelope the assistant is instructed to reply with.
//!
//! A valid envelope is exactly one JSON object carrying a string `response`
//! and a boolean `continue_chatting`. Extra keys are ignored.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// One decoded assistant turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    /// Markdown to display.
    pub response_text: String,
    pub continue_chatting: bool,
}

#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Not syntactically valid JSON, or JSON followed by other text.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// Valid JSON without a string `response` and a boolean `continue_chatting`.
    #[error("missing or invalid field: {0}")]
    MissingOrInvalidField(String),
}

impl EnvelopeError {
    /// Short notice shown to the user when a turn is rejected.
    pub fn notice(&self) -> String {
        match self {
            Self::MalformedEnvelope(_) => "Invalid JSON".to_string(),
            Self::MissingOrInvalidField(detail) => format!("Invalid response: {detail}"),
        }
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    response: String,
    continue_chatting: bool,
}

/// Parses the raw runtime output of one turn.
pub fn parse_envelope(raw: &str) -> Result<TurnResult, EnvelopeError> {
    let value: Value = serde_json::from_str(raw).map_err(EnvelopeError::MalformedEnvelope)?;

    if !value.is_object() {
        return Err(EnvelopeError::MissingOrInvalidField(format!(
            "expected a JSON object, got {}",
            value_type_name(&value)
        )));
    }

    let envelope: RawEnvelope = serde_json::from_value(value)
        .map_err(|error| EnvelopeError::MissingOrInvalidField(error.to_string()))?;

    Ok(TurnResult {
        response_text: envelope.response,
        continue_chatting: envelope.continue_chatting,
    })
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
