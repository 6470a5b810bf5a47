//! Startup configuration read from the process environment.

use std::env;
use std::time::Duration;

use agent_provider_mock::MOCK_PROVIDER_ID;
use agent_provider_openai::{DEFAULT_MODEL, OPENAI_PROVIDER_ID};
use thiserror::Error;

pub const PROVIDER_ENV_VAR: &str = "EM_PROVIDER";
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_ENV_VAR: &str = "EM_MODEL";
pub const TIMEOUT_ENV_VAR: &str = "EM_TIMEOUT_SEC";
pub const JSON_MODE_ENV_VAR: &str = "EM_JSON_MODE";
pub const TEMPERATURE_ENV_VAR: &str = "EM_TEMPERATURE";
pub const LOG_ENV_VAR: &str = "EM_LOG";

/// Log filter used when `EM_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Mock,
}

impl ProviderKind {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            OPENAI_PROVIDER_ID => Ok(Self::OpenAi),
            MOCK_PROVIDER_ID => Ok(Self::Mock),
            _ => Err(ConfigError::UnknownProvider(value.trim().to_string())),
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::OpenAi => OPENAI_PROVIDER_ID,
            Self::Mock => MOCK_PROVIDER_ID,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported provider '{0}'; expected 'openai' or 'mock'")]
    UnknownProvider(String),

    #[error("EM_TIMEOUT_SEC must be a positive number of seconds, got '{0}'")]
    InvalidTimeout(String),

    #[error("EM_JSON_MODE must be 0 or 1, got '{0}'")]
    InvalidJsonMode(String),

    #[error("EM_TEMPERATURE must be a number between 0 and 2, got '{0}'")]
    InvalidTemperature(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout: Option<Duration>,
    pub json_mode: bool,
    /// Sampling temperature; the endpoint default applies when unset.
    pub temperature: Option<f64>,
    pub log_filter: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            api_key: None,
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
            json_mode: false,
            temperature: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ChatConfig {
    /// Reads every `EM_*`/`OPENAI_*` variable. Empty values count as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let provider = match env_string_opt(PROVIDER_ENV_VAR) {
            Some(value) => ProviderKind::parse(&value)?,
            None => defaults.provider,
        };
        let timeout = env_string_opt(TIMEOUT_ENV_VAR)
            .map(|value| parse_timeout(&value))
            .transpose()?;
        let temperature = env_string_opt(TEMPERATURE_ENV_VAR)
            .map(|value| parse_temperature(&value))
            .transpose()?;
        let json_mode = match env_string_opt(JSON_MODE_ENV_VAR) {
            Some(value) => parse_flag(&value)?,
            None => defaults.json_mode,
        };

        Ok(Self {
            provider,
            api_key: env_string_opt(API_KEY_ENV_VAR),
            base_url: env_string_opt(BASE_URL_ENV_VAR),
            model: env_string_opt(MODEL_ENV_VAR).unwrap_or(defaults.model),
            timeout,
            json_mode,
            temperature,
            log_filter: env_string_opt(LOG_ENV_VAR).unwrap_or(defaults.log_filter),
        })
    }
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
        .map(Duration::from_secs_f64)
        .ok_or_else(|| ConfigError::InvalidTimeout(value.trim().to_string()))
}

fn parse_temperature(value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|temperature| (0.0..=2.0).contains(temperature))
        .ok_or_else(|| ConfigError::InvalidTemperature(value.trim().to_string()))
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidJsonMode(other.to_string())),
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
