//! Environment configuration for rendering.

use std::env;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// `NO_COLOR` set to any non-empty value disables ANSI styling.
    pub no_color: bool,
    /// `COLUMNS` fallback used when the terminal size cannot be probed.
    pub columns: Option<usize>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            no_color: env_string_opt("NO_COLOR").is_some(),
            columns: env_string_opt("COLUMNS")
                .and_then(|value| value.trim().parse::<usize>().ok())
                .filter(|columns| *columns > 0),
        }
    }

    pub fn color_enabled(&self) -> bool {
        !self.no_color
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
