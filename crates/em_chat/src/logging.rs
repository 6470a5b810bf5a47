//! Process-wide `tracing` subscriber.

use tracing_subscriber::EnvFilter;

use crate::config::DEFAULT_LOG_FILTER;

/// Installs a stderr `fmt` subscriber filtered by `filter`.
///
/// An unparseable directive falls back to [`DEFAULT_LOG_FILTER`]. Returns
/// `false` when a global subscriber was already installed.
pub fn init_logging(filter: &str) -> bool {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|error| {
        eprintln!("ignoring invalid log filter '{filter}': {error}");
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
