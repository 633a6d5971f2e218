//! Structured logging setup using `tracing-subscriber`.
//!
//! Human-readable output to stderr by default, JSON lines when
//! `INTAKE_SHERPA__LOG__JSON=true`. Level filtering comes from `RUST_LOG`
//! (default: `info`). Stdout stays free for the conversation itself.

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Installs the global subscriber. Call once, before the first session.
pub fn init(config: &LogConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
