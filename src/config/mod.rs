//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `INTAKE_SHERPA` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use intake_sherpa::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Collecting {:?}", config.intake.preset);
//! ```

mod ai;
mod error;
mod intake;
mod output;

pub use ai::{AiConfig, AiProviderKind};
pub use error::{ConfigError, ValidationError};
pub use intake::IntakeConfig;
pub use output::{LogConfig, OutputConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads; whether it
/// validates depends on the chosen AI provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Extraction backend (OpenAI, Ollama, direct)
    #[serde(default)]
    pub ai: AiConfig,

    /// Schema selection and engine tunables
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Artifact output directory
    #[serde(default)]
    pub output: OutputConfig,

    /// Log format
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `INTAKE_SHERPA` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `INTAKE_SHERPA__AI__PROVIDER=ollama` -> `ai.provider = ollama`
    /// - `INTAKE_SHERPA__INTAKE__PRESET=ticket_request` -> `intake.preset = ticket_request`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("INTAKE_SHERPA")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing OpenAI key, a zero timeout,
    /// an empty history window or an unreadable schema path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.intake.validate()?;
        Ok(())
    }
}
