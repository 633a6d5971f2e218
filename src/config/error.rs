//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid timeout: must be at least one second")]
    InvalidTimeout,

    #[error("Invalid temperature: must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("History window must hold at least one turn")]
    EmptyHistoryWindow,

    #[error("Schema file not readable: {0}")]
    SchemaUnreadable(String),
}
