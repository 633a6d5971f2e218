//! Intake configuration: which schema to collect and engine tunables

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::conversation::EngineSettings;
use crate::domain::schema::{FieldSchema, SchemaDefinition, SchemaPreset, SchemaViolation};

#[derive(Debug, Clone, Deserialize)]
pub struct IntakeConfig {
    /// Built-in schema, used when `schema_path` is unset
    #[serde(default)]
    pub preset: SchemaPreset,

    /// Custom schema YAML; overrides `preset`
    pub schema_path: Option<PathBuf>,

    /// Upper bound on one extractor call, in seconds
    #[serde(default = "default_extraction_timeout")]
    pub extraction_timeout_secs: u64,

    /// Turns of history sent to the extractor
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl IntakeConfig {
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            extraction_timeout: self.extraction_timeout(),
            history_window: self.history_window,
        }
    }

    /// Loads and validates the configured schema.
    pub fn load_schema(&self) -> Result<FieldSchema, SchemaViolation> {
        match &self.schema_path {
            Some(path) => FieldSchema::from_definition(SchemaDefinition::from_path(path)?),
            None => FieldSchema::preset(self.preset),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.extraction_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.history_window == 0 {
            return Err(ValidationError::EmptyHistoryWindow);
        }

        if let Some(path) = &self.schema_path {
            if !path.is_file() {
                return Err(ValidationError::SchemaUnreadable(path.display().to_string()));
            }
        }

        Ok(())
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            preset: SchemaPreset::default(),
            schema_path: None,
            extraction_timeout_secs: default_extraction_timeout(),
            history_window: default_history_window(),
        }
    }
}

fn default_extraction_timeout() -> u64 {
    45
}

fn default_history_window() -> usize {
    6
}
