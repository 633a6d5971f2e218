//! Data-only schema definitions, as loaded from YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::catalog::ProjectEntry;
use super::field_spec::ValidatorKind;
use super::vocabulary::ConfirmationVocabulary;
use super::SchemaViolation;

/// One field as written in a schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub prompt: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub validator: Option<ValidatorKind>,
    #[serde(default)]
    pub not_before: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Unvalidated schema, straight from a YAML document.
///
/// Turn it into a usable [`super::FieldSchema`] with
/// [`super::FieldSchema::from_definition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub title: String,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub summary_template: Option<String>,
    #[serde(default)]
    pub subject_template: Option<String>,
    #[serde(default)]
    pub confirmation: Option<ConfirmationVocabulary>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    pub fields: Vec<FieldDefinition>,
}

impl SchemaDefinition {
    /// Parses a YAML schema document.
    pub fn from_yaml(source: &str) -> Result<Self, SchemaViolation> {
        serde_yaml::from_str(source).map_err(|e| SchemaViolation::Malformed(e.to_string()))
    }

    /// Reads and parses a YAML schema file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaViolation> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| SchemaViolation::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&source)
    }
}
