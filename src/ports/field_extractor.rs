//! Field Extractor Port - Turns free text into candidate field values.
//!
//! Extractors are stateless: everything they may use arrives in the
//! [`ExtractionRequest`]. Their output is untrusted and always passes
//! through the validator before reaching conversation state.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::Turn;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::schema::FieldSpec;

use super::ai_provider::AIError;

/// Port for field extraction backends.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Proposes values for any fields mentioned in the latest user turn.
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult, ExtractionUnavailable>;
}

/// What the extractor is told about one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHint {
    pub name: String,
    pub label: String,
    pub hint: String,
    pub aliases: Vec<String>,
}

impl From<&FieldSpec> for FieldHint {
    fn from(spec: &FieldSpec) -> Self {
        Self {
            name: spec.name.clone(),
            label: spec.label.clone(),
            hint: spec.hint.clone(),
            aliases: spec.aliases.clone(),
        }
    }
}

/// Input to one extraction call.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Recent turns, oldest first, ending with the new user turn.
    pub history: Vec<Turn>,
    /// Fields that may still change (confirmed fields are left out).
    pub fields: Vec<FieldHint>,
    /// Required fields still missing, in question order.
    pub pending: Vec<String>,
    /// Field the assistant last asked about.
    pub focus: Option<String>,
    /// Values accepted so far, in canonical form.
    pub known: BTreeMap<String, String>,
}

impl ExtractionRequest {
    /// Text of the newest user turn.
    pub fn latest_user_text(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|t| t.is_user())
            .map(|t| t.text.as_str())
    }

    pub fn hint(&self, name: &str) -> Option<&FieldHint> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Candidate strings by field name. Transient: never stored in state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    candidates: BTreeMap<String, String>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.candidates.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.candidates.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.candidates.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExtractionResult {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            candidates: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// The extraction backend could not produce an answer this turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionUnavailable {
    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),

    #[error("extraction backend failed: {0}")]
    Backend(String),
}

impl From<ExtractionUnavailable> for DomainError {
    fn from(err: ExtractionUnavailable) -> Self {
        DomainError::new(ErrorCode::ExtractionUnavailable, err.to_string())
    }
}

/// Provider failures are outages for this turn.
impl From<AIError> for ExtractionUnavailable {
    fn from(err: AIError) -> Self {
        match err {
            AIError::Timeout { timeout_secs } => {
                ExtractionUnavailable::Timeout(Duration::from_secs(timeout_secs.into()))
            }
            other => ExtractionUnavailable::Backend(other.to_string()),
        }
    }
}
