//! Renders a confirmed field mapping into an [`Artifact`].

use std::collections::BTreeMap;

use thiserror::Error;

use super::artifact::{Artifact, ArtifactRecord};
use crate::domain::conversation::{ConversationPhase, ConversationState};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::schema::{placeholders, FieldSchema};
use crate::domain::validation::SlotValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("cannot render an artifact while {0}")]
    NotReady(ConversationPhase),
}

impl From<FormatError> for DomainError {
    fn from(err: FormatError) -> Self {
        DomainError::new(ErrorCode::NotReadyToRender, err.to_string())
    }
}

/// Pure renderer: the same schema and fields always give the same bytes.
pub struct ArtifactFormatter;

impl ArtifactFormatter {
    /// Renders the artifact for a state in `Confirming` or `Done`.
    pub fn render(schema: &FieldSchema, state: &ConversationState) -> Result<Artifact, FormatError> {
        let phase = state.phase();
        if !phase.is_renderable() {
            return Err(FormatError::NotReady(phase));
        }

        // Summary, subject and record all come from this one snapshot.
        let values = state.accepted_values();

        let record = ArtifactRecord::from_pairs(schema.fields().iter().map(|f| {
            let canonical = values.get(&f.name).map(SlotValue::canonical).unwrap_or_default();
            (f.name.clone(), canonical)
        }));

        let subject = schema
            .subject_template()
            .map(|t| fill_template(t, &values))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| schema.title().to_string());

        let project_id = schema
            .fields()
            .iter()
            .filter_map(|f| values.get(&f.name))
            .find_map(|v| match v {
                SlotValue::Project { id, .. } => Some(id.clone()),
                _ => None,
            });

        Ok(Artifact {
            title: schema.title().to_string(),
            subject,
            summary: Self::summary(schema, &values),
            record,
            project_id,
        })
    }

    /// Human-readable block: the schema's template when it has one, else a
    /// `**Label:** value` line per set field in schema order.
    pub fn summary(schema: &FieldSchema, values: &BTreeMap<String, SlotValue>) -> String {
        match schema.summary_template() {
            Some(template) => fill_template(template, values),
            None => schema
                .fields()
                .iter()
                .filter_map(|f| values.get(&f.name).map(|v| format!("**{}:** {}", f.label, v.display())))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Replaces `{field}` placeholders with display values. A line whose
/// placeholders all name unset fields is dropped.
fn fill_template(template: &str, values: &BTreeMap<String, SlotValue>) -> String {
    template
        .lines()
        .filter(|line| {
            let names = placeholders(line);
            names.is_empty() || names.iter().any(|n| values.contains_key(*n))
        })
        .map(|line| {
            placeholders(line).into_iter().fold(line.to_string(), |acc, name| {
                let shown = values.get(name).map(SlotValue::display).unwrap_or_default();
                acc.replace(&format!("{{{}}}", name), &shown)
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}
