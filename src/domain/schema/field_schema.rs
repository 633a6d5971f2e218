//! The validated, immutable field schema.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::catalog::ProjectCatalog;
use super::definition::{FieldDefinition, SchemaDefinition};
use super::field_spec::{label_from_name, FieldSpec, ValidatorKind};
use super::presets::SchemaPreset;
use super::vocabulary::{contains_phrase, normalize_phrase_text, ConfirmationVocabulary};
use crate::domain::foundation::{DomainError, ErrorCode};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Names of the `{field}` placeholders in a template, in order of appearance.
pub(crate) fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// A schema definition that cannot be used. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("schema document is malformed: {0}")]
    Malformed(String),

    #[error("cannot read schema file {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("schema declares no fields")]
    NoFields,

    #[error("schema declares no required fields")]
    NoRequiredFields,

    #[error("field name must not be empty")]
    EmptyFieldName,

    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("required field '{0}' has no validator")]
    MissingValidator(String),

    #[error("field '{field}' must not precede unknown field '{anchor}'")]
    UnknownAnchor { field: String, anchor: String },

    #[error("field '{field}' is anchored to '{anchor}', which is not a date field")]
    AnchorNotDate { field: String, anchor: String },

    #[error("field '{0}' declares not_before but is not a date field")]
    FieldNotDate(String),

    #[error("field '{0}' uses the project validator but the schema has no projects")]
    EmptyCatalog(String),

    #[error("field '{0}' is a choice without options")]
    EmptyChoice(String),

    #[error("template references unknown field '{0}'")]
    UnknownPlaceholder(String),
}

impl From<SchemaViolation> for DomainError {
    fn from(err: SchemaViolation) -> Self {
        DomainError::new(ErrorCode::SchemaViolation, err.to_string())
    }
}

/// Ordered field list plus everything the conversation needs to know about
/// the artifact it is collecting.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    title: String,
    intro: Option<String>,
    fields: Vec<FieldSpec>,
    summary_template: Option<String>,
    subject_template: Option<String>,
    vocabulary: ConfirmationVocabulary,
    catalog: ProjectCatalog,
}

impl FieldSchema {
    /// Validates a definition and builds the schema.
    pub fn from_definition(def: SchemaDefinition) -> Result<Self, SchemaViolation> {
        let SchemaDefinition {
            title,
            intro,
            summary_template,
            subject_template,
            confirmation,
            projects,
            fields,
        } = def;

        let fields: Vec<FieldSpec> = fields.into_iter().map(spec_from_definition).collect();
        let catalog = ProjectCatalog::new(projects);

        check_fields(&fields, &catalog)?;

        let known: HashSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        for template in summary_template.iter().chain(subject_template.iter()) {
            if let Some(unknown) = placeholders(template).into_iter().find(|p| !known.contains(p)) {
                return Err(SchemaViolation::UnknownPlaceholder(unknown.to_string()));
            }
        }

        Ok(Self {
            title,
            intro,
            fields,
            summary_template,
            subject_template,
            vocabulary: confirmation.unwrap_or_default(),
            catalog,
        })
    }

    /// Parses and validates a YAML schema document.
    pub fn from_yaml(source: &str) -> Result<Self, SchemaViolation> {
        Self::from_definition(SchemaDefinition::from_yaml(source)?)
    }

    /// Loads one of the built-in schemas.
    pub fn preset(preset: SchemaPreset) -> Result<Self, SchemaViolation> {
        Self::from_yaml(preset.source())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn intro(&self) -> Option<&str> {
        self.intro.as_deref()
    }

    /// Fields in question order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn summary_template(&self) -> Option<&str> {
        self.summary_template.as_deref()
    }

    pub fn subject_template(&self) -> Option<&str> {
        self.subject_template.as_deref()
    }

    pub fn vocabulary(&self) -> &ConfirmationVocabulary {
        &self.vocabulary
    }

    pub fn catalog(&self) -> &ProjectCatalog {
        &self.catalog
    }

    /// Fields whose name, label or alias appears in `text` as whole words,
    /// in schema order.
    pub fn resolve_mentions(&self, text: &str) -> Vec<&FieldSpec> {
        let normalized = normalize_phrase_text(text);
        self.fields
            .iter()
            .filter(|f| f.mention_terms().iter().any(|t| contains_phrase(&normalized, t)))
            .collect()
    }
}

fn spec_from_definition(def: FieldDefinition) -> FieldSpec {
    let label = def.label.unwrap_or_else(|| label_from_name(&def.name));
    FieldSpec {
        hint: def.hint.unwrap_or_else(|| label.clone()),
        name: def.name.trim().to_string(),
        label,
        required: def.required,
        prompt: def.prompt,
        validator: def.validator,
        not_before: def.not_before,
        aliases: def.aliases,
    }
}

fn check_fields(fields: &[FieldSpec], catalog: &ProjectCatalog) -> Result<(), SchemaViolation> {
    if fields.is_empty() {
        return Err(SchemaViolation::NoFields);
    }
    if !fields.iter().any(|f| f.required) {
        return Err(SchemaViolation::NoRequiredFields);
    }

    let mut seen = HashSet::new();
    for field in fields {
        if field.name.is_empty() {
            return Err(SchemaViolation::EmptyFieldName);
        }
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaViolation::DuplicateField(field.name.clone()));
        }
        if field.required && field.validator.is_none() {
            return Err(SchemaViolation::MissingValidator(field.name.clone()));
        }
        match &field.validator {
            Some(ValidatorKind::Project) if catalog.is_empty() => {
                return Err(SchemaViolation::EmptyCatalog(field.name.clone()));
            }
            Some(ValidatorKind::Choice { options }) if options.is_empty() => {
                return Err(SchemaViolation::EmptyChoice(field.name.clone()));
            }
            _ => {}
        }
    }

    for field in fields {
        let Some(anchor) = &field.not_before else {
            continue;
        };
        if !field.validator.as_ref().is_some_and(ValidatorKind::is_temporal_date) {
            return Err(SchemaViolation::FieldNotDate(field.name.clone()));
        }
        let target = fields
            .iter()
            .find(|f| &f.name == anchor)
            .ok_or_else(|| SchemaViolation::UnknownAnchor {
                field: field.name.clone(),
                anchor: anchor.clone(),
            })?;
        if !target.validator.as_ref().is_some_and(ValidatorKind::is_temporal_date) {
            return Err(SchemaViolation::AnchorNotDate {
                field: field.name.clone(),
                anchor: anchor.clone(),
            });
        }
    }

    Ok(())
}
