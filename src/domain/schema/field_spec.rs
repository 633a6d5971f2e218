//! Field specifications and validator kinds.

use serde::{Deserialize, Serialize};

const DEFAULT_MIN_LENGTH: usize = 3;
const DEFAULT_MAX_LENGTH: usize = 2000;

fn default_min_length() -> usize {
    DEFAULT_MIN_LENGTH
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

/// Semantic check applied to a candidate value before it is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorKind {
    /// Free text with length bounds (counted in characters, after trimming).
    Text {
        #[serde(default = "default_min_length")]
        min_length: usize,
        #[serde(default = "default_max_length")]
        max_length: usize,
    },
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time; either half may arrive first.
    DateTime,
    /// One of a fixed list of options.
    Choice { options: Vec<String> },
    /// Project name, fuzzy-matched against the schema's catalog.
    Project,
}

impl ValidatorKind {
    /// Text validator with default bounds.
    pub fn text() -> Self {
        Self::Text {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Returns true for validators whose values carry a calendar date.
    pub fn is_temporal_date(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }

    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date_time",
            Self::Choice { .. } => "choice",
            Self::Project => "project",
        }
    }
}

/// One named slot the conversation must (or may) fill.
///
/// Immutable once the schema is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub required: bool,
    /// Question asked when this field is the focus.
    pub prompt: String,
    /// Extraction hint handed to the extractor.
    pub hint: String,
    pub validator: Option<ValidatorKind>,
    /// Name of a date field this field must not precede.
    pub not_before: Option<String>,
    /// Extra words that refer to this field in free text.
    pub aliases: Vec<String>,
}

impl FieldSpec {
    /// Creates a required text field. Mostly useful for tests and
    /// programmatic schemas.
    pub fn required(name: impl Into<String>, label: impl Into<String>, prompt: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            name: name.into(),
            hint: label.clone(),
            label,
            required: true,
            prompt: prompt.into(),
            validator: Some(ValidatorKind::text()),
            not_before: None,
            aliases: Vec::new(),
        }
    }

    /// Creates an optional field without a validator.
    pub fn optional(name: impl Into<String>, label: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            required: false,
            validator: None,
            ..Self::required(name, label, prompt)
        }
    }

    pub fn with_validator(mut self, validator: ValidatorKind) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    pub fn with_not_before(mut self, field: impl Into<String>) -> Self {
        self.not_before = Some(field.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Lower-cased phrases that refer to this field: the name with
    /// underscores as spaces, the label, and every alias.
    pub fn mention_terms(&self) -> Vec<String> {
        let mut terms = vec![self.name.replace('_', " ").to_lowercase(), self.label.to_lowercase()];
        terms.extend(self.aliases.iter().map(|a| a.to_lowercase()));
        terms.retain(|t| !t.trim().is_empty());
        terms.dedup();
        terms
    }
}

/// Derives a display label from a snake_case field name.
pub(crate) fn label_from_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_validator_defaults_apply_when_deserializing() {
        let kind: ValidatorKind = serde_yaml::from_str("type: text").unwrap();
        assert_eq!(kind, ValidatorKind::text());
    }

    #[test]
    fn text_validator_bounds_can_be_overridden() {
        let kind: ValidatorKind = serde_yaml::from_str("type: text\nmin_length: 10").unwrap();
        assert_eq!(
            kind,
            ValidatorKind::Text {
                min_length: 10,
                max_length: 2000
            }
        );
    }

    #[test]
    fn choice_validator_deserializes_options() {
        let kind: ValidatorKind = serde_yaml::from_str("type: choice\noptions: [Low, High]").unwrap();
        assert_eq!(
            kind,
            ValidatorKind::Choice {
                options: vec!["Low".to_string(), "High".to_string()]
            }
        );
    }

    #[test]
    fn only_date_kinds_are_temporal_dates() {
        assert!(ValidatorKind::Date.is_temporal_date());
        assert!(ValidatorKind::DateTime.is_temporal_date());
        assert!(!ValidatorKind::Time.is_temporal_date());
        assert!(!ValidatorKind::text().is_temporal_date());
    }

    #[test]
    fn mention_terms_include_name_label_and_aliases() {
        let spec = FieldSpec::required("start_date", "Start", "When?").with_aliases(["Begins"]);
        assert_eq!(spec.mention_terms(), vec!["start date", "start", "begins"]);
    }

    #[test]
    fn label_from_name_capitalizes_first_word() {
        assert_eq!(label_from_name("due_date"), "Due date");
        assert_eq!(label_from_name(""), "");
    }

    #[test]
    fn optional_fields_have_no_validator() {
        let spec = FieldSpec::optional("notes", "Notes", "Anything else?");
        assert!(!spec.required);
        assert!(spec.validator.is_none());
    }
}
