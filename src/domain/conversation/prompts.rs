//! Assistant reply texts.

use chrono::Datelike;

use super::state::{FieldStatus, FieldValue};
use crate::domain::schema::{FieldSchema, FieldSpec};
use crate::domain::validation::{display_date, display_time, Refinement, ValidationFailure};

/// Reply when the extractor could not be reached.
pub const RETRY_PROMPT: &str = "I couldn't understand that, could you rephrase?";

pub const CONFIRM_QUESTION: &str = "Does this look correct? Reply **yes** to finalize, or **no** to make changes.";

pub const CONFIRM_REMINDER: &str =
    "Please reply **yes** if everything is correct, or **no** and name what should change.";

pub const ALREADY_COMPLETE: &str = "This request is already finalized. Start a new session to submit another one.";

/// Number of catalog projects named in the greeting.
const PROJECT_PREVIEW: usize = 5;

/// A candidate the validator turned down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: String,
    pub raw: String,
    pub failure: ValidationFailure,
}

pub(crate) fn opening(schema: &FieldSchema, first: Option<&FieldSpec>) -> String {
    let mut parts = Vec::new();
    parts.push(
        schema
            .intro()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Hello! Let's put together your {}.", schema.title().to_lowercase())),
    );
    if !schema.catalog().is_empty() {
        parts.push(format!("Available projects: {}.", schema.catalog().preview(PROJECT_PREVIEW)));
    }
    if let Some(spec) = first {
        parts.push(spec.prompt.clone());
    }
    parts.join("\n\n")
}

/// One sentence per rejected candidate, ready to prefix a question.
pub(crate) fn failure_notes(schema: &FieldSchema, failures: &[FieldFailure]) -> String {
    failures
        .iter()
        .map(|f| {
            let label = schema
                .field(&f.field)
                .map(|s| s.label.to_lowercase())
                .unwrap_or_else(|| f.field.clone());
            format!("I couldn't use \"{}\" for the {}: {}. ", f.raw.trim(), label, f.failure)
        })
        .collect()
}

/// The question for `spec`, refined when it holds a partial value.
pub(crate) fn field_question(spec: &FieldSpec, current: Option<&FieldValue>) -> String {
    let Some(current) = current else {
        return spec.prompt.clone();
    };
    let value = &current.value;

    match (value.refinement(), value.date(), value.time()) {
        (Some(Refinement::NeedsTime), Some(date), _) => {
            let mut question = format!("What time on {}?", display_date(date));
            if value.year_inferred() {
                question.push_str(&format!(
                    " (I assumed {}; tell me if you meant a different year.)",
                    date.year()
                ));
            }
            question
        }
        (Some(Refinement::NeedsDate), _, Some(time)) => {
            format!("Which date is the {} at {}?", spec.label.to_lowercase(), display_time(time))
        }
        _ if current.status == FieldStatus::Reopened => {
            format!("{} (Currently: {})", spec.prompt, value.display())
        }
        _ => spec.prompt.clone(),
    }
}

pub(crate) fn summary(summary: &str) -> String {
    format!("Here's a summary of what I have:\n\n{}\n\n{}", summary, CONFIRM_QUESTION)
}

pub(crate) fn change_request(schema: &FieldSchema) -> String {
    let labels: Vec<String> = schema.fields().iter().map(|f| f.label.to_lowercase()).collect();
    format!(
        "What would you like to change? Name the detail ({}) and give the new value.",
        labels.join(", ")
    )
}

pub(crate) fn completed(schema: &FieldSchema) -> String {
    format!("Thank you! The {} is confirmed and ready.", schema.title().to_lowercase())
}
