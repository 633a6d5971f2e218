//! Per-field semantic checks and normalization.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use super::dates::{self, ParsedDate};
use super::value::SlotValue;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::schema::{FieldSchema, FieldSpec, ValidatorKind};

/// Why a candidate value was not accepted. The message is shown to the
/// user when the field is asked again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("the answer was empty")]
    Empty,

    #[error("it needs at least {min} characters")]
    TooShort { min: usize },

    #[error("it must be at most {max} characters")]
    TooLong { max: usize },

    #[error("I couldn't read that as a date")]
    UnreadableDate,

    #[error("I couldn't read that as a time")]
    UnreadableTime,

    #[error("I couldn't find a date or time in it")]
    UnreadableDateTime,

    #[error("{0} o'clock could be morning or evening, please add AM or PM")]
    AmbiguousHour(u32),

    #[error("that date doesn't exist")]
    NoSuchDate,

    #[error("please choose one of: {}", options.join(", "))]
    NotAnOption { options: Vec<String> },

    #[error("no project matches \"{query}\"")]
    UnknownProject { query: String },

    #[error("it can't be before the {anchor} ({anchor_value})")]
    BeforeAnchor { anchor: String, anchor_value: String },

    #[error("it can't be after the {dependent} ({dependent_value})")]
    AfterDependent { dependent: String, dependent_value: String },
}

impl From<ValidationFailure> for DomainError {
    fn from(err: ValidationFailure) -> Self {
        DomainError::new(ErrorCode::ValidationFailed, err.to_string())
    }
}

/// What the validator may look at besides the raw candidate.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Session start date: resolves "today" and anchors year inference.
    pub today: NaiveDate,
    /// Values accepted so far, by field name.
    pub accepted: &'a BTreeMap<String, SlotValue>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(today: NaiveDate, accepted: &'a BTreeMap<String, SlotValue>) -> Self {
        Self { today, accepted }
    }

    fn value(&self, name: &str) -> Option<&'a SlotValue> {
        self.accepted.get(name)
    }
}

/// Validates candidates against a schema. Pure and deterministic.
#[derive(Debug, Clone, Copy)]
pub struct FieldValidator<'s> {
    schema: &'s FieldSchema,
}

impl<'s> FieldValidator<'s> {
    pub fn new(schema: &'s FieldSchema) -> Self {
        Self { schema }
    }

    /// Checks and normalizes one candidate for `spec`.
    ///
    /// Partial date-times merge with the field's current value in `ctx`: a
    /// bare time completes a stored date and vice versa.
    pub fn validate(&self, spec: &FieldSpec, raw: &str, ctx: &ValidationContext<'_>) -> Result<SlotValue, ValidationFailure> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationFailure::Empty);
        }

        let value = match &spec.validator {
            None => SlotValue::text(trimmed),
            Some(ValidatorKind::Text { min_length, max_length }) => {
                let len = trimmed.chars().count();
                if len < *min_length {
                    return Err(ValidationFailure::TooShort { min: *min_length });
                }
                if len > *max_length {
                    return Err(ValidationFailure::TooLong { max: *max_length });
                }
                SlotValue::text(trimmed)
            }
            Some(ValidatorKind::Date) => {
                let ParsedDate { date, year_inferred } = dates::parse_date(trimmed, ctx.today, self.anchor_date(spec, ctx))?;
                SlotValue::Date { date, year_inferred }
            }
            Some(ValidatorKind::Time) => SlotValue::Time {
                time: dates::parse_time(trimmed)?,
            },
            Some(ValidatorKind::DateTime) => {
                let (date, time) = dates::parse_date_time(trimmed, ctx.today, self.anchor_date(spec, ctx))?;
                merge_partial(date, time, ctx.value(&spec.name))
            }
            Some(ValidatorKind::Choice { options }) => SlotValue::Choice {
                option: match_choice(options, trimmed)?,
            },
            Some(ValidatorKind::Project) => {
                let found = self
                    .schema
                    .catalog()
                    .best_match(trimmed)
                    .ok_or_else(|| ValidationFailure::UnknownProject {
                        query: trimmed.to_string(),
                    })?;
                SlotValue::Project {
                    id: found.project.id.clone(),
                    name: found.project.name.clone(),
                }
            }
        };

        self.check_ordering(spec, &value, ctx)?;
        Ok(value)
    }

    /// Date that year inference starts from: the anchor field's date when
    /// set, else the session start.
    fn anchor_date(&self, spec: &FieldSpec, ctx: &ValidationContext<'_>) -> NaiveDate {
        spec.not_before
            .as_deref()
            .and_then(|anchor| ctx.value(anchor))
            .and_then(SlotValue::date)
            .unwrap_or(ctx.today)
    }

    /// Enforces `not_before` in both directions: this field against its
    /// anchor, and fields anchored to this one against this field.
    fn check_ordering(&self, spec: &FieldSpec, value: &SlotValue, ctx: &ValidationContext<'_>) -> Result<(), ValidationFailure> {
        if let Some(anchor_name) = &spec.not_before {
            if let Some(anchor) = ctx.value(anchor_name) {
                if precedes(value, anchor) {
                    return Err(ValidationFailure::BeforeAnchor {
                        anchor: self.label_of(anchor_name),
                        anchor_value: anchor.display(),
                    });
                }
            }
        }

        for dependent in self
            .schema
            .fields()
            .iter()
            .filter(|f| f.not_before.as_deref() == Some(spec.name.as_str()))
        {
            if let Some(later) = ctx.value(&dependent.name) {
                if precedes(later, value) {
                    return Err(ValidationFailure::AfterDependent {
                        dependent: dependent.label.to_lowercase(),
                        dependent_value: later.display(),
                    });
                }
            }
        }
        Ok(())
    }

    fn label_of(&self, name: &str) -> String {
        self.schema
            .field(name)
            .map(|f| f.label.to_lowercase())
            .unwrap_or_else(|| name.to_string())
    }
}

/// True when `value` is strictly earlier than `anchor`. Full date-times
/// compare to the minute; otherwise only dates are compared.
fn precedes(value: &SlotValue, anchor: &SlotValue) -> bool {
    let (Some(date), Some(anchor_date)) = (value.date(), anchor.date()) else {
        return false;
    };
    match (value.time(), anchor.time()) {
        (Some(time), Some(anchor_time)) => NaiveDateTime::new(date, time) < NaiveDateTime::new(anchor_date, anchor_time),
        _ => date < anchor_date,
    }
}

fn merge_partial(date: Option<ParsedDate>, time: Option<chrono::NaiveTime>, current: Option<&SlotValue>) -> SlotValue {
    let (current_date, current_time, current_inferred) = match current {
        Some(SlotValue::DateTime {
            date,
            time,
            year_inferred,
        }) => (*date, *time, *year_inferred),
        _ => (None, None, false),
    };

    let (date, year_inferred) = match date {
        Some(parsed) => (Some(parsed.date), parsed.year_inferred),
        None => (current_date, current_inferred && current_date.is_some()),
    };

    SlotValue::DateTime {
        date,
        time: time.or(current_time),
        year_inferred,
    }
}

fn match_choice(options: &[String], raw: &str) -> Result<String, ValidationFailure> {
    let lowered = raw.to_lowercase();
    if let Some(exact) = options.iter().find(|o| o.to_lowercase() == lowered) {
        return Ok(exact.clone());
    }

    // "high priority please" still picks High, but only when one option fits.
    let words: Vec<&str> = lowered.split(|c: char| !c.is_alphanumeric()).collect();
    let mut mentioned = options.iter().filter(|o| words.contains(&o.to_lowercase().as_str()));
    match (mentioned.next(), mentioned.next()) {
        (Some(only), None) => Ok(only.clone()),
        _ => Err(ValidationFailure::NotAnOption {
            options: options.to_vec(),
        }),
    }
}
