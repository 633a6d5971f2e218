//! Typed, normalized slot values.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

const DATE_CANONICAL: &str = "%Y-%m-%d";
const TIME_CANONICAL: &str = "%H:%M";
const DATE_DISPLAY: &str = "%A, %B %-d, %Y";
const TIME_DISPLAY: &str = "%-I:%M %p";

/// Follow-up a partially filled value still needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Refinement {
    NeedsTime,
    NeedsDate,
}

/// A validated value. Each variant has a canonical machine form and a
/// human display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotValue {
    Text {
        text: String,
    },
    Date {
        date: NaiveDate,
        year_inferred: bool,
    },
    Time {
        time: NaiveTime,
    },
    /// Either half may still be missing while the user is answering.
    DateTime {
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        year_inferred: bool,
    },
    Choice {
        option: String,
    },
    Project {
        id: String,
        name: String,
    },
}

impl SlotValue {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Machine form: ISO dates, 24h times, project ids.
    pub fn canonical(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Date { date, .. } => date.format(DATE_CANONICAL).to_string(),
            Self::Time { time } => time.format(TIME_CANONICAL).to_string(),
            Self::DateTime { date, time, .. } => match (date, time) {
                (Some(d), Some(t)) => format!("{} {}", d.format(DATE_CANONICAL), t.format(TIME_CANONICAL)),
                (Some(d), None) => d.format(DATE_CANONICAL).to_string(),
                (None, Some(t)) => t.format(TIME_CANONICAL).to_string(),
                (None, None) => String::new(),
            },
            Self::Choice { option } => option.clone(),
            Self::Project { id, .. } => id.clone(),
        }
    }

    /// Human form: "Wednesday, December 10, 2025 at 7:00 AM", project names.
    pub fn display(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Date { date, .. } => display_date(*date),
            Self::Time { time } => display_time(*time),
            Self::DateTime { date, time, .. } => match (date, time) {
                (Some(d), Some(t)) => format!("{} at {}", display_date(*d), display_time(*t)),
                (Some(d), None) => display_date(*d),
                (None, Some(t)) => display_time(*t),
                (None, None) => String::new(),
            },
            Self::Choice { option } => option.clone(),
            Self::Project { name, .. } => name.clone(),
        }
    }

    /// What a partial date-time is still missing, if anything.
    pub fn refinement(&self) -> Option<Refinement> {
        match self {
            Self::DateTime { date: Some(_), time: None, .. } => Some(Refinement::NeedsTime),
            Self::DateTime { date: None, .. } => Some(Refinement::NeedsDate),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.refinement().is_none()
    }

    /// Calendar date carried by the value, if any.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date { date, .. } => Some(*date),
            Self::DateTime { date, .. } => *date,
            _ => None,
        }
    }

    /// Time of day carried by the value, if any.
    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            Self::Time { time } => Some(*time),
            Self::DateTime { time, .. } => *time,
            _ => None,
        }
    }

    /// True when the year of the date was not given and had to be guessed.
    pub fn year_inferred(&self) -> bool {
        match self {
            Self::Date { year_inferred, .. } | Self::DateTime { year_inferred, .. } => *year_inferred,
            _ => false,
        }
    }
}

pub(crate) fn display_date(date: NaiveDate) -> String {
    date.format(DATE_DISPLAY).to_string()
}

pub(crate) fn display_time(time: NaiveTime) -> String {
    time.format(TIME_DISPLAY).to_string()
}
