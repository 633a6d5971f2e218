//! Per-session conversation state.
//!
//! Readers get everything through accessors. Only the slot-filling engine
//! mutates state, through the crate-private setters, and it always works
//! on a copy so a failed turn leaves the caller's state untouched.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::message::Turn;
use super::phase::{ConversationPhase, PhaseTransitionError};
use crate::domain::validation::SlotValue;

/// Lifecycle of one accepted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// Accepted but not yet approved; later answers may replace it.
    Tentative,
    /// Approved by the user; extraction never overwrites it.
    Confirmed,
    /// Named in a rejection; asked again, value kept until replaced.
    Reopened,
}

/// An accepted value and its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: SlotValue,
    pub status: FieldStatus,
}

impl FieldValue {
    pub fn tentative(value: SlotValue) -> Self {
        Self {
            value,
            status: FieldStatus::Tentative,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.status == FieldStatus::Confirmed
    }
}

/// Everything one session knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    fields: BTreeMap<String, FieldValue>,
    phase: ConversationPhase,
    history: Vec<Turn>,
    current_prompt: String,
    focus: Option<String>,
    started_on: NaiveDate,
}

impl ConversationState {
    /// Fresh state for a session that starts on `started_on`.
    pub fn new(started_on: NaiveDate) -> Self {
        Self {
            fields: BTreeMap::new(),
            phase: ConversationPhase::Collecting,
            history: Vec::new(),
            current_prompt: String::new(),
            focus: None,
            started_on,
        }
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&SlotValue> {
        self.fields.get(name).map(|f| &f.value)
    }

    pub fn phase(&self) -> ConversationPhase {
        self.phase
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// The last `window` turns.
    pub fn recent_history(&self, window: usize) -> &[Turn] {
        let start = self.history.len().saturating_sub(window);
        &self.history[start..]
    }

    /// The question the assistant last asked.
    pub fn current_prompt(&self) -> &str {
        &self.current_prompt
    }

    /// Field the assistant last asked about.
    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn started_on(&self) -> NaiveDate {
        self.started_on
    }

    /// Snapshot of accepted values by field name.
    pub fn accepted_values(&self) -> BTreeMap<String, SlotValue> {
        self.fields
            .iter()
            .map(|(name, field)| (name.clone(), field.value.clone()))
            .collect()
    }

    pub(crate) fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub(crate) fn set_status(&mut self, name: &str, status: FieldStatus) {
        if let Some(field) = self.fields.get_mut(name) {
            field.status = status;
        }
    }

    pub(crate) fn set_all_status(&mut self, status: FieldStatus) {
        for field in self.fields.values_mut() {
            field.status = status;
        }
    }

    pub(crate) fn push_turn(&mut self, turn: Turn) {
        self.history.push(turn);
    }

    pub(crate) fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.current_prompt = prompt.into();
    }

    pub(crate) fn set_focus(&mut self, focus: Option<String>) {
        self.focus = focus;
    }

    pub(crate) fn transition(&mut self, target: ConversationPhase) -> Result<(), PhaseTransitionError> {
        self.phase = self.phase.transition_to(target)?;
        Ok(())
    }
}
