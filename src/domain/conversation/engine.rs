//! Slot-filling engine.
//!
//! Holds no per-session state: every call takes a [`ConversationState`] and
//! returns the next one plus the assistant's reply. The input state is
//! never mutated, so a failed turn leaves the caller exactly where it was.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

use super::message::Turn;
use super::phase::{ConversationPhase, PhaseTransitionError};
use super::prompts::{self, FieldFailure};
use super::state::{ConversationState, FieldStatus, FieldValue};
use crate::domain::artifact::{ArtifactFormatter, FormatError};
use crate::domain::schema::{ConfirmationReply, FieldSchema, FieldSpec};
use crate::domain::validation::{FieldValidator, ValidationContext};
use crate::ports::{ExtractionRequest, ExtractionResult, ExtractionUnavailable, FieldExtractor, FieldHint};

/// Tunables for the engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Upper bound on one extractor call.
    pub extraction_timeout: Duration,
    /// Turns of history handed to the extractor, including the new one.
    pub history_window: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            extraction_timeout: Duration::from_secs(45),
            history_window: 6,
        }
    }
}

/// What kind of reply the assistant gave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyKind {
    Opening,
    /// Asking for (or refining) one field.
    Question { field: String },
    /// Summary plus the confirmation question.
    Summary,
    ConfirmationReminder,
    /// Rejected without naming a field; asking what to change.
    ChangeRequest,
    Completed,
    AlreadyComplete,
    /// Blank input; the last prompt repeated.
    Repeat,
    /// Extraction unavailable; state unchanged.
    Retry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub text: String,
    pub kind: ReplyKind,
}

impl AssistantReply {
    pub fn new(text: impl Into<String>, kind: ReplyKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub state: ConversationState,
    pub reply: AssistantReply,
    /// Fields whose candidates were accepted this turn.
    pub accepted: Vec<String>,
    /// Candidates the validator turned down this turn.
    pub failures: Vec<FieldFailure>,
}

#[derive(Debug, Error)]
enum TurnError {
    #[error(transparent)]
    Unavailable(#[from] ExtractionUnavailable),
    #[error(transparent)]
    Phase(#[from] PhaseTransitionError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Decides what to ask next and merges answers into state.
pub struct SlotFillingEngine {
    schema: Arc<FieldSchema>,
    extractor: Arc<dyn FieldExtractor>,
    settings: EngineSettings,
}

impl SlotFillingEngine {
    pub fn new(schema: Arc<FieldSchema>, extractor: Arc<dyn FieldExtractor>) -> Self {
        Self {
            schema,
            extractor,
            settings: EngineSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Fresh state for a session starting on `started_on`, with the
    /// greeting and first question already asked.
    pub fn opening(&self, started_on: NaiveDate) -> TurnOutcome {
        let mut state = ConversationState::new(started_on);
        let first = self.missing_fields(&state).into_iter().next();
        state.set_focus(first.map(|f| f.name.clone()));
        let reply = AssistantReply::new(prompts::opening(&self.schema, first), ReplyKind::Opening);
        self.finish(state, reply, Vec::new(), Vec::new())
    }

    /// Required fields that are unset or partial, plus every reopened
    /// field, in schema order.
    pub fn missing_fields(&self, state: &ConversationState) -> Vec<&FieldSpec> {
        self.schema
            .fields()
            .iter()
            .filter(|spec| match state.field(&spec.name) {
                None => spec.required,
                Some(field) => field.status == FieldStatus::Reopened || (spec.required && !field.value.is_complete()),
            })
            .collect()
    }

    /// Processes one user message.
    pub async fn process_turn(&self, state: &ConversationState, user_text: &str) -> TurnOutcome {
        let text = user_text.trim();

        if state.phase().is_terminal() {
            return self.unchanged(state, AssistantReply::new(prompts::ALREADY_COMPLETE, ReplyKind::AlreadyComplete));
        }
        if text.is_empty() {
            let prompt = if state.current_prompt().is_empty() {
                self.missing_fields(state)
                    .first()
                    .map(|spec| prompts::field_question(spec, state.field(&spec.name)))
                    .unwrap_or_else(|| prompts::CONFIRM_QUESTION.to_string())
            } else {
                state.current_prompt().to_string()
            };
            return self.unchanged(state, AssistantReply::new(prompt, ReplyKind::Repeat));
        }

        let result = match state.phase() {
            ConversationPhase::Collecting => self.collect(state, text).await,
            ConversationPhase::Confirming => self.confirm(state, text),
            ConversationPhase::Done => {
                return self.unchanged(state, AssistantReply::new(prompts::ALREADY_COMPLETE, ReplyKind::AlreadyComplete))
            }
        };

        match result {
            Ok(outcome) => {
                tracing::debug!(
                    phase = %outcome.state.phase(),
                    accepted = outcome.accepted.len(),
                    rejected = outcome.failures.len(),
                    "turn processed"
                );
                outcome
            }
            Err(TurnError::Unavailable(err)) => {
                tracing::warn!(error = %err, "extraction unavailable, state left unchanged");
                self.unchanged(state, AssistantReply::new(prompts::RETRY_PROMPT, ReplyKind::Retry))
            }
            Err(err) => {
                tracing::error!(error = %err, "turn failed, state left unchanged");
                self.unchanged(state, AssistantReply::new(prompts::RETRY_PROMPT, ReplyKind::Retry))
            }
        }
    }

    async fn collect(&self, state: &ConversationState, text: &str) -> Result<TurnOutcome, TurnError> {
        let request = self.extraction_request(state, text);
        let timeout = self.settings.extraction_timeout;
        let extraction = tokio::time::timeout(timeout, self.extractor.extract(&request))
            .await
            .map_err(|_| ExtractionUnavailable::Timeout(timeout))??;

        let mut next = state.clone();
        next.push_turn(Turn::user(text));
        let (accepted, failures) = self.merge(&mut next, &extraction);

        let notes = prompts::failure_notes(&self.schema, &failures);
        let reply = self.advance(&mut next, &notes)?;
        Ok(self.finish(next, reply, accepted, failures))
    }

    fn confirm(&self, state: &ConversationState, text: &str) -> Result<TurnOutcome, TurnError> {
        let mut next = state.clone();
        next.push_turn(Turn::user(text));

        let reply = match self.schema.vocabulary().classify(text) {
            ConfirmationReply::Affirm => {
                next.transition(ConversationPhase::Done)?;
                next.set_all_status(FieldStatus::Confirmed);
                next.set_focus(None);
                tracing::info!(fields = next.fields().len(), "summary affirmed");
                AssistantReply::new(prompts::completed(&self.schema), ReplyKind::Completed)
            }
            ConfirmationReply::Reject => {
                next.transition(ConversationPhase::Collecting)?;
                let named = self.schema.resolve_mentions(text);
                if named.is_empty() {
                    next.set_all_status(FieldStatus::Tentative);
                } else {
                    for spec in self.schema.fields() {
                        let status = if named.iter().any(|n| n.name == spec.name) {
                            FieldStatus::Reopened
                        } else {
                            FieldStatus::Confirmed
                        };
                        next.set_status(&spec.name, status);
                    }
                }
                tracing::info!(
                    reopened = ?named.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
                    "summary rejected"
                );

                let target = self.missing_fields(&next).into_iter().next().or_else(|| named.first().copied());
                match target {
                    Some(spec) => {
                        next.set_focus(Some(spec.name.clone()));
                        AssistantReply::new(
                            prompts::field_question(spec, next.field(&spec.name)),
                            ReplyKind::Question {
                                field: spec.name.clone(),
                            },
                        )
                    }
                    None => {
                        next.set_focus(None);
                        AssistantReply::new(prompts::change_request(&self.schema), ReplyKind::ChangeRequest)
                    }
                }
            }
            ConfirmationReply::Ambiguous => {
                AssistantReply::new(prompts::CONFIRM_REMINDER, ReplyKind::ConfirmationReminder)
            }
        };

        Ok(self.finish(next, reply, Vec::new(), Vec::new()))
    }

    /// Validates candidates in schema order and writes the valid ones.
    /// Confirmed fields are never written; invalid candidates leave the
    /// field as it was.
    fn merge(&self, state: &mut ConversationState, extraction: &ExtractionResult) -> (Vec<String>, Vec<FieldFailure>) {
        for (name, _) in extraction.iter() {
            if self.schema.field(name).is_none() {
                tracing::debug!(field = %name, "ignoring candidate for unknown field");
            }
        }

        let validator = FieldValidator::new(&self.schema);
        let mut accepted = Vec::new();
        let mut failures = Vec::new();

        for spec in self.schema.fields() {
            let Some(raw) = extraction.get(&spec.name) else {
                continue;
            };
            if state.field(&spec.name).is_some_and(FieldValue::is_locked) {
                tracing::debug!(field = %spec.name, "confirmed field not overwritten");
                continue;
            }

            // Re-snapshot per field so later fields see earlier ones from
            // the same turn (an end date anchored to a start date).
            let snapshot = state.accepted_values();
            let ctx = ValidationContext::new(state.started_on(), &snapshot);
            match validator.validate(spec, raw, &ctx) {
                Ok(value) => {
                    tracing::debug!(field = %spec.name, value = %value.canonical(), "candidate accepted");
                    state.set_field(spec.name.clone(), FieldValue::tentative(value));
                    accepted.push(spec.name.clone());
                }
                Err(failure) => {
                    tracing::info!(field = %spec.name, reason = %failure, "candidate rejected");
                    failures.push(FieldFailure {
                        field: spec.name.clone(),
                        raw: raw.to_string(),
                        failure,
                    });
                }
            }
        }

        (accepted, failures)
    }

    /// Moves to `Confirming` when nothing is missing, otherwise asks for
    /// the first missing field.
    fn advance(&self, state: &mut ConversationState, notes: &str) -> Result<AssistantReply, TurnError> {
        let target = self.missing_fields(state).into_iter().next();

        match target {
            None => {
                state.transition(ConversationPhase::Confirming)?;
                state.set_focus(None);
                let artifact = ArtifactFormatter::render(&self.schema, state)?;
                tracing::info!("all required fields collected, asking for confirmation");
                Ok(AssistantReply::new(
                    format!("{}{}", notes, prompts::summary(&artifact.summary)),
                    ReplyKind::Summary,
                ))
            }
            Some(spec) => {
                state.set_focus(Some(spec.name.clone()));
                let question = prompts::field_question(spec, state.field(&spec.name));
                Ok(AssistantReply::new(
                    format!("{}{}", notes, question),
                    ReplyKind::Question {
                        field: spec.name.clone(),
                    },
                ))
            }
        }
    }

    fn extraction_request(&self, state: &ConversationState, text: &str) -> ExtractionRequest {
        let window = self.settings.history_window.max(1);
        let mut history = state.recent_history(window - 1).to_vec();
        history.push(Turn::user(text));

        ExtractionRequest {
            history,
            fields: self
                .schema
                .fields()
                .iter()
                .filter(|spec| !state.field(&spec.name).is_some_and(FieldValue::is_locked))
                .map(FieldHint::from)
                .collect(),
            pending: self.missing_fields(state).iter().map(|f| f.name.clone()).collect(),
            focus: state.focus().map(str::to_string),
            known: state
                .fields()
                .iter()
                .map(|(name, field)| (name.clone(), field.value.canonical()))
                .collect(),
        }
    }

    fn finish(
        &self,
        mut state: ConversationState,
        reply: AssistantReply,
        accepted: Vec<String>,
        failures: Vec<FieldFailure>,
    ) -> TurnOutcome {
        state.push_turn(Turn::assistant(reply.text.clone()));
        state.set_prompt(reply.text.clone());
        TurnOutcome {
            state,
            reply,
            accepted,
            failures,
        }
    }

    fn unchanged(&self, state: &ConversationState, reply: AssistantReply) -> TurnOutcome {
        TurnOutcome {
            state: state.clone(),
            reply,
            accepted: Vec::new(),
            failures: Vec::new(),
        }
    }
}
