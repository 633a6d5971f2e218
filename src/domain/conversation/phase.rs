//! Conversation phases and their transitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Where a session is in the collect/confirm cycle.
///
/// - `Collecting` → `Confirming` once every required field is complete
/// - `Confirming` → `Done` on explicit affirmation
/// - `Confirming` → `Collecting` on rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// Asking questions and merging answers.
    #[default]
    Collecting,

    /// Summary shown, waiting for yes/no.
    Confirming,

    /// User affirmed the summary. Read-only.
    Done,
}

impl ConversationPhase {
    /// Short label suitable for UI display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Collecting => "Collecting",
            Self::Confirming => "Confirming",
            Self::Done => "Done",
        }
    }

    /// Returns true if an artifact may be rendered in this phase.
    pub fn is_renderable(&self) -> bool {
        matches!(self, Self::Confirming | Self::Done)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Self::Collecting => vec![Self::Confirming],
            Self::Confirming => vec![Self::Done, Self::Collecting],
            Self::Done => vec![],
        }
    }

    pub fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns the target phase if the transition is allowed.
    pub fn transition_to(&self, target: Self) -> Result<Self, PhaseTransitionError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(PhaseTransitionError { from: *self, to: target })
        }
    }
}

impl std::fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Attempted a transition the phase graph does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move from {from} to {to}")]
pub struct PhaseTransitionError {
    pub from: ConversationPhase,
    pub to: ConversationPhase,
}

impl From<PhaseTransitionError> for DomainError {
    fn from(err: PhaseTransitionError) -> Self {
        DomainError::new(ErrorCode::InvalidPhaseTransition, err.to_string())
            .with_detail("from", err.from.label())
            .with_detail("to", err.to.label())
    }
}
