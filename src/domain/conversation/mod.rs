//! Conversation module.
//!
//! The per-session state, the collect/confirm phase graph, and the
//! slot-filling engine that drives a session from greeting to a confirmed
//! set of field values.

mod engine;
mod message;
mod phase;
mod prompts;
mod state;

pub use engine::{AssistantReply, EngineSettings, ReplyKind, SlotFillingEngine, TurnOutcome};
pub use message::{Speaker, Turn};
pub use phase::{ConversationPhase, PhaseTransitionError};
pub use prompts::{FieldFailure, ALREADY_COMPLETE, CONFIRM_QUESTION, CONFIRM_REMINDER, RETRY_PROMPT};
pub use state::{ConversationState, FieldStatus, FieldValue};
