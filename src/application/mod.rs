//! Application layer - Session orchestration.
//!
//! Owns the live sessions and coordinates the engine with the artifact sink.

mod intake_service;

pub use intake_service::{FinalizedIntake, IntakeError, IntakeService, SessionStart, TurnReport};
