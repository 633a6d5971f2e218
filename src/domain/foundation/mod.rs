//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps and the error vocabulary used by the
//! schema, conversation and artifact modules.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode};
pub use ids::SessionId;
pub use timestamp::Timestamp;
