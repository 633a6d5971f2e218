//! Artifact module - Final output derived from a confirmed conversation.

mod artifact;
mod formatter;

pub use artifact::{Artifact, ArtifactRecord, TicketPayload};
pub use formatter::{ArtifactFormatter, FormatError};
