//! Artifact Sink Port - Delivers finished artifacts somewhere durable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::artifact::Artifact;
use crate::domain::foundation::{DomainError, ErrorCode, SessionId, Timestamp};

/// Port for artifact delivery (files, ticket trackers, notification queues).
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Delivers one artifact. Called once per finalized session.
    async fn deliver(&self, session_id: SessionId, artifact: &Artifact) -> Result<DeliveryReceipt, SinkError>;
}

/// Proof of delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Where the artifact ended up (path, URL, key).
    pub location: String,
    pub delivered_at: Timestamp,
}

impl DeliveryReceipt {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            delivered_at: Timestamp::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("artifact rejected: {0}")]
    Rejected(String),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err.to_string())
    }
}

impl From<SinkError> for DomainError {
    fn from(err: SinkError) -> Self {
        DomainError::new(ErrorCode::SinkFailed, err.to_string())
    }
}
