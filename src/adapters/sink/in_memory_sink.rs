//! In-memory artifact sink for tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::artifact::Artifact;
use crate::domain::foundation::SessionId;
use crate::ports::{ArtifactSink, DeliveryReceipt, SinkError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactSink {
    delivered: Arc<RwLock<Vec<(SessionId, Artifact)>>>,
}

impl InMemoryArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn delivered(&self) -> Vec<(SessionId, Artifact)> {
        self.delivered.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.delivered.read().await.len()
    }

    pub async fn get(&self, session_id: SessionId) -> Option<Artifact> {
        self.delivered
            .read()
            .await
            .iter()
            .find(|(id, _)| *id == session_id)
            .map(|(_, artifact)| artifact.clone())
    }
}

#[async_trait]
impl ArtifactSink for InMemoryArtifactSink {
    async fn deliver(&self, session_id: SessionId, artifact: &Artifact) -> Result<DeliveryReceipt, SinkError> {
        self.delivered.write().await.push((session_id, artifact.clone()));
        Ok(DeliveryReceipt::new(format!("memory://{}", session_id)))
    }
}
