//! Filesystem artifact sink.
//!
//! Writes each finished artifact as two files in the output directory:
//!
//! ```text
//! {output_dir}/
//! ├── {session_id}.tsv   header row + value row
//! └── {session_id}.md    title heading + summary
//! ```
//!
//! Each file is written to `{name}.tmp` first and then renamed, so a
//! crash never leaves a half-written artifact behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::artifact::Artifact;
use crate::domain::foundation::SessionId;
use crate::ports::{ArtifactSink, DeliveryReceipt, SinkError};

#[derive(Debug, Clone)]
pub struct FileArtifactSink {
    output_dir: PathBuf,
}

impl FileArtifactSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn tsv_path(&self, session_id: SessionId) -> PathBuf {
        self.output_dir.join(format!("{}.tsv", session_id))
    }

    pub fn markdown_path(&self, session_id: SessionId) -> PathBuf {
        self.output_dir.join(format!("{}.md", session_id))
    }

    async fn write_atomic(path: &Path, content: &str) -> Result<(), SinkError> {
        let temp = path.with_extension(format!(
            "{}.tmp",
            path.extension().and_then(|e| e.to_str()).unwrap_or_default()
        ));

        let mut file = fs::File::create(&temp)
            .await
            .map_err(|e| SinkError::Io(format!("failed to create {}: {}", temp.display(), e)))?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp, path)
            .await
            .map_err(|e| SinkError::Io(format!("failed to move {} into place: {}", path.display(), e)))
    }
}

#[async_trait]
impl ArtifactSink for FileArtifactSink {
    async fn deliver(&self, session_id: SessionId, artifact: &Artifact) -> Result<DeliveryReceipt, SinkError> {
        fs::create_dir_all(&self.output_dir).await.map_err(|e| {
            SinkError::Io(format!(
                "failed to create output directory {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let tsv = self.tsv_path(session_id);
        Self::write_atomic(&tsv, &artifact.record.to_tsv()).await?;
        Self::write_atomic(&self.markdown_path(session_id), &artifact.to_markdown()).await?;

        tracing::info!(session_id = %session_id, path = %tsv.display(), "artifact written");
        Ok(DeliveryReceipt::new(tsv.display().to_string()))
    }
}
