//! IntakeService - Session registry around the slot-filling engine.
//!
//! Each session's state sits behind its own `tokio::sync::Mutex`, so turns
//! for one session run strictly in order while independent sessions run
//! in parallel. The registry lock is held only long enough to look a
//! session up, never across an extractor call.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

use crate::domain::artifact::{Artifact, ArtifactFormatter, FormatError};
use crate::domain::conversation::{
    AssistantReply, ConversationPhase, ConversationState, FieldFailure, SlotFillingEngine,
};
use crate::domain::foundation::{DomainError, ErrorCode, SessionId};
use crate::ports::{ArtifactSink, DeliveryReceipt, SinkError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("session {session_id} is not complete (currently {phase})")]
    NotComplete {
        session_id: SessionId,
        phase: ConversationPhase,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl From<IntakeError> for DomainError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::SessionNotFound(id) => DomainError::new(ErrorCode::SessionNotFound, "Session not found")
                .with_detail("session_id", id.to_string()),
            IntakeError::NotComplete { session_id, phase } => {
                DomainError::new(ErrorCode::NotReadyToRender, "Session has not been confirmed")
                    .with_detail("session_id", session_id.to_string())
                    .with_detail("phase", phase.to_string())
            }
            IntakeError::Format(err) => err.into(),
            IntakeError::Sink(err) => err.into(),
        }
    }
}

/// A newly opened session and its greeting.
#[derive(Debug, Clone)]
pub struct SessionStart {
    pub session_id: SessionId,
    pub reply: AssistantReply,
}

/// What the chat surface needs after one turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub reply: AssistantReply,
    pub phase: ConversationPhase,
    /// Fields still to be asked, in question order.
    pub missing: Vec<String>,
    pub accepted: Vec<String>,
    pub failures: Vec<FieldFailure>,
    /// Present once the session is `Confirming` or `Done`.
    pub artifact: Option<Artifact>,
}

/// A delivered, closed session.
#[derive(Debug, Clone)]
pub struct FinalizedIntake {
    pub artifact: Artifact,
    pub receipt: DeliveryReceipt,
}

pub struct IntakeService {
    engine: Arc<SlotFillingEngine>,
    sink: Arc<dyn ArtifactSink>,
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<ConversationState>>>>,
}

impl IntakeService {
    pub fn new(engine: Arc<SlotFillingEngine>, sink: Arc<dyn ArtifactSink>) -> Self {
        Self {
            engine,
            sink,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &SlotFillingEngine {
        &self.engine
    }

    /// Opens a session dated today (local time).
    pub async fn start_session(&self) -> SessionStart {
        self.start_session_on(Local::now().date_naive()).await
    }

    /// Opens a session whose relative dates resolve against `started_on`.
    pub async fn start_session_on(&self, started_on: NaiveDate) -> SessionStart {
        let session_id = SessionId::new();
        let outcome = self.engine.opening(started_on);

        self.sessions
            .write()
            .await
            .insert(session_id, Arc::new(Mutex::new(outcome.state)));

        tracing::info!(session_id = %session_id, started_on = %started_on, "session started");
        SessionStart {
            session_id,
            reply: outcome.reply,
        }
    }

    /// Runs one user turn. Waits for any turn already running on the
    /// same session.
    #[instrument(skip_all, fields(session_id = %session_id))]
    pub async fn submit_turn(&self, session_id: SessionId, text: &str) -> Result<TurnReport, IntakeError> {
        let session = self.session(session_id).await?;
        let mut state = session.lock().await;

        let outcome = self.engine.process_turn(&state, text).await;
        *state = outcome.state;

        let artifact = if state.phase().is_renderable() {
            Some(ArtifactFormatter::render(self.engine.schema(), &state)?)
        } else {
            None
        };

        Ok(TurnReport {
            missing: self
                .engine
                .missing_fields(&state)
                .into_iter()
                .map(|f| f.name.clone())
                .collect(),
            phase: state.phase(),
            reply: outcome.reply,
            accepted: outcome.accepted,
            failures: outcome.failures,
            artifact,
        })
    }

    /// Copy of the session's current state.
    pub async fn snapshot(&self, session_id: SessionId) -> Result<ConversationState, IntakeError> {
        let session = self.session(session_id).await?;
        let state = session.lock().await;
        Ok(state.clone())
    }

    /// Renders and delivers a `Done` session, then closes it.
    #[instrument(skip_all, fields(session_id = %session_id))]
    pub async fn finalize(&self, session_id: SessionId) -> Result<FinalizedIntake, IntakeError> {
        let session = self.session(session_id).await?;
        let state = session.lock().await;

        if state.phase() != ConversationPhase::Done {
            return Err(IntakeError::NotComplete {
                session_id,
                phase: state.phase(),
            });
        }

        let artifact = ArtifactFormatter::render(self.engine.schema(), &state)?;
        let receipt = self.sink.deliver(session_id, &artifact).await?;
        drop(state);

        self.sessions.write().await.remove(&session_id);
        tracing::info!(location = %receipt.location, "session finalized");

        Ok(FinalizedIntake { artifact, receipt })
    }

    /// Drops a session without delivering anything.
    pub async fn end_session(&self, session_id: SessionId) -> Result<(), IntakeError> {
        if self.sessions.write().await.remove(&session_id).is_none() {
            return Err(IntakeError::SessionNotFound(session_id));
        }
        tracing::info!(session_id = %session_id, "session ended");
        Ok(())
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn session(&self, session_id: SessionId) -> Result<Arc<Mutex<ConversationState>>, IntakeError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(IntakeError::SessionNotFound(session_id))
    }
}
