//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Chat-completion backends (OpenAI, Ollama, mocks)
//! - `FieldExtractor` - Free text to candidate field values
//! - `ArtifactSink` - Delivery of finished artifacts

mod ai_provider;
mod artifact_sink;
mod field_extractor;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message, MessageRole,
    ProviderInfo, RequestMetadata, TokenUsage,
};
pub use artifact_sink::{ArtifactSink, DeliveryReceipt, SinkError};
pub use field_extractor::{ExtractionRequest, ExtractionResult, ExtractionUnavailable, FieldExtractor, FieldHint};
