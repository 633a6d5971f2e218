//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Chat-completion providers (OpenAI-compatible, mock)
//! - `extraction` - Field extractors (model-backed, direct)
//! - `sink` - Artifact delivery (files, in-memory)

pub mod ai;
pub mod extraction;
pub mod sink;

pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use extraction::{DirectAnswerExtractor, LlmFieldExtractor, ResponseParser};
pub use sink::{FileArtifactSink, InMemoryArtifactSink};
