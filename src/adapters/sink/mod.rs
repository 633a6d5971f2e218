//! Artifact sink adapters.

mod file_sink;
mod in_memory_sink;

pub use file_sink::FileArtifactSink;
pub use in_memory_sink::InMemoryArtifactSink;
