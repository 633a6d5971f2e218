//! Field extractor adapters.
//!
//! - `LlmFieldExtractor` - asks a chat-completion model for a JSON object
//! - `DirectAnswerExtractor` - offline, assigns the reply to the focus field
//! - `ResponseParser` - recovers the JSON object from a model reply

mod direct_extractor;
mod llm_extractor;
mod response_parser;

pub use direct_extractor::DirectAnswerExtractor;
pub use llm_extractor::{LlmFieldExtractor, DEFAULT_TEMPERATURE};
pub use response_parser::{ParseError, ResponseParser, MAX_FIELD_LENGTH, MAX_RESPONSE_LENGTH};
