//! Field extraction backed by a chat-completion model.

use std::sync::Arc;

use async_trait::async_trait;

use super::response_parser::ResponseParser;
use crate::domain::conversation::Speaker;
use crate::ports::{
    AIProvider, CompletionRequest, ExtractionRequest, ExtractionResult, ExtractionUnavailable,
    FieldExtractor, MessageRole, RequestMetadata,
};

/// Low temperature keeps the JSON shape stable across turns.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

const MAX_REPLY_TOKENS: u32 = 400;

/// Asks a model for a JSON object of field values mentioned in the
/// latest user message.
pub struct LlmFieldExtractor<P: AIProvider + ?Sized> {
    provider: Arc<P>,
    parser: ResponseParser,
    temperature: f32,
}

impl<P: AIProvider + ?Sized> LlmFieldExtractor<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            parser: ResponseParser::new(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Instructions listing every field the model may fill.
    pub fn system_prompt(request: &ExtractionRequest) -> String {
        let mut prompt = String::from(
            "You extract form fields from a conversation. Read the user's latest message \
             and return ONLY a JSON object mapping field names to the values the user gave. \
             Use the exact field names below. Leave out fields the user did not mention. \
             Copy dates and times as the user wrote them; do not invent values.\n\nFields:\n",
        );

        for field in &request.fields {
            prompt.push_str(&format!("- {} ({}): {}", field.name, field.label, field.hint));
            if !field.aliases.is_empty() {
                prompt.push_str(&format!(" [also called: {}]", field.aliases.join(", ")));
            }
            prompt.push('\n');
        }

        if !request.pending.is_empty() {
            prompt.push_str(&format!("\nStill missing: {}\n", request.pending.join(", ")));
        }
        if let Some(focus) = &request.focus {
            prompt.push_str(&format!(
                "The assistant just asked about \"{}\". A bare answer belongs to that field.\n",
                focus
            ));
        }
        if !request.known.is_empty() {
            let known = serde_json::to_string(&request.known).unwrap_or_default();
            prompt.push_str(&format!("\nCurrent values: {}\n", known));
        }

        prompt
    }

    fn completion_request(&self, request: &ExtractionRequest) -> CompletionRequest {
        request.history.iter().fold(
            CompletionRequest::new(RequestMetadata::traced())
                .with_system_prompt(Self::system_prompt(request))
                .with_temperature(self.temperature)
                .with_max_tokens(MAX_REPLY_TOKENS),
            |completion, turn| {
                let role = match turn.speaker {
                    Speaker::User => MessageRole::User,
                    Speaker::Assistant => MessageRole::Assistant,
                };
                completion.with_message(role, turn.text.clone())
            },
        )
    }
}

/// Maps a reply key onto a field name: exact, or by normalized name or label.
fn resolve_key<'r>(request: &'r ExtractionRequest, key: &str) -> Option<&'r str> {
    let normalized = key.trim().to_lowercase().replace([' ', '-'], "_");
    request
        .fields
        .iter()
        .find(|f| f.name == key || f.name == normalized || f.label.to_lowercase().replace(' ', "_") == normalized)
        .map(|f| f.name.as_str())
}

#[async_trait]
impl<P: AIProvider + ?Sized> FieldExtractor for LlmFieldExtractor<P> {
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult, ExtractionUnavailable> {
        let completion = self.completion_request(request);
        let trace_id = completion.metadata.trace_id.clone();

        let response = self.provider.complete(completion).await?;

        let candidates = match self.parser.parse(&response.content) {
            Ok(candidates) => candidates,
            Err(err) => {
                // Unparsable replies are not an outage; the engine re-asks.
                tracing::warn!(trace_id = %trace_id, error = %err, "model reply held no usable JSON");
                return Ok(ExtractionResult::new());
            }
        };

        let mut result = ExtractionResult::new();
        for (key, value) in candidates {
            match resolve_key(request, &key) {
                Some(name) => result.insert(name, value),
                None => tracing::debug!(trace_id = %trace_id, key = %key, "dropping unknown key"),
            }
        }

        tracing::debug!(trace_id = %trace_id, candidates = result.len(), "extraction complete");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::conversation::Turn;
    use crate::domain::schema::{FieldSchema, SchemaPreset};
    use crate::ports::FieldHint;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn request(text: &str) -> ExtractionRequest {
        let schema = FieldSchema::preset(SchemaPreset::StreetClosure).unwrap();
        ExtractionRequest {
            history: vec![Turn::assistant("Which street will be closed?"), Turn::user(text)],
            fields: schema.fields().iter().map(FieldHint::from).collect(),
            pending: vec!["street".to_string(), "reason".to_string()],
            focus: Some("street".to_string()),
            known: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn maps_reply_onto_known_fields() {
        let provider = Arc::new(
            MockAIProvider::new().with_json(json!({"street": "Main Street", "Reason": "Water main repairs", "mayor": "x"})),
        );
        let extractor = LlmFieldExtractor::new(provider);

        let result = extractor.extract(&request("Main Street, water main repairs")).await.unwrap();

        assert_eq!(result.get("street"), Some("Main Street"));
        assert_eq!(result.get("reason"), Some("Water main repairs"));
        assert_eq!(result.get("mayor"), None);
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn label_keys_resolve_to_field_names() {
        let provider = Arc::new(MockAIProvider::new().with_json(json!({"Affected area": "Oak to Elm"})));
        let extractor = LlmFieldExtractor::new(provider);

        let result = extractor.extract(&request("Oak to Elm")).await.unwrap();

        assert_eq!(result.get("area"), Some("Oak to Elm"));
    }

    #[tokio::test]
    async fn unparsable_reply_is_empty_not_an_error() {
        let provider = Arc::new(MockAIProvider::new().with_response("I'm not sure what you mean."));
        let extractor = LlmFieldExtractor::new(provider);

        let result = extractor.extract(&request("hmm")).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn provider_errors_become_unavailable() {
        let provider = Arc::new(MockAIProvider::new().with_error(MockError::Unavailable {
            message: "down".to_string(),
        }));
        let extractor = LlmFieldExtractor::new(provider);

        let err = extractor.extract(&request("Main Street")).await.unwrap_err();

        assert!(matches!(err, ExtractionUnavailable::Backend(_)));
    }

    #[tokio::test]
    async fn provider_timeout_maps_to_timeout() {
        let provider = Arc::new(MockAIProvider::new().with_error(MockError::Timeout { timeout_secs: 30 }));
        let extractor = LlmFieldExtractor::new(provider);

        let err = extractor.extract(&request("Main Street")).await.unwrap_err();

        assert_eq!(err, ExtractionUnavailable::Timeout(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn request_carries_history_prompt_and_temperature() {
        let provider = Arc::new(MockAIProvider::new());
        let extractor = LlmFieldExtractor::new(provider.clone());

        extractor.extract(&request("Main Street")).await.unwrap();

        let calls = provider.get_calls();
        let call = &calls[0];
        assert_eq!(call.temperature, Some(DEFAULT_TEMPERATURE));
        assert_eq!(call.messages.len(), 2);
        assert_eq!(call.messages[0].role, MessageRole::Assistant);
        assert_eq!(call.messages[1].content, "Main Street");
        let system = call.system_prompt.as_deref().unwrap();
        assert!(system.contains("- street (Street):"));
        assert!(system.contains("Still missing: street, reason"));
        assert!(system.contains("asked about \"street\""));
    }

    #[test]
    fn system_prompt_lists_current_values() {
        let mut req = request("x");
        req.known.insert("street".to_string(), "Main Street".to_string());
        let prompt = LlmFieldExtractor::<MockAIProvider>::system_prompt(&req);
        assert!(prompt.contains(r#"Current values: {"street":"Main Street"}"#));
    }
}
