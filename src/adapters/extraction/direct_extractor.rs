//! Offline extractor that needs no model.
//!
//! Treats the latest user message as the answer to the question just
//! asked. A message shaped like `<field>: value` goes to the named field
//! instead, which is how a user corrects one detail after a rejection.
//! The sentence form `the <field> is value` only counts when nothing is
//! focused or the named field is focused or still pending; otherwise
//! "Road is being repaved" would overwrite the street.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ports::{ExtractionRequest, ExtractionResult, ExtractionUnavailable, FieldExtractor, FieldHint};

static NAMED_ANSWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:the\s+)?(?P<term>[a-z][a-z _-]{0,40}?)\s*(?:(?P<colon>:)|\s(?:is|should be|to)\s)\s*(?P<value>.+?)\s*$",
    )
    .expect("named answer regex is valid")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectAnswerExtractor;

impl DirectAnswerExtractor {
    pub fn new() -> Self {
        Self
    }

    fn named_answer<'r>(request: &'r ExtractionRequest, text: &str) -> Option<(&'r str, String)> {
        let caps = NAMED_ANSWER.captures(text)?;
        let term = caps.name("term")?.as_str().trim().to_lowercase().replace(['_', '-'], " ");
        let value = caps.name("value")?.as_str().to_string();
        let explicit = caps.name("colon").is_some();

        let hint = request
            .fields
            .iter()
            .find(|hint| names(hint).any(|name| name == term))?;

        let accepted = explicit
            || request.focus.is_none()
            || request.focus.as_deref() == Some(hint.name.as_str())
            || request.pending.iter().any(|p| *p == hint.name);
        accepted.then(|| (hint.name.as_str(), value))
    }
}

fn names(hint: &FieldHint) -> impl Iterator<Item = String> + '_ {
    std::iter::once(hint.name.replace('_', " "))
        .chain(std::iter::once(hint.label.to_lowercase()))
        .chain(hint.aliases.iter().map(|a| a.to_lowercase()))
}

#[async_trait]
impl FieldExtractor for DirectAnswerExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult, ExtractionUnavailable> {
        let Some(text) = request.latest_user_text().map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(ExtractionResult::new());
        };

        if let Some((field, value)) = Self::named_answer(request, text) {
            return Ok(ExtractionResult::new().with(field, value));
        }

        Ok(match &request.focus {
            Some(focus) if request.hint(focus).is_some() => ExtractionResult::new().with(focus.as_str(), text),
            _ => ExtractionResult::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Turn;
    use crate::domain::schema::{FieldSchema, SchemaPreset};
    use std::collections::BTreeMap;

    fn request(text: &str, focus: Option<&str>) -> ExtractionRequest {
        request_pending(text, focus, &[])
    }

    fn request_pending(text: &str, focus: Option<&str>, pending: &[&str]) -> ExtractionRequest {
        let schema = FieldSchema::preset(SchemaPreset::StreetClosure).unwrap();
        ExtractionRequest {
            history: vec![Turn::user(text)],
            fields: schema.fields().iter().map(FieldHint::from).collect(),
            pending: pending.iter().map(|p| p.to_string()).collect(),
            focus: focus.map(str::to_string),
            known: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn bare_answer_goes_to_focus() {
        let result = DirectAnswerExtractor::new()
            .extract(&request("  Water main repairs ", Some("reason")))
            .await
            .unwrap();
        assert_eq!(result.get("reason"), Some("Water main repairs"));
        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn named_answer_overrides_focus() {
        let result = DirectAnswerExtractor::new()
            .extract(&request_pending("The reason is gas line work", Some("street"), &["street", "reason"]))
            .await
            .unwrap();
        assert_eq!(result.get("reason"), Some("gas line work"));
        assert_eq!(result.get("street"), None);
    }

    #[tokio::test]
    async fn label_with_colon_is_recognized() {
        let result = DirectAnswerExtractor::new()
            .extract(&request("Affected area: Oak to Elm", None))
            .await
            .unwrap();
        assert_eq!(result.get("area"), Some("Oak to Elm"));
    }

    #[tokio::test]
    async fn sentence_starting_with_alias_answers_focus() {
        let result = DirectAnswerExtractor::new()
            .extract(&request_pending(
                "Road is being repaved after the water main break",
                Some("reason"),
                &["reason", "area"],
            ))
            .await
            .unwrap();
        assert_eq!(result.get("reason"), Some("Road is being repaved after the water main break"));
        assert_eq!(result.get("street"), None);
    }

    #[tokio::test]
    async fn bare_name_counts_for_pending_field() {
        let result = DirectAnswerExtractor::new()
            .extract(&request_pending("area is Oak to Elm", Some("reason"), &["reason", "area"]))
            .await
            .unwrap();
        assert_eq!(result.get("area"), Some("Oak to Elm"));
    }

    #[tokio::test]
    async fn settled_field_named_in_a_sentence_is_not_overwritten() {
        let result = DirectAnswerExtractor::new()
            .extract(&request_pending("The road is closed for paving", Some("reason"), &["reason"]))
            .await
            .unwrap();
        assert_eq!(result.get("reason"), Some("The road is closed for paving"));
        assert_eq!(result.get("street"), None);
    }

    #[tokio::test]
    async fn colon_form_overrides_focus() {
        let result = DirectAnswerExtractor::new()
            .extract(&request_pending("Street: Pine Road", Some("reason"), &["reason"]))
            .await
            .unwrap();
        assert_eq!(result.get("street"), Some("Pine Road"));
        assert_eq!(result.get("reason"), None);
    }

    #[tokio::test]
    async fn bare_name_counts_without_focus() {
        let result = DirectAnswerExtractor::new()
            .extract(&request("street is Pine Road", None))
            .await
            .unwrap();
        assert_eq!(result.get("street"), Some("Pine Road"));
    }

    #[tokio::test]
    async fn unknown_term_falls_back_to_focus() {
        let result = DirectAnswerExtractor::new()
            .extract(&request("The weather is nice", Some("notes")))
            .await
            .unwrap();
        assert_eq!(result.get("notes"), Some("The weather is nice"));
    }

    #[tokio::test]
    async fn no_focus_and_no_name_yields_nothing() {
        let result = DirectAnswerExtractor::new()
            .extract(&request("Main Street", None))
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
