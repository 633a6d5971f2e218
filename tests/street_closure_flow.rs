//! Integration tests for a full street-closure intake.
//!
//! These tests drive the public service API end to end:
//! 1. Turn-by-turn answers with the offline direct extractor
//! 2. Multi-field answers parsed from mocked model replies
//! 3. Confirmation, rejection and hedging at the summary
//! 4. Extractor outages and timeouts leaving state untouched

use chrono::NaiveDate;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use intake_sherpa::adapters::ai::{MockAIProvider, MockError};
use intake_sherpa::adapters::extraction::{DirectAnswerExtractor, LlmFieldExtractor};
use intake_sherpa::adapters::sink::{FileArtifactSink, InMemoryArtifactSink};
use intake_sherpa::application::IntakeService;
use intake_sherpa::domain::conversation::{
    ConversationPhase, EngineSettings, FieldStatus, ReplyKind, SlotFillingEngine, CONFIRM_REMINDER, RETRY_PROMPT,
};
use intake_sherpa::domain::foundation::SessionId;
use intake_sherpa::domain::schema::{FieldSchema, SchemaPreset};
use intake_sherpa::domain::validation::SlotValue;
use intake_sherpa::ports::FieldExtractor;

// =============================================================================
// Test Infrastructure
// =============================================================================

const SCENARIO: [&str; 7] = [
    "Main Street",
    "December 10th 2025",
    "7 AM",
    "December 12th",
    "6 PM",
    "Water main repairs",
    "Between Oak Avenue and Elm Street",
];

fn started_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
}

fn service_with(extractor: Arc<dyn FieldExtractor>, settings: EngineSettings) -> (IntakeService, InMemoryArtifactSink) {
    let schema = Arc::new(FieldSchema::preset(SchemaPreset::StreetClosure).unwrap());
    let engine = SlotFillingEngine::new(schema, extractor).with_settings(settings);
    let sink = InMemoryArtifactSink::new();
    (IntakeService::new(Arc::new(engine), Arc::new(sink.clone())), sink)
}

fn direct_service() -> (IntakeService, InMemoryArtifactSink) {
    service_with(Arc::new(DirectAnswerExtractor::new()), EngineSettings::default())
}

fn mocked_service(provider: &MockAIProvider) -> IntakeService {
    let extractor = LlmFieldExtractor::new(Arc::new(provider.clone()));
    service_with(Arc::new(extractor), EngineSettings::default()).0
}

async fn run_scenario(service: &IntakeService) -> SessionId {
    let start = service.start_session_on(started_on()).await;
    for text in SCENARIO {
        service.submit_turn(start.session_id, text).await.unwrap();
    }
    start.session_id
}

// =============================================================================
// Collecting
// =============================================================================

#[tokio::test]
async fn scenario_reaches_confirming_with_all_fields() {
    let (service, _) = direct_service();
    let id = run_scenario(&service).await;

    let state = service.snapshot(id).await.unwrap();
    assert_eq!(state.phase(), ConversationPhase::Confirming);
    for field in ["street", "start_date", "end_date", "reason", "area"] {
        assert!(
            state.value(field).is_some_and(SlotValue::is_complete),
            "{} should be complete",
            field
        );
    }
    assert_eq!(state.value("start_date").unwrap().canonical(), "2025-12-10 07:00");
    assert_eq!(state.value("end_date").unwrap().canonical(), "2025-12-12 18:00");

    let summary = state.current_prompt();
    assert!(summary.contains("Main Street"));
    assert!(summary.contains("Water main repairs"));
}

#[tokio::test]
async fn partial_answers_are_refined_one_question_at_a_time() {
    let (service, _) = direct_service();
    let start = service.start_session_on(started_on()).await;
    assert!(start.reply.text.ends_with("Which street will be closed?"));

    service.submit_turn(start.session_id, "Main Street").await.unwrap();
    let report = service.submit_turn(start.session_id, "December 10th 2025").await.unwrap();
    assert_eq!(report.reply.text, "What time on Wednesday, December 10, 2025?");

    service.submit_turn(start.session_id, "7 AM").await.unwrap();
    let report = service.submit_turn(start.session_id, "December 12th").await.unwrap();
    assert_eq!(
        report.reply.text,
        "What time on Friday, December 12, 2025? (I assumed 2025; tell me if you meant a different year.)"
    );
}

#[tokio::test]
async fn answer_starting_with_street_alias_fills_reason() {
    let (service, _) = direct_service();
    let start = service.start_session_on(started_on()).await;
    for text in ["Main Street", "December 10th 2025 at 7 AM", "December 12th at 6 PM"] {
        service.submit_turn(start.session_id, text).await.unwrap();
    }

    let report = service
        .submit_turn(start.session_id, "Road is being repaved after the water main break")
        .await
        .unwrap();

    assert_eq!(report.accepted, vec!["reason"]);
    let state = service.snapshot(start.session_id).await.unwrap();
    assert_eq!(state.value("street"), Some(&SlotValue::text("Main Street")));
    assert_eq!(
        state.value("reason"),
        Some(&SlotValue::text("Road is being repaved after the water main break"))
    );
    assert_eq!(state.focus(), Some("area"));
}

#[tokio::test]
async fn end_before_start_is_rejected_with_reason() {
    let (service, _) = direct_service();
    let start = service.start_session_on(started_on()).await;
    for text in ["Main Street", "December 10th 2025 at 7 AM"] {
        service.submit_turn(start.session_id, text).await.unwrap();
    }

    let report = service.submit_turn(start.session_id, "December 8th 2025 at 6 PM").await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].field, "end_date");
    assert!(report.reply.text.starts_with("I couldn't use \"December 8th 2025 at 6 PM\" for the end"));
    assert!(report.missing.contains(&"end_date".to_string()));
}

#[tokio::test]
async fn one_message_can_fill_several_fields() {
    let provider = MockAIProvider::new().with_json(json!({
        "street": "Main Street",
        "start_date": "December 10th 2025 at 7 AM",
        "end_date": "December 12th 2025 at 6 PM",
        "reason": "Water main repairs",
    }));
    let service = mocked_service(&provider);
    let start = service.start_session_on(started_on()).await;

    let report = service
        .submit_turn(start.session_id, "Main St closes Dec 10 7am to Dec 12 6pm for water main repairs")
        .await
        .unwrap();

    assert_eq!(report.accepted.len(), 4);
    assert_eq!(report.missing, vec!["area"]);
    assert_eq!(
        report.reply.kind,
        ReplyKind::Question {
            field: "area".to_string()
        }
    );
}

// =============================================================================
// Confirming
// =============================================================================

#[tokio::test]
async fn yes_then_finalize_delivers_artifact() {
    let (service, sink) = direct_service();
    let id = run_scenario(&service).await;

    let report = service.submit_turn(id, "yes").await.unwrap();
    assert_eq!(report.phase, ConversationPhase::Done);

    let finalized = service.finalize(id).await.unwrap();
    assert_eq!(finalized.artifact.subject, "Street Closure: Main Street");
    assert_eq!(finalized.artifact.record.get("area"), Some("Between Oak Avenue and Elm Street"));
    assert_eq!(sink.count().await, 1);
}

#[tokio::test]
async fn finalized_artifact_is_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileArtifactSink::new(dir.path());
    let schema = Arc::new(FieldSchema::preset(SchemaPreset::StreetClosure).unwrap());
    let engine = SlotFillingEngine::new(schema, Arc::new(DirectAnswerExtractor::new()));
    let service = IntakeService::new(Arc::new(engine), Arc::new(sink.clone()));
    let id = run_scenario(&service).await;
    service.submit_turn(id, "Yes").await.unwrap();

    let finalized = service.finalize(id).await.unwrap();

    assert_eq!(finalized.receipt.location, sink.tsv_path(id).display().to_string());
    let tsv = std::fs::read_to_string(sink.tsv_path(id)).unwrap();
    let mut lines = tsv.lines();
    assert!(lines.next().unwrap().starts_with("street\tstart_date\tend_date"));
    assert!(lines.next().unwrap().starts_with("Main Street\t2025-12-10 07:00\t2025-12-12 18:00"));
    let markdown = std::fs::read_to_string(sink.markdown_path(id)).unwrap();
    assert!(markdown.starts_with("# Street Closure Notification"));
}

#[tokio::test]
async fn no_returns_to_collecting_and_keeps_values() {
    let (service, _) = direct_service();
    let id = run_scenario(&service).await;

    let report = service.submit_turn(id, "no").await.unwrap();

    assert_eq!(report.phase, ConversationPhase::Collecting);
    assert_eq!(report.reply.kind, ReplyKind::ChangeRequest);
    assert!(report.missing.is_empty());
    let state = service.snapshot(id).await.unwrap();
    assert_eq!(state.value("street"), Some(&SlotValue::text("Main Street")));
}

#[tokio::test]
async fn correction_after_plain_no_returns_to_summary() {
    let (service, _) = direct_service();
    let id = run_scenario(&service).await;
    service.submit_turn(id, "no").await.unwrap();

    let report = service.submit_turn(id, "The reason is gas line replacement").await.unwrap();

    assert_eq!(report.phase, ConversationPhase::Confirming);
    assert!(report.reply.text.contains("gas line replacement"));
    assert!(!report.reply.text.contains("Water main repairs"));
}

#[tokio::test]
async fn naming_a_field_reopens_only_that_field() {
    let (service, _) = direct_service();
    let id = run_scenario(&service).await;

    let report = service.submit_turn(id, "No, the street is wrong").await.unwrap();

    assert_eq!(report.missing, vec!["street"]);
    assert!(report.reply.text.contains("(Currently: Main Street)"));
    let state = service.snapshot(id).await.unwrap();
    assert_eq!(state.field("street").unwrap().status, FieldStatus::Reopened);
    assert_eq!(state.field("reason").unwrap().status, FieldStatus::Confirmed);

    let report = service.submit_turn(id, "Pine Road").await.unwrap();
    assert_eq!(report.phase, ConversationPhase::Confirming);
    assert!(report.reply.text.contains("Pine Road"));
}

#[tokio::test]
async fn negated_approval_does_not_finish() {
    let (service, sink) = direct_service();
    let id = run_scenario(&service).await;

    let report = service.submit_turn(id, "doesn't look good").await.unwrap();

    assert_eq!(report.phase, ConversationPhase::Collecting);
    assert!(service.finalize(id).await.is_err());
    assert_eq!(sink.count().await, 0);
}

#[tokio::test]
async fn approval_with_nothing_to_change_finishes() {
    let (service, _) = direct_service();
    let id = run_scenario(&service).await;

    let report = service.submit_turn(id, "Looks good, no changes needed").await.unwrap();

    assert_eq!(report.phase, ConversationPhase::Done);
    assert_eq!(report.reply.kind, ReplyKind::Completed);
}

#[tokio::test]
async fn maybe_keeps_confirming_and_reasks() {
    let (service, _) = direct_service();
    let id = run_scenario(&service).await;

    let report = service.submit_turn(id, "maybe").await.unwrap();

    assert_eq!(report.phase, ConversationPhase::Confirming);
    assert_eq!(report.reply.text, CONFIRM_REMINDER);
}

// =============================================================================
// Extractor failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn extractor_timeout_leaves_fields_unchanged() {
    let provider = MockAIProvider::new()
        .with_json(json!({"street": "Main Street"}))
        .with_delay(Duration::from_secs(10));
    let extractor = LlmFieldExtractor::new(Arc::new(provider));
    let settings = EngineSettings {
        extraction_timeout: Duration::from_millis(200),
        ..EngineSettings::default()
    };
    let (service, _) = service_with(Arc::new(extractor), settings);
    let start = service.start_session_on(started_on()).await;
    let before = service.snapshot(start.session_id).await.unwrap();

    let report = service.submit_turn(start.session_id, "Main Street").await.unwrap();

    assert_eq!(report.reply.text, RETRY_PROMPT);
    assert_eq!(report.reply.kind, ReplyKind::Retry);
    assert_eq!(service.snapshot(start.session_id).await.unwrap(), before);
}

#[tokio::test]
async fn provider_outage_returns_retry_then_recovers() {
    let provider = MockAIProvider::new()
        .with_error(MockError::Unavailable {
            message: "503".to_string(),
        })
        .with_json(json!({"street": "Main Street"}));
    let service = mocked_service(&provider);
    let start = service.start_session_on(started_on()).await;

    let first = service.submit_turn(start.session_id, "Main Street").await.unwrap();
    assert_eq!(first.reply.kind, ReplyKind::Retry);

    let second = service.submit_turn(start.session_id, "Main Street").await.unwrap();
    assert_eq!(second.accepted, vec!["street"]);
}

#[tokio::test]
async fn unparsable_model_reply_reasks_same_question() {
    let provider = MockAIProvider::new().with_response("Sorry, I can't help with that.");
    let service = mocked_service(&provider);
    let start = service.start_session_on(started_on()).await;

    let report = service.submit_turn(start.session_id, "Main Street").await.unwrap();

    assert_eq!(
        report.reply.kind,
        ReplyKind::Question {
            field: "street".to_string()
        }
    );
    assert_eq!(report.reply.text, "Which street will be closed?");
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn accepted_fields_are_never_lost_while_collecting(
        answers in proptest::collection::vec("[A-Za-z][A-Za-z ]{0,20}", 1..8),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        runtime.block_on(async {
            let (service, _) = direct_service();
            let start = service.start_session_on(started_on()).await;
            let mut seen: Vec<String> = Vec::new();

            for answer in &answers {
                service.submit_turn(start.session_id, answer).await.unwrap();
                let state = service.snapshot(start.session_id).await.unwrap();
                if state.phase() != ConversationPhase::Collecting {
                    break;
                }
                for name in &seen {
                    prop_assert!(state.field(name).is_some(), "{} was dropped", name);
                }
                seen = state.fields().keys().cloned().collect();
            }
            Ok(())
        })?;
    }
}
