//! Intake Sherpa - stdin/stdout chat loop.
//!
//! Runs one intake session in the terminal and writes the confirmed
//! artifact to the configured output directory.

use std::error::Error;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use intake_sherpa::adapters::ai::{OpenAIConfig, OpenAIProvider};
use intake_sherpa::adapters::extraction::{DirectAnswerExtractor, LlmFieldExtractor};
use intake_sherpa::adapters::sink::FileArtifactSink;
use intake_sherpa::application::IntakeService;
use intake_sherpa::config::{AiConfig, AiProviderKind, AppConfig};
use intake_sherpa::domain::conversation::{ConversationPhase, SlotFillingEngine};
use intake_sherpa::logging;
use intake_sherpa::ports::{AIError, AIProvider, FieldExtractor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    logging::init(&config.log);
    config.validate()?;

    let schema = Arc::new(config.intake.load_schema()?);
    tracing::info!(title = schema.title(), fields = schema.fields().len(), "schema loaded");

    let extractor = build_extractor(&config.ai)?;
    let engine = SlotFillingEngine::new(schema, extractor).with_settings(config.intake.engine_settings());
    let sink = Arc::new(FileArtifactSink::new(&config.output.dir));
    let service = IntakeService::new(Arc::new(engine), sink);

    let start = service.start_session().await;
    println!("{}\n", start.reply.text);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let report = service.submit_turn(start.session_id, &line).await?;
        println!("\n{}\n", report.reply.text);

        if report.phase == ConversationPhase::Done {
            let finalized = service.finalize(start.session_id).await?;
            println!("Saved to {}", finalized.receipt.location);
            return Ok(());
        }
    }

    service.end_session(start.session_id).await?;
    tracing::info!("input closed before the intake was confirmed");
    Ok(())
}

fn build_extractor(ai: &AiConfig) -> Result<Arc<dyn FieldExtractor>, AIError> {
    let mut provider_config = match ai.provider {
        AiProviderKind::Direct => return Ok(Arc::new(DirectAnswerExtractor::new())),
        AiProviderKind::OpenAI => OpenAIConfig::new(),
        AiProviderKind::Ollama => OpenAIConfig::ollama(),
    }
    .with_timeout(ai.timeout())
    .with_max_retries(ai.max_retries);

    if let Some(key) = &ai.openai_api_key {
        provider_config = provider_config.with_secret_key(key.clone());
    }
    if let Some(model) = &ai.model {
        provider_config = provider_config.with_model(model);
    }
    if let Some(url) = &ai.base_url {
        provider_config = provider_config.with_base_url(url);
    }

    let provider: Arc<dyn AIProvider> = Arc::new(OpenAIProvider::new(provider_config)?);
    let info = provider.provider_info();
    tracing::info!(provider = %info.name, model = %info.model, "extraction provider ready");

    Ok(Arc::new(LlmFieldExtractor::new(provider).with_temperature(ai.temperature)))
}
