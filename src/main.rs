use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use watson_ask::ask::{AskRequest, AskOptions, Collaborators, Prompt};
use watson_ask::config_manager::Config;
use watson_ask::grammar::AskGrammarBuilder;
use watson_ask::local::{FileRecorder, LoggingPlayback, NoInputFallback};
use watson_ask::output::PlainOutputFormatter;
use watson_ask::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watson_ask=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let recording = args.next().ok_or_else(|| {
        anyhow::anyhow!("Usage: watson-ask <recording.wav> [prompt...]")
    })?;
    let prompts: Vec<Prompt> = args.map(Prompt::from).collect();

    let config_paths: Vec<String> = vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.jsonld".to_string()),
        Some("conf.yaml".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut config = None;
    for path in &config_paths {
        match Config::load(path) {
            Ok(cfg) => {
                info!("Loaded configuration from: {}", path);
                config = Some(cfg);
                break;
            }
            Err(e) => {
                debug!("Failed to load config from {}: {}", path, e);
            }
        }
    }
    let config = config.ok_or_else(|| {
        anyhow::anyhow!("Could not find config file. Tried: {:?}", config_paths)
    })?;

    let state = AppState::new(config)?;
    let controller = state.controller(Collaborators {
        grammar_builder: Arc::new(AskGrammarBuilder),
        formatter: Arc::new(PlainOutputFormatter::default()),
        playback: Arc::new(LoggingPlayback),
        recorder: Arc::new(FileRecorder::new(recording)),
        fallback: Arc::new(NoInputFallback),
    });

    let result = controller
        .ask(AskRequest::new(prompts, AskOptions::default()))
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
