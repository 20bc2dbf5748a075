use std::sync::Arc;

use crate::ask::{AskController, AskDefaults, Collaborators};
use crate::asr::{RecognitionClient, RecognizerFactory};
use crate::config_manager::Config;

/// Process-wide state, established once at startup and read-only afterwards
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub defaults: AskDefaults,
    pub recognizer: Arc<dyn RecognitionClient>,
}

impl AppState {
    /// Start the recognizer worker for `config`; requires a tokio runtime
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let recognizer = RecognizerFactory::create_recognizer(&config)?;
        Ok(Self::with_recognizer(config, recognizer))
    }

    pub fn with_recognizer(config: Config, recognizer: Arc<dyn RecognitionClient>) -> Self {
        Self {
            defaults: AskDefaults::from_config(&config.asr_config),
            config,
            recognizer,
        }
    }

    /// Controller for one call, sharing the process recognizer
    pub fn controller(&self, collaborators: Collaborators) -> AskController {
        AskController::new(self.recognizer.clone(), collaborators, self.defaults.clone())
            .with_speech_context(self.config.service_config.speech_context.clone())
    }
}
