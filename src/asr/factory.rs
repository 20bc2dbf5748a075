use std::sync::Arc;
use anyhow::Result;
use tracing::{info, warn};

use super::client::WatsonClient;
use super::interface::RecognitionClient;
use super::worker::RecognizerHandle;
use crate::config_manager::Config;

/// Factory for the process-wide recognizer
pub struct RecognizerFactory;

impl RecognizerFactory {
    /// Build the speech service client and start its worker task.
    ///
    /// Must be called from within a tokio runtime. The returned handle is
    /// cheap to share; every ask invocation gets its own pending request.
    pub fn create_recognizer(config: &Config) -> Result<Arc<dyn RecognitionClient>> {
        if !config.asr_config.has_credentials() {
            warn!("Speech API key or secret is empty; recognition requests will be rejected");
        }

        let client = WatsonClient::new(&config.asr_config, &config.service_config)?;
        info!("Starting recognizer worker for {}", config.service_config.base_url);

        Ok(Arc::new(RecognizerHandle::spawn(Arc::new(client))))
    }
}
