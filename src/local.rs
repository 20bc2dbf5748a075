//! Stand-ins for the telephony layer, used when running asks outside a call.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use crate::ask::{AskRequest, AskResult, FallbackCollector, Playback, RecordParams, Recorder, Recording};
use crate::grammar::InputMode;
use crate::output::{OutputDocument, OutputItem};

/// Logs each prompt item instead of playing it
#[derive(Debug, Default, Clone)]
pub struct LoggingPlayback;

#[async_trait]
impl Playback for LoggingPlayback {
    async fn play(&self, document: &OutputDocument, interruptible: bool) -> anyhow::Result<()> {
        for item in &document.items {
            match item {
                OutputItem::Speak(text) => info!("Prompt (interruptible={}): {}", interruptible, text),
                OutputItem::Audio(uri) => info!("Prompt audio (interruptible={}): {}", interruptible, uri),
            }
        }
        Ok(())
    }
}

/// Treats a WAV file on disk as the caller's recorded answer
#[derive(Debug, Clone)]
pub struct FileRecorder {
    path: PathBuf,
}

impl FileRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Recorder for FileRecorder {
    async fn record(&self, params: &RecordParams) -> anyhow::Result<Recording> {
        if !self.path.is_file() {
            anyhow::bail!("Recording not found: {}", self.path.display());
        }
        info!(
            "Using recording {} (initial_timeout={:?}, final_timeout={:?})",
            self.path.display(),
            params.initial_timeout,
            params.final_timeout
        );
        Ok(Recording {
            uri: format!("file://{}", self.path.display()),
            format: params.format,
        })
    }
}

/// Fallback that never collects anything
#[derive(Debug, Default, Clone)]
pub struct NoInputFallback;

#[async_trait]
impl FallbackCollector for NoInputFallback {
    async fn collect(&self, request: &AskRequest) -> anyhow::Result<AskResult> {
        info!(
            "DTMF collection is not available here; {} prompt(s) skipped",
            request.prompts.len()
        );
        Ok(AskResult::nomatch(InputMode::Dtmf))
    }
}
