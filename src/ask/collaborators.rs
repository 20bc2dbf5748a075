//! Narrow interfaces to the telephony side of an ask interaction.

use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

use super::options::ResolvedOptions;
use super::request::{AskRequest, Prompt};
use super::result::AskResult;
use crate::asr::AudioFormat;
use crate::grammar::Grammar;
use crate::output::OutputDocument;

/// Turns resolved options into grammars, most preferred first
pub trait GrammarBuilder: Send + Sync {
    fn build(&self, options: &ResolvedOptions) -> Vec<Grammar>;
}

/// Renders prompts into something playable; `None` when there is nothing to say
pub trait OutputFormatter: Send + Sync {
    fn render(&self, prompts: &[Prompt]) -> Option<OutputDocument>;
}

#[async_trait]
pub trait Playback: Send + Sync {
    /// Play `document` to the caller, returning once playback completes.
    /// Barge-in handling for interruptible prompts belongs to the implementation.
    async fn play(&self, document: &OutputDocument, interruptible: bool) -> anyhow::Result<()>;
}

/// Which side of the call is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDirection {
    /// Audio sent by the caller only
    Inbound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordParams {
    pub start_beep: bool,
    /// Silence allowed before the caller starts speaking
    pub initial_timeout: Duration,
    /// Silence that ends the recording once speech has started
    pub final_timeout: Duration,
    pub format: AudioFormat,
    pub direction: RecordDirection,
}

impl RecordParams {
    /// Fixed parameters used to capture audio for recognition
    pub fn for_recognition() -> Self {
        Self {
            start_beep: false,
            initial_timeout: Duration::from_secs(4),
            final_timeout: Duration::from_secs(1),
            format: AudioFormat::Wav,
            direction: RecordDirection::Inbound,
        }
    }
}

/// Captured audio, valid for the duration of one ask interaction
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub uri: String,
    pub format: AudioFormat,
}

#[async_trait]
pub trait Recorder: Send + Sync {
    /// Record until the telephony layer reports completion
    async fn record(&self, params: &RecordParams) -> anyhow::Result<Recording>;

    /// Load the recorded bytes. The default reads a local `file://` URI or path.
    async fn read_audio(&self, recording: &Recording) -> anyhow::Result<Vec<u8>> {
        let path = recording
            .uri
            .strip_prefix("file://")
            .unwrap_or(&recording.uri);
        tokio::fs::read(path)
            .await
            .with_context(|| format!("reading recording {}", path))
    }
}

/// Collects input without speech recognition, e.g. DTMF digits
#[async_trait]
pub trait FallbackCollector: Send + Sync {
    async fn collect(&self, request: &AskRequest) -> anyhow::Result<AskResult>;
}
