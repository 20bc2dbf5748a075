use futures::future::{self, Future};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::classifier::classify;
use super::collaborators::{
    FallbackCollector, GrammarBuilder, OutputFormatter, Playback, RecordParams, Recorder,
};
use super::options::{AskDefaults, ResolvedOptions};
use super::request::AskRequest;
use super::result::AskResult;
use crate::asr::{RecognitionClient, SpeechRequest};
use crate::config_manager::SpeechServiceConfig;
use crate::error::AskError;
use crate::grammar::{Grammar, InputMode};

/// Telephony-side collaborators of an ask interaction
#[derive(Clone)]
pub struct Collaborators {
    pub grammar_builder: Arc<dyn GrammarBuilder>,
    pub formatter: Arc<dyn OutputFormatter>,
    pub playback: Arc<dyn Playback>,
    pub recorder: Arc<dyn Recorder>,
    pub fallback: Arc<dyn FallbackCollector>,
}

/// Runs ask interactions: prompt, record, recognize, classify.
///
/// Each call owns its own pending recognition, so one controller can serve
/// concurrent calls. Only invocation mistakes surface as errors; every
/// failure after I/O begins becomes a nomatch result.
#[derive(Clone)]
pub struct AskController {
    recognizer: Arc<dyn RecognitionClient>,
    collaborators: Collaborators,
    defaults: AskDefaults,
    speech_context: String,
}

impl AskController {
    pub fn new(
        recognizer: Arc<dyn RecognitionClient>,
        collaborators: Collaborators,
        defaults: AskDefaults,
    ) -> Self {
        Self {
            recognizer,
            collaborators,
            defaults,
            speech_context: SpeechServiceConfig::default().speech_context,
        }
    }

    pub fn with_speech_context(mut self, speech_context: impl Into<String>) -> Self {
        self.speech_context = speech_context.into();
        self
    }

    /// Prompt the caller and recognize their spoken answer
    pub async fn ask(&self, request: AskRequest) -> Result<AskResult, AskError> {
        self.run(request, None::<future::Ready<()>>).await
    }

    /// Like [`ask`](Self::ask), running `mask` (e.g. a hold tone) while the
    /// recognition response is pending. The mask is dropped as soon as the
    /// outcome arrives or the deadline passes.
    pub async fn ask_masked<F>(&self, request: AskRequest, mask: F) -> Result<AskResult, AskError>
    where
        F: Future<Output = ()>,
    {
        self.run(request, Some(mask)).await
    }

    async fn run<F>(&self, request: AskRequest, mask: Option<F>) -> Result<AskResult, AskError>
    where
        F: Future<Output = ()>,
    {
        let options = request.options.resolve(&self.defaults);
        options.validate()?;

        let grammars = self.collaborators.grammar_builder.build(&options);
        if grammars.len() > 1 {
            debug!("{} grammars supplied; only the first is used", grammars.len());
        }

        let grammar = match grammars.into_iter().next() {
            Some(grammar) if grammar.mode == InputMode::Voice => grammar,
            other => {
                debug!(
                    "Grammar mode is {}; delegating to fallback collector",
                    other.map(|g| g.mode.to_string()).unwrap_or_else(|| "unset".to_string())
                );
                return Ok(self.collect_fallback(&request).await);
            }
        };

        let started = Instant::now();
        let result = self.recognize(&request, &options, grammar, mask).await;
        info!(
            "Ask finished: status={:?}, utterance={:?}, elapsed={:?}",
            result.status(),
            result.utterance(),
            started.elapsed()
        );
        Ok(result)
    }

    async fn recognize<F>(
        &self,
        request: &AskRequest,
        options: &ResolvedOptions,
        grammar: Grammar,
        mask: Option<F>,
    ) -> AskResult
    where
        F: Future<Output = ()>,
    {
        if let Some(document) = self.collaborators.formatter.render(&request.prompts) {
            if let Err(e) = self
                .collaborators
                .playback
                .play(&document, options.interruptible)
                .await
            {
                warn!("Prompt playback failed: {:#}", e);
                return AskResult::nomatch(InputMode::Voice);
            }
        }

        let recording = match self
            .collaborators
            .recorder
            .record(&RecordParams::for_recognition())
            .await
        {
            Ok(recording) => recording,
            Err(e) => {
                warn!("Recording failed: {:#}", e);
                return AskResult::nomatch(InputMode::Voice);
            }
        };

        let audio = match self.collaborators.recorder.read_audio(&recording).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!("Could not read recording {}: {:#}", recording.uri, e);
                return AskResult::nomatch(InputMode::Voice);
            }
        };

        let pending = self.recognizer.submit(SpeechRequest {
            audio,
            format: recording.format,
            profile: self.speech_context.clone(),
            grammar: Some(grammar),
            language: options.language.clone(),
        });
        debug!("Submitted recognition request {}", pending.request_id());

        let deadline = options.recognition_deadline();
        let wait = pending.wait(deadline);
        let outcome = match mask {
            Some(mask) => {
                tokio::pin!(wait);
                tokio::select! {
                    outcome = &mut wait => outcome,
                    _ = mask => wait.await,
                }
            }
            None => wait.await,
        };

        classify(&outcome, options.min_confidence)
    }

    async fn collect_fallback(&self, request: &AskRequest) -> AskResult {
        match self.collaborators.fallback.collect(request).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Fallback input collection failed: {:#}", e);
                AskResult::nomatch(InputMode::Dtmf)
            }
        }
    }
}
