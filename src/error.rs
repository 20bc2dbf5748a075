use thiserror::Error;

/// Errors that escape an ask invocation.
///
/// Only caller misconfiguration is reported this way. Anything that goes
/// wrong after prompt playback starts resolves into a nomatch result instead.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("invalid ask parameters: {0}")]
    Parameter(String),
}

/// Errors raised inside the speech service adapter.
///
/// These never reach call-flow code; the recognizer worker reduces them to a
/// `RecognitionOutcome` before answering a submission.
#[derive(Debug, Error)]
pub enum AsrError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}
