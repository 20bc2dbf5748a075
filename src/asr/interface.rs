use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::types::RecognitionOutcome;
use crate::grammar::Grammar;

/// Encoding of a recorded audio payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// Uncompressed linear PCM in a WAV container
    Wav,
}

impl AudioFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
        }
    }
}

/// Everything the speech service needs to recognize one utterance
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub audio: Vec<u8>,
    pub format: AudioFormat,
    /// Speech context, e.g. "Generic"
    pub profile: String,
    pub grammar: Option<Grammar>,
    pub language: Option<String>,
}

/// Submits recognition requests without blocking the caller
pub trait RecognitionClient: Send + Sync {
    /// Queue `request` and return a handle to its eventual outcome
    fn submit(&self, request: SpeechRequest) -> PendingRecognition;
}

/// Performs one recognition round trip against a speech service
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn speech_to_text(&self, request: &SpeechRequest) -> RecognitionOutcome;
}

/// Handle to a recognition request that is in flight
#[derive(Debug)]
pub struct PendingRecognition {
    request_id: Uuid,
    receiver: oneshot::Receiver<RecognitionOutcome>,
}

impl PendingRecognition {
    /// Create a handle along with the sender that will answer it
    pub fn channel(request_id: Uuid) -> (oneshot::Sender<RecognitionOutcome>, Self) {
        let (sender, receiver) = oneshot::channel();
        (sender, Self { request_id, receiver })
    }

    /// A handle that is already answered
    pub fn ready(request_id: Uuid, outcome: RecognitionOutcome) -> Self {
        let (sender, pending) = Self::channel(request_id);
        let _ = sender.send(outcome);
        pending
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Wait at most `deadline` for the outcome.
    ///
    /// Expiry yields [`RecognitionOutcome::TimedOut`]. The request itself is
    /// not cancelled; a response arriving later is dropped by the sender.
    pub async fn wait(self, deadline: Duration) -> RecognitionOutcome {
        match tokio::time::timeout(deadline, self.receiver).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => RecognitionOutcome::TransportError {
                message: "recognizer dropped the request without answering".to_string(),
            },
            Err(_) => RecognitionOutcome::TimedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ready_handle_resolves_immediately() {
        let pending = PendingRecognition::ready(
            Uuid::new_v4(),
            RecognitionOutcome::ServiceError { message: "boom".to_string() },
        );

        assert_eq!(
            pending.wait(Duration::from_millis(10)).await,
            RecognitionOutcome::ServiceError { message: "boom".to_string() }
        );
    }

    #[tokio::test]
    async fn unanswered_handle_times_out() {
        let (_sender, pending) = PendingRecognition::channel(Uuid::new_v4());

        assert_eq!(
            pending.wait(Duration::from_millis(20)).await,
            RecognitionOutcome::TimedOut
        );
    }

    #[tokio::test]
    async fn dropped_sender_is_a_transport_error() {
        let (sender, pending) = PendingRecognition::channel(Uuid::new_v4());
        drop(sender);

        assert!(matches!(
            pending.wait(Duration::from_secs(1)).await,
            RecognitionOutcome::TransportError { .. }
        ));
    }
}
