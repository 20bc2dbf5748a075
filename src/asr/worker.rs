use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

use super::interface::{PendingRecognition, RecognitionClient, SpeechRequest, SpeechToText};
use super::types::RecognitionOutcome;

struct Job {
    id: Uuid,
    request: SpeechRequest,
    reply: oneshot::Sender<RecognitionOutcome>,
}

/// Cloneable handle to the recognizer worker task.
///
/// Submissions are queued on a channel and answered through one-shot
/// handles, so callers never block on the network. Each queued request runs
/// on its own task; a slow request does not hold up the ones behind it.
#[derive(Clone)]
pub struct RecognizerHandle {
    jobs: mpsc::UnboundedSender<Job>,
}

impl RecognizerHandle {
    /// Spawn the worker on the current tokio runtime
    pub fn spawn(backend: Arc<dyn SpeechToText>) -> Self {
        let (jobs, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run(backend, receiver));
        Self { jobs }
    }
}

impl RecognitionClient for RecognizerHandle {
    fn submit(&self, request: SpeechRequest) -> PendingRecognition {
        let id = Uuid::new_v4();
        let (reply, pending) = PendingRecognition::channel(id);

        if self.jobs.send(Job { id, request, reply }).is_err() {
            warn!("Recognizer worker is gone; request {} not sent", id);
            return PendingRecognition::ready(
                id,
                RecognitionOutcome::TransportError {
                    message: "recognizer worker is not running".to_string(),
                },
            );
        }

        pending
    }
}

async fn run(backend: Arc<dyn SpeechToText>, mut receiver: mpsc::UnboundedReceiver<Job>) {
    debug!("Recognizer worker started");

    while let Some(job) = receiver.recv().await {
        let backend = backend.clone();
        tokio::spawn(async move {
            debug!("Dispatching recognition request {} ({} bytes)", job.id, job.request.audio.len());
            let outcome = backend.speech_to_text(&job.request).await;
            if job.reply.send(outcome).is_err() {
                debug!("Discarding late response for recognition request {}", job.id);
            }
        });
    }

    debug!("Recognizer worker stopped");
}
