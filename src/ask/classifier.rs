use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::result::AskResult;
use crate::asr::{Hypothesis, RecognitionOutcome, STATUS_NOT_RECOGNIZED, STATUS_OK};
use crate::grammar::InputMode;

/// Map a recognition outcome onto a caller-visible result.
///
/// Only a recognized "OK" response whose best hypothesis has non-empty text
/// and reaches `min_confidence` is a match. Everything else is a nomatch.
/// Service and transport failures were already reported by the adapter and
/// are only traced here.
pub fn classify(outcome: &RecognitionOutcome, min_confidence: f64) -> AskResult {
    match outcome {
        RecognitionOutcome::ServiceError { message } => {
            debug!("Speech service error: {}", message);
            AskResult::nomatch(InputMode::Voice)
        }
        RecognitionOutcome::TransportError { message } => {
            debug!("Recognition request failed: {}", message);
            AskResult::nomatch(InputMode::Voice)
        }
        RecognitionOutcome::Malformed { reason, raw } => {
            warn!("Unreadable recognition response ({}): {}", reason, raw);
            AskResult::nomatch(InputMode::Voice)
        }
        RecognitionOutcome::TimedOut => {
            warn!("No recognition response before the deadline");
            AskResult::nomatch(InputMode::Voice)
        }
        RecognitionOutcome::Recognized(recognition) => {
            debug!("Recognition result: {:?}", recognition);

            match (recognition.status.as_str(), recognition.best.as_ref()) {
                (STATUS_OK, Some(best)) if best.confidence >= min_confidence => {
                    AskResult::matched(
                        InputMode::Voice,
                        best.text.clone(),
                        interpretation(best),
                        best.confidence,
                    )
                    .unwrap_or_else(|| {
                        warn!("Recognition {:?} returned empty text", recognition.response_id);
                        AskResult::nomatch(InputMode::Voice)
                    })
                }
                (STATUS_OK, Some(best)) => {
                    debug!(
                        "Rejecting '{}': confidence {} below {}",
                        best.text, best.confidence, min_confidence
                    );
                    AskResult::nomatch(InputMode::Voice)
                }
                (STATUS_OK, None) => {
                    warn!("Recognition {:?} reported OK without a hypothesis", recognition.response_id);
                    AskResult::nomatch(InputMode::Voice)
                }
                (STATUS_NOT_RECOGNIZED, _) => AskResult::nomatch(InputMode::Voice),
                (status, _) => {
                    debug!("Treating recognition status '{}' as nomatch", status);
                    AskResult::nomatch(InputMode::Voice)
                }
            }
        }
    }
}

/// Semantic payload of a match: a document keyed by slot name when the
/// service returned NLU slots, otherwise the utterance itself.
fn interpretation(best: &Hypothesis) -> Value {
    if best.slots.is_empty() {
        return Value::String(best.text.clone());
    }

    let slots: Map<String, Value> = best
        .slots
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect();
    Value::Object(slots)
}
