use serde::Deserialize;
use std::collections::BTreeMap;

/// Status reported when the best hypothesis was recognized.
pub const STATUS_OK: &str = "OK";
/// Status reported when the service heard audio but could not recognize it.
pub const STATUS_NOT_RECOGNIZED: &str = "Speech Not Recognized";

/// What came back (or didn't) for one recognition request
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionOutcome {
    Recognized(Recognition),
    /// Error envelope or message returned by the service
    ServiceError { message: String },
    /// Network failure, or the request never reached the service
    TransportError { message: String },
    /// Body that could not be read into a usable envelope
    Malformed { reason: String, raw: String },
    /// No response arrived before the deadline
    TimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub status: String,
    pub response_id: Option<String>,
    pub best: Option<Hypothesis>,
}

/// Top-ranked candidate of the n-best list
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub text: String,
    pub confidence: f64,
    /// NLU output keyed by slot (grammar rule) name
    pub slots: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SpeechResponse {
    recognition: Option<WireRecognition>,
    request_error: Option<WireRequestError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireRecognition {
    status: Option<String>,
    response_id: Option<String>,
    #[serde(rename = "NBest", default)]
    n_best: Option<OneOrMany<WireNBest>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn first(self) -> Option<T> {
        match self {
            OneOrMany::Many(items) => items.into_iter().next(),
            OneOrMany::One(item) => Some(item),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireNBest {
    hypothesis: Option<String>,
    result_text: Option<String>,
    confidence: Option<f64>,
    nlu_hypothesis: Option<WireNluHypothesis>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireNluHypothesis {
    #[serde(default)]
    out_composite: Vec<WireOutComposite>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireOutComposite {
    grammar: Option<String>,
    out: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireRequestError {
    service_exception: Option<WireException>,
    policy_exception: Option<WireException>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireException {
    message_id: Option<String>,
    text: Option<String>,
    variables: Option<String>,
}

impl WireException {
    fn describe(&self) -> String {
        let mut text = self.text.clone().unwrap_or_else(|| "unspecified error".to_string());
        if let Some(variables) = self.variables.as_deref().filter(|v| !v.is_empty()) {
            // Variables are comma separated and fill %1, %2, ... in order
            for (i, value) in variables.split(',').enumerate() {
                text = text.replace(&format!("%{}", i + 1), value.trim());
            }
        }
        match &self.message_id {
            Some(id) => format!("{}: {}", id, text),
            None => text,
        }
    }
}

impl WireRequestError {
    fn describe(&self) -> String {
        self.service_exception
            .as_ref()
            .or(self.policy_exception.as_ref())
            .map(WireException::describe)
            .unwrap_or_else(|| "request error without exception details".to_string())
    }
}

/// Parse a response body from the speech service.
///
/// Never fails: bodies that are not JSON, or that claim success without a
/// usable best hypothesis, come back as [`RecognitionOutcome::Malformed`]
/// carrying the raw text.
pub fn parse_response(body: &str) -> RecognitionOutcome {
    let malformed = |reason: &str| RecognitionOutcome::Malformed {
        reason: reason.to_string(),
        raw: body.to_string(),
    };

    let response: SpeechResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => return malformed(&format!("invalid JSON: {}", e)),
    };

    if let Some(request_error) = response.request_error {
        return RecognitionOutcome::ServiceError {
            message: request_error.describe(),
        };
    }

    let Some(recognition) = response.recognition else {
        return malformed("response has neither Recognition nor RequestError");
    };
    let Some(status) = recognition.status else {
        return malformed("Recognition.Status is missing");
    };

    let n_best = recognition.n_best.and_then(OneOrMany::first);

    if status == STATUS_OK {
        let Some(n_best) = n_best else {
            return malformed("status OK without an NBest entry");
        };
        let Some(text) = n_best.result_text.or(n_best.hypothesis) else {
            return malformed("NBest entry has neither ResultText nor Hypothesis");
        };
        let Some(confidence) = n_best.confidence else {
            return malformed("NBest entry has no Confidence");
        };
        return RecognitionOutcome::Recognized(Recognition {
            status,
            response_id: recognition.response_id,
            best: Some(Hypothesis {
                text,
                confidence,
                slots: collect_slots(n_best.nlu_hypothesis),
            }),
        });
    }

    // Other statuses never produce a match; keep whatever hypothesis is readable
    let best = n_best.and_then(|n| {
        let text = n.result_text.or(n.hypothesis)?;
        Some(Hypothesis {
            text,
            confidence: n.confidence?,
            slots: collect_slots(n.nlu_hypothesis),
        })
    });

    RecognitionOutcome::Recognized(Recognition {
        status,
        response_id: recognition.response_id,
        best,
    })
}

fn collect_slots(nlu: Option<WireNluHypothesis>) -> BTreeMap<String, String> {
    nlu.map(|nlu| {
        nlu.out_composite
            .into_iter()
            .filter_map(|c| Some((c.grammar?, c.out?)))
            .collect()
    })
    .unwrap_or_default()
}
