use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grammar::InputMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Match,
    Nomatch,
}

/// Normalized outcome of an ask interaction.
///
/// Built only through [`AskResult::matched`] and [`AskResult::nomatch`], so a
/// match always carries a non-blank utterance, an interpretation and a
/// confidence, and a nomatch carries none of them. The confidence threshold
/// is applied by the classifier, not here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskResult {
    status: ResultStatus,
    mode: InputMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    utterance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interpretation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
}

impl AskResult {
    /// A match, or `None` when the utterance is empty or only whitespace
    pub fn matched(
        mode: InputMode,
        utterance: impl Into<String>,
        interpretation: Value,
        confidence: f64,
    ) -> Option<Self> {
        let utterance = utterance.into();
        if utterance.trim().is_empty() {
            return None;
        }
        Some(Self {
            status: ResultStatus::Match,
            mode,
            utterance: Some(utterance),
            interpretation: Some(interpretation),
            confidence: Some(confidence),
        })
    }

    pub fn nomatch(mode: InputMode) -> Self {
        Self {
            status: ResultStatus::Nomatch,
            mode,
            utterance: None,
            interpretation: None,
            confidence: None,
        }
    }

    pub fn status(&self) -> ResultStatus {
        self.status
    }

    pub fn is_match(&self) -> bool {
        self.status == ResultStatus::Match
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn utterance(&self) -> Option<&str> {
        self.utterance.as_deref()
    }

    pub fn interpretation(&self) -> Option<&Value> {
        self.interpretation.as_ref()
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }
}
