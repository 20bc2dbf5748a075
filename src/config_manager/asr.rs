use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Recognizer defaults applied to every ask invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatsonConfig {
    /// Minimum confidence a hypothesis needs to be accepted as a match.
    #[serde(rename = "min_confidence")]
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Seconds to wait for a recognition response. `null` leaves the
    /// timeout unset so callers must supply a termination condition.
    #[serde(default = "default_timeout")]
    pub timeout: Option<u64>,

    /// Language sent with recognition requests. `null` uses the platform default.
    #[serde(rename = "input_language")]
    #[serde(default = "default_input_language")]
    pub input_language: Option<String>,

    #[serde(rename = "api_key")]
    #[serde(default)]
    pub api_key: String,

    #[serde(rename = "api_secret")]
    #[serde(default)]
    pub api_secret: String,
}

fn default_min_confidence() -> f64 {
    0.5
}

fn default_timeout() -> Option<u64> {
    Some(5)
}

fn default_input_language() -> Option<String> {
    Some("en-US".to_string())
}

impl WatsonConfig {
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

impl Default for WatsonConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            timeout: default_timeout(),
            input_language: default_input_language(),
            api_key: String::new(),
            api_secret: String::new(),
        }
    }
}

/// Endpoint settings for the remote speech service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechServiceConfig {
    #[serde(rename = "base_url")]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth scope requested with the client credentials.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Value of `X-SpeechContext` for requests without a grammar.
    #[serde(rename = "speech_context")]
    #[serde(default = "default_speech_context")]
    pub speech_context: String,

    #[serde(rename = "request_timeout_secs")]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.att.com".to_string()
}

fn default_scope() -> String {
    "SPEECH".to_string()
}

fn default_speech_context() -> String {
    "Generic".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for SpeechServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            scope: default_scope(),
            speech_context: default_speech_context(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
