use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::interface::{SpeechRequest, SpeechToText};
use super::types::{parse_response, RecognitionOutcome};
use crate::config_manager::{SpeechServiceConfig, WatsonConfig};
use crate::error::AsrError;
use crate::grammar::{Grammar, GrammarValue};

const TOKEN_PATH: &str = "/oauth/token";
const SPEECH_PATH: &str = "/speech/v3/speechToText";
const SPEECH_CUSTOM_PATH: &str = "/speech/v3/speechToTextCustom";
const GRAMMAR_CONTEXT: &str = "GrammarList";

/// Tokens are refreshed this long before the service says they expire.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now + ChronoDuration::seconds(TOKEN_REFRESH_MARGIN_SECS) < expires_at,
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<Value>,
}

/// Expiry time for a token issued at `now`. The service sends `expires_in`
/// as a number or a numeric string; zero, or a lifetime too large to
/// represent, means the token does not expire.
fn token_expiry(expires_in: Option<&Value>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let seconds = match expires_in? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    if seconds <= 0 {
        return None;
    }
    now.checked_add_signed(ChronoDuration::try_seconds(seconds)?)
}

/// HTTP client for the AT&T speech-to-text API
pub struct WatsonClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    scope: String,
    token: Mutex<Option<AccessToken>>,
}

impl WatsonClient {
    pub fn new(asr: &WatsonConfig, service: &SpeechServiceConfig) -> Result<Self, AsrError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(service.request_timeout_secs))
            .build()?;

        info!("Initialized WatsonClient: base_url={}, scope={}", service.base_url, service.scope);

        Ok(Self {
            client,
            base_url: service.base_url.trim_end_matches('/').to_string(),
            api_key: asr.api_key.clone(),
            api_secret: asr.api_secret.clone(),
            scope: service.scope.clone(),
            token: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, fetching a new one when the cached token is stale
    async fn access_token(&self) -> Result<String, AsrError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.value.clone());
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<AccessToken, AsrError> {
        let url = format!("{}{}", self.base_url, TOKEN_PATH);
        debug!("Requesting access token from {}", url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.api_secret.as_str()),
                ("grant_type", "client_credentials"),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AsrError::Auth(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AsrError::Auth(format!("unreadable token response: {}", e)))?;

        Ok(AccessToken {
            expires_at: token_expiry(token.expires_in.as_ref(), Utc::now()),
            value: token.access_token,
        })
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// Send one recognition request and read the service's answer
    pub async fn recognize(&self, request: &SpeechRequest) -> Result<RecognitionOutcome, AsrError> {
        let token = self.access_token().await?;

        let mut builder = match custom_grammar(request.grammar.as_ref()) {
            Some((grammar_type, grammar)) => {
                let boundary = format!("watson-ask-{}", Uuid::new_v4().simple());
                let body = srgs_audio_body(
                    &boundary,
                    grammar_type,
                    grammar,
                    request.format.content_type(),
                    &request.audio,
                );
                self.client
                    .post(format!("{}{}", self.base_url, SPEECH_CUSTOM_PATH))
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/x-srgs-audio; boundary={}", boundary),
                    )
                    .header("X-SpeechContext", GRAMMAR_CONTEXT)
                    .body(body)
            }
            None => self
                .client
                .post(format!("{}{}", self.base_url, SPEECH_PATH))
                .header(header::CONTENT_TYPE, request.format.content_type())
                .header("X-SpeechContext", request.profile.as_str())
                .body(request.audio.clone()),
        };

        builder = builder
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json");
        if let Some(language) = &request.language {
            builder = builder.header(header::CONTENT_LANGUAGE, language.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("Speech service answered HTTP {}: {}", status.as_u16(), body);

        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
        }

        if status.is_success() {
            return Ok(parse_response(&body));
        }

        match parse_response(&body) {
            outcome @ RecognitionOutcome::ServiceError { .. } => Ok(outcome),
            _ => Err(AsrError::Status {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

#[async_trait]
impl SpeechToText for WatsonClient {
    async fn speech_to_text(&self, request: &SpeechRequest) -> RecognitionOutcome {
        match self.recognize(request).await {
            Ok(RecognitionOutcome::ServiceError { message }) => {
                error!("Speech service reported an error: {}", message);
                RecognitionOutcome::ServiceError { message }
            }
            Ok(outcome) => outcome,
            Err(e @ (AsrError::Auth(_) | AsrError::Status { .. })) => {
                error!("Speech service rejected request: {}", e);
                RecognitionOutcome::ServiceError { message: e.to_string() }
            }
            Err(e @ AsrError::Transport(_)) => {
                error!("Speech service unreachable: {}", e);
                RecognitionOutcome::TransportError { message: e.to_string() }
            }
        }
    }
}

/// Grammar body to send with the audio, if any. Builtin grammars map onto
/// the plain speech context instead.
fn custom_grammar(grammar: Option<&Grammar>) -> Option<(&'static str, &str)> {
    match &grammar?.value {
        GrammarValue::Inline(content) => Some(("application/srgs+xml", content.as_str())),
        GrammarValue::Url(url) => Some(("text/uri-list", url.as_str())),
        GrammarValue::Builtin(_) => None,
    }
}

/// Build a `multipart/x-srgs-audio` body: the grammar part first, then the audio.
fn srgs_audio_body(
    boundary: &str,
    grammar_type: &str,
    grammar: &str,
    audio_type: &str,
    audio: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(audio.len() + grammar.len() + 256);

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"x-grammar\"\r\n");
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", grammar_type).as_bytes());
    body.extend_from_slice(grammar.as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"x-voice\"\r\n");
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", audio_type).as_bytes());
    body.extend_from_slice(audio);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}
