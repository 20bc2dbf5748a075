use std::time::Duration;

use crate::config_manager::WatsonConfig;
use crate::error::AskError;
use crate::grammar::Grammar;

/// Acceptance threshold used when neither the caller nor the configuration sets one.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Recognition deadline used when no timeout is resolved (digit-only asks).
pub const DEFAULT_RECOGNITION_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-call overrides supplied by call-flow code
#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    /// Time to wait for recognition, and between DTMF digits on fallback
    pub timeout: Option<Duration>,
    /// Stop DTMF collection after this many digits
    pub limit: Option<u32>,
    /// DTMF digit that ends input
    pub terminator: Option<char>,
    /// Explicit grammars; only the first is executed
    pub grammars: Vec<Grammar>,
    pub min_confidence: Option<f64>,
    pub language: Option<String>,
    /// Whether caller input may cut the prompt short (default true)
    pub interruptible: Option<bool>,
}

/// Process-wide defaults, fixed at startup
#[derive(Debug, Clone, PartialEq)]
pub struct AskDefaults {
    pub timeout: Option<Duration>,
    pub min_confidence: Option<f64>,
    pub language: Option<String>,
}

impl AskDefaults {
    pub fn from_config(config: &WatsonConfig) -> Self {
        Self {
            timeout: config.timeout_duration(),
            min_confidence: Some(config.min_confidence),
            language: config.input_language.clone(),
        }
    }
}

/// Options after merging call-site values over defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub timeout: Option<Duration>,
    pub limit: Option<u32>,
    pub terminator: Option<char>,
    pub grammars: Vec<Grammar>,
    pub min_confidence: f64,
    pub language: Option<String>,
    pub interruptible: bool,
}

impl AskOptions {
    /// Merge these overrides onto `defaults`.
    ///
    /// Precedence is call-site value, then process default, then the
    /// hard-coded constant. A missing timeout stays missing so validation can
    /// tell whether the caller configured a termination condition.
    pub fn resolve(&self, defaults: &AskDefaults) -> ResolvedOptions {
        ResolvedOptions {
            timeout: self.timeout.or(defaults.timeout),
            limit: self.limit,
            terminator: self.terminator,
            grammars: self.grammars.clone(),
            min_confidence: self
                .min_confidence
                .or(defaults.min_confidence)
                .unwrap_or(DEFAULT_MIN_CONFIDENCE),
            language: self.language.clone().or_else(|| defaults.language.clone()),
            interruptible: self.interruptible.unwrap_or(true),
        }
    }
}

impl ResolvedOptions {
    pub fn has_termination_condition(&self) -> bool {
        self.timeout.is_some()
            || self.limit.is_some()
            || self.terminator.is_some()
            || !self.grammars.is_empty()
    }

    pub fn validate(&self) -> Result<(), AskError> {
        if !self.has_termination_condition() {
            return Err(AskError::Parameter(
                "You must specify at least one of limit, terminator, timeout or grammar".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(AskError::Parameter(format!(
                "min_confidence must be between 0 and 1, got {}",
                self.min_confidence
            )));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(AskError::Parameter("timeout must be greater than zero".to_string()));
        }
        if self.limit == Some(0) {
            return Err(AskError::Parameter("limit must be at least one digit".to_string()));
        }
        Ok(())
    }

    pub fn recognition_deadline(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_RECOGNITION_TIMEOUT)
    }
}
