use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ask::collaborators::GrammarBuilder;
use crate::ask::options::ResolvedOptions;

/// Builtin voice grammar used when a timeout is the only termination condition.
pub const GENERIC_SPEECH_GRAMMAR: &str = "builtin:speech/generic";

/// Input modality of a grammar or result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Voice,
    Dtmf,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Voice => write!(f, "voice"),
            InputMode::Dtmf => write!(f, "dtmf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum GrammarValue {
    /// SRGS document supplied by the caller
    Inline(String),
    /// Grammar hosted elsewhere
    Url(String),
    /// Platform builtin, e.g. `builtin:dtmf/digits?maxlength=4`
    Builtin(String),
}

/// A constraint on acceptable input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    pub mode: InputMode,
    pub value: GrammarValue,
}

impl Grammar {
    pub fn voice(value: GrammarValue) -> Self {
        Self { mode: InputMode::Voice, value }
    }

    pub fn dtmf(value: GrammarValue) -> Self {
        Self { mode: InputMode::Dtmf, value }
    }
}

/// Default grammar builder for ask invocations.
///
/// Explicit grammars win and keep their order. Without them, digit limits or
/// a terminator describe a DTMF collection; a bare timeout asks the service
/// for open dictation. Only grammar descriptors are produced here.
#[derive(Debug, Default, Clone)]
pub struct AskGrammarBuilder;

impl GrammarBuilder for AskGrammarBuilder {
    fn build(&self, options: &ResolvedOptions) -> Vec<Grammar> {
        if !options.grammars.is_empty() {
            return options.grammars.clone();
        }

        if options.limit.is_some() || options.terminator.is_some() {
            return vec![Grammar::dtmf(GrammarValue::Builtin(dtmf_digits_uri(
                options.limit,
                options.terminator,
            )))];
        }

        if options.timeout.is_some() {
            return vec![Grammar::voice(GrammarValue::Builtin(
                GENERIC_SPEECH_GRAMMAR.to_string(),
            ))];
        }

        Vec::new()
    }
}

fn dtmf_digits_uri(limit: Option<u32>, terminator: Option<char>) -> String {
    let mut params = vec!["minlength=1".to_string()];
    if let Some(limit) = limit {
        params.push(format!("maxlength={}", limit));
    }
    if let Some(terminator) = terminator {
        params.push(format!("terminator={}", terminator));
    }
    format!("builtin:dtmf/digits?{}", params.join(";"))
}
