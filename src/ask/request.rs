use serde::{Deserialize, Serialize};

use super::options::AskOptions;

/// A playable item: text for speech synthesis or a reference to an audio file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Prompt {
    Text(String),
    Audio(String),
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::Text(text.to_string())
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::Text(text)
    }
}

/// One ask invocation: what to say, and how to listen
#[derive(Debug, Clone, Default)]
pub struct AskRequest {
    pub prompts: Vec<Prompt>,
    pub options: AskOptions,
}

impl AskRequest {
    pub fn new<I, P>(prompts: I, options: AskOptions) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Prompt>,
    {
        Self {
            prompts: prompts.into_iter().map(Into::into).collect(),
            options,
        }
    }
}
