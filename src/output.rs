use serde::{Deserialize, Serialize};

use crate::ask::{OutputFormatter, Prompt};
use crate::utils::sentence_divider::split_sentences;
use crate::utils::tts_preprocessor::{tts_filter, SpeechFilter};

/// One playable element of a rendered prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum OutputItem {
    /// A sentence for speech synthesis
    Speak(String),
    /// Audio file URI or path
    Audio(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub items: Vec<OutputItem>,
}

impl OutputDocument {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Renders text prompts as filtered sentences and passes audio through
#[derive(Debug, Clone, Default)]
pub struct PlainOutputFormatter {
    filter: SpeechFilter,
}

impl OutputFormatter for PlainOutputFormatter {
    fn render(&self, prompts: &[Prompt]) -> Option<OutputDocument> {
        let mut document = OutputDocument::default();

        for prompt in prompts {
            match prompt {
                Prompt::Text(text) => {
                    let cleaned = tts_filter(text, &self.filter);
                    document
                        .items
                        .extend(split_sentences(&cleaned).into_iter().map(OutputItem::Speak));
                }
                Prompt::Audio(uri) => document.items.push(OutputItem::Audio(uri.clone())),
            }
        }

        if document.is_empty() {
            None
        } else {
            Some(document)
        }
    }
}
