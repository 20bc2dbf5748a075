use serde::{Deserialize, Serialize};
use crate::config_manager::asr::{SpeechServiceConfig, WatsonConfig};

/// Main configuration for the plugin, stored as JSON-LD or YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "@context")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,

    #[serde(rename = "asr_config")]
    #[serde(default)]
    pub asr_config: WatsonConfig,

    #[serde(rename = "service_config")]
    #[serde(default)]
    pub service_config: SpeechServiceConfig,
}

impl Config {
    /// Load configuration from a JSON-LD or YAML file, chosen by extension
    pub fn load(path: &str) -> anyhow::Result<Self> {
        use crate::config_manager::utils::{read_jsonld, read_yaml, validate_config};

        let path_lower = path.to_lowercase();
        let value = if path_lower.ends_with(".jsonld") || path_lower.ends_with(".json") {
            read_jsonld(path)?
        } else {
            read_yaml(path)?
        };
        validate_config(&value)
    }
}
