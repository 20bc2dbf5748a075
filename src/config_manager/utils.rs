use std::fs;
use std::path::Path;
use anyhow::Result;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::config_manager::main::Config;

/// Read JSON-LD configuration file with environment variable substitution
pub fn read_jsonld(config_path: &str) -> Result<Value> {
    let content = read_config_text(config_path)?;
    let json_value: Value = serde_json::from_str(&content)?;
    Ok(json_value)
}

/// Read YAML configuration file with environment variable substitution
pub fn read_yaml(config_path: &str) -> Result<Value> {
    let content = read_config_text(config_path)?;
    let yaml_value: Value = serde_yaml::from_str(&content)?;
    Ok(yaml_value)
}

fn read_config_text(config_path: &str) -> Result<String> {
    if !Path::new(config_path).exists() {
        anyhow::bail!("Configuration file not found: {}", config_path);
    }

    let content = load_text_file_with_guess_encoding(config_path)?;
    if content.trim().is_empty() {
        anyhow::bail!("Configuration file is empty: {}", config_path);
    }

    substitute_env_vars(&content)
}

/// Replace `${VAR_NAME}` with the variable's value; unknown variables are left as written
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let replaced = pattern.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });
    Ok(replaced.into_owned())
}

/// Validate configuration data against the Config model
pub fn validate_config(config_data: &Value) -> Result<Config> {
    let config: Config = serde_json::from_value(config_data.clone())?;

    let min_confidence = config.asr_config.min_confidence;
    if !(0.0..=1.0).contains(&min_confidence) {
        anyhow::bail!("min_confidence must be between 0 and 1, got {}", min_confidence);
    }
    if config.asr_config.timeout == Some(0) {
        anyhow::bail!("timeout must be at least one second");
    }
    if !config.asr_config.has_credentials() {
        debug!("No speech API credentials configured");
    }

    Ok(config)
}

/// Load text file with encoding detection
pub fn load_text_file_with_guess_encoding(file_path: &str) -> Result<String> {
    let mut bytes = fs::read(file_path)?;

    // Strip UTF-8 BOM
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(0..3);
    }

    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(err) => {
            let bytes = err.into_bytes();
            let (cow, _, had_errors) = encoding_rs::GBK.decode(&bytes);
            if had_errors {
                debug!("Configuration {} is not valid UTF-8 or GBK; decoding lossily", file_path);
                let (cow, _, _) = encoding_rs::UTF_8.decode(&bytes);
                return Ok(cow.into_owned());
            }
            Ok(cow.into_owned())
        }
    }
}

/// Save configuration to JSON-LD file
pub fn save_config(config: &Config, config_path: &Path) -> Result<()> {
    let mut config_data = serde_json::to_value(config)?;

    let mut context_obj = serde_json::Map::new();
    context_obj.insert("@vocab".to_string(), Value::String("https://watson-ask.example.org/config#".to_string()));
    context_obj.insert("asr_config".to_string(), Value::String("https://watson-ask.example.org/config#WatsonConfig".to_string()));
    context_obj.insert("service_config".to_string(), Value::String("https://watson-ask.example.org/config#SpeechServiceConfig".to_string()));

    if let Value::Object(ref mut obj) = config_data {
        obj.insert("@context".to_string(), Value::Object(context_obj));
    }

    let json_string = serde_json::to_string_pretty(&config_data)?;
    fs::write(config_path, json_string)?;
    Ok(())
}
