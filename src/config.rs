//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use crate::Result;
use crate::error::Error;

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Decision engine provider ("openai" for any OpenAI-compatible API)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// API key for the provider
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the chat completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum Deciding/Executing round trips per run
    #[serde(default = "default_max_round_trips")]
    pub max_round_trips: usize,

    /// Retries for transient engine failures
    #[serde(default = "default_max_engine_retries")]
    pub max_engine_retries: usize,

    /// Initial retry delay, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Replaces the built-in system instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_round_trips() -> usize {
    20
}

fn default_max_engine_retries() -> usize {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_round_trips: default_max_round_trips(),
            max_engine_retries: default_max_engine_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            system_prompt: None,
        }
    }
}

impl Config {
    /// Fill an empty API key from the environment
    pub fn apply_env(&mut self) {
        if self.api_key.is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                debug!("Using API key from {}", API_KEY_ENV);
                self.api_key = key;
            }
        }
    }
}

/// Get the config directory path
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ponder")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Load configuration from the default location.
///
/// A missing file yields the defaults; the environment fills the API key.
pub fn load() -> Result<Config> {
    let path = config_path();
    let mut config = if path.exists() {
        load_from(&path)?
    } else {
        debug!("No config at {:?}, using defaults", path);
        Config::default()
    };
    config.apply_env();
    Ok(config)
}

/// Load configuration from a specific file
pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(Error::Config(format!("Config not found at {:?}", path)));
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    // Create parent directory
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Write a default config file unless one exists. Returns the path.
pub fn init(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Err(Error::Config(format!("Config already exists at {:?}", path)));
    }
    save_to(&Config::default(), path)?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.max_round_trips, 20);
        assert_eq!(config.provider, "openai");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.max_engine_retries, config.max_engine_retries);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = serde_json::from_str(r#"{"model": "gpt-4o-mini", "max_round_trips": 5}"#).unwrap();
        assert_eq!(parsed.model, "gpt-4o-mini");
        assert_eq!(parsed.max_round_trips, 5);
        assert_eq!(parsed.base_url, "https://api.openai.com/v1");
        assert!(parsed.system_prompt.is_none());
    }

    #[test]
    fn test_init_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        init(&path).unwrap();
        assert!(init(&path).is_err());

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.model, "gpt-4");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_from(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
