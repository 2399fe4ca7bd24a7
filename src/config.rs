use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

fn default_model() -> String {
    "gpt-4o-2024-11-20".to_string()
}

/// Completion-service settings. Environment variables win over the config
/// file; a missing key or base URL puts the assistant in offline mode rather
/// than failing startup.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file().unwrap_or_default();

        if let Some(key) = env_nonempty("OPENAI_API_KEY") {
            config.api_key = Some(key);
        }
        if let Some(url) = env_nonempty("OPENAI_BASE_URL") {
            config.base_url = Some(url);
        }
        if let Some(model) = env_nonempty("OPENAI_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("could not determine config directory"))?;
        Ok(config_dir.join("upstander").join("config.json"))
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_offline() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert!(config.base_url.is_none());
        assert_eq!(config.model, "gpt-4o-2024-11-20");
    }

    #[test]
    fn file_config_fills_missing_model() {
        let config: Config = serde_json::from_str(r#"{"api_key": "sk-test"}"#).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "gpt-4o-2024-11-20");
    }
}
