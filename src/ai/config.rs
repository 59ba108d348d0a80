//! AI configuration: loads optional ~/.chordsmith/ai.yaml for LLM settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Endpoint used when `api_url` is left empty.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Model used when `model` is left empty.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Environment variable consulted when the file carries no key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// AI configuration loaded from ~/.chordsmith/ai.yaml.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AiConfig {
    /// Whether AI features are enabled.
    #[serde(default)]
    pub enabled: bool,
    /// LLM provider name (e.g., "openai").
    #[serde(default)]
    pub provider: String,
    /// API base URL.
    #[serde(default)]
    pub api_url: String,
    /// API key (secret).
    #[serde(default)]
    pub api_key: String,
    /// Model identifier.
    #[serde(default)]
    pub model: String,
}

impl AiConfig {
    /// Fill empty fields: URL and model defaults, key from the environment.
    pub fn resolved(mut self) -> Self {
        if self.api_url.trim().is_empty() {
            self.api_url = DEFAULT_API_URL.to_string();
        }
        if self.model.trim().is_empty() {
            self.model = DEFAULT_MODEL.to_string();
        }
        if self.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.api_key = key;
            }
        }
        self
    }

    /// Enabled and holding a key.
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }
}

/// Get the AI config file path.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".chordsmith").join("ai.yaml"))
}

/// Load AI configuration from a YAML file.
pub fn load_config_from(path: &Path) -> Result<AiConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Load AI configuration from ~/.chordsmith/ai.yaml.
/// Returns None if the file doesn't exist or cannot be parsed.
pub fn load_config() -> Option<AiConfig> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }
    match load_config_from(&path) {
        Ok(config) => Some(config.resolved()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring AI config");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_disabled() {
        let config = AiConfig::default();
        assert!(!config.enabled);
        assert!(config.api_key.is_empty());
        assert!(!config.is_usable());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = Path::new("/nonexistent/chordsmith/ai.yaml");
        assert!(matches!(load_config_from(path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn malformed_file_is_a_yaml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai.yaml");
        std::fs::write(&path, "enabled: [yes").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn parse_yaml_config() {
        let yaml = r#"
enabled: true
provider: openai
api_url: https://api.openai.com/v1
api_key: sk-test-123
model: gpt-4o
"#;
        let config: AiConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.enabled);
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o");
        assert!(config.is_usable());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "enabled: true\napi_key: sk-abc\n";
        let config: AiConfig = serde_yaml::from_str(yaml).unwrap();
        let config = config.resolved();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_key, "sk-abc");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai.yaml");
        std::fs::write(&path, "enabled: true\nmodel: local-model\n").unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.model, "local-model");
    }

    #[test]
    fn load_from_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai.yaml");
        std::fs::write(&path, "enabled: [not a bool").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
