//! Configuration loading and validation.
//!
//! Config is JSON5 so it can carry comments.
//! Config location: `~/.bidhall/bidhall.json`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON5 parsing error.
    #[error("Parse error: {0}")]
    Parse(#[from] json5::Error),

    /// Config validation error.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Auction API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Global settings.
    #[serde(default)]
    pub settings: GlobalSettings,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// # Errors
    ///
    /// Returns error if config cannot be loaded or parsed.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = json5::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a path.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file write fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        Self::state_dir().join("bidhall.json")
    }

    /// Get the Bidhall state directory.
    ///
    /// Uses `BIDHALL_STATE_DIR` env var if set, otherwise `~/.bidhall`.
    #[must_use]
    pub fn state_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("BIDHALL_STATE_DIR") {
            PathBuf::from(dir)
        } else if let Some(home) = dirs::home_dir() {
            home.join(".bidhall")
        } else {
            PathBuf::from(".bidhall")
        }
    }

    /// Get the persisted session file.
    #[must_use]
    pub fn session_path() -> PathBuf {
        Self::state_dir().join("session.json")
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::Validation("API base URL cannot be empty".to_string()));
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "API base URL must start with http:// or https:// (got '{base}')"
            )));
        }

        if self.api.api_key_header.trim().is_empty() {
            return Err(ConfigError::Validation(
                "API key header name cannot be empty".to_string(),
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "API timeout cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Auction API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Base URL of the auction API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Header carrying the provisioned API key.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_header: default_api_key_header(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://v2.api.noroff.dev".to_string()
}

fn default_api_key_header() -> String {
    "X-Noroff-API-Key".to_string()
}

const fn default_timeout() -> u64 {
    30
}

/// Global settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    /// Enable debug logging.
    #[serde(default)]
    pub debug: bool,

    /// Log format.
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// JSON format.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://v2.api.noroff.dev");
        assert_eq!(config.api.api_key_header, "X-Noroff-API-Key");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bidhall.json");

        let mut config = Config::default();
        config.api.base_url = "http://localhost:4000".to_string();
        config.settings.log_format = LogFormat::Json;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.api.base_url, "http://localhost:4000");
        assert_eq!(loaded.settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_json5_parsing() {
        let json5_content = r#"{
            // staging mirror
            api: {
                baseUrl: "https://staging.example.test",
                timeoutSecs: 5,
            },
        }"#;

        let config: Config = json5::from_str(json5_content).unwrap();
        assert_eq!(config.api.base_url, "https://staging.example.test");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.api_key_header, "X-Noroff-API-Key");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.base_url = "v2.api.noroff.dev".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_state_dir() {
        let dir = Config::state_dir();
        assert!(dir.to_str().unwrap().contains("bidhall"));
    }
}
