use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logging::LogConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Record store settings
    pub database: DatabaseSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,

    /// AI narration settings
    #[serde(default)]
    pub narrator: NarratorSettings,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Record store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite database file
    pub path: PathBuf,
}

/// Settings for the external text generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarratorSettings {
    /// Request AI narration at all
    pub enabled: bool,

    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Upper bound for a single generation call
    pub timeout_secs: u64,

    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl NarratorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NarratorSettings {
    fn default() -> Self {
        NarratorSettings {
            enabled: false,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            timeout_secs: 20,
            max_tokens: Some(400),
            temperature: Some(0.7),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: AppConfig::config_dir().join("health.db"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                updated_at: Utc::now(),
            },
            database: DatabaseSettings::default(),
            logging: LogConfig::default(),
            narrator: NarratorSettings::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Directory holding the config file and default database
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".healthintel")
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration, falling back to defaults only when the file is absent
    ///
    /// A file that exists but cannot be read or parsed is an error rather than
    /// a silent reset to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !config_path.exists() {
            eprintln!("Config file not found, using defaults: {}", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from_file(&config_path)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.database.path, deserialized.database.path);
        assert_eq!(deserialized.narrator.timeout_secs, 20);
        assert!(!deserialized.narrator.enabled);
    }

    #[test]
    fn test_partial_narrator_section() {
        let toml_str = r#"
            [metadata]
            version = "1.0"
            updated_at = "2024-01-01T00:00:00Z"

            [database]
            path = "/tmp/health.db"

            [narrator]
            enabled = true
            timeout_secs = 5
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.narrator.enabled);
        assert_eq!(config.narrator.timeout(), Duration::from_secs(5));
        assert_eq!(config.narrator.model, NarratorSettings::default().model);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = AppConfig::default();
        original.narrator.model = "llama3".to_string();
        original.save_to_file(&config_path).unwrap();

        let loaded = AppConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.narrator.model, "llama3");
        assert_eq!(
            AppConfig::load_or_default(Some(&temp_dir.path().join("missing.toml")))
                .unwrap()
                .narrator
                .model,
            NarratorSettings::default().model
        );
    }

    #[test]
    fn test_malformed_config_is_reported() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[narrator\nmodel = 42").unwrap();

        let err = AppConfig::load_or_default(Some(&config_path)).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Invalid config file"));
        assert!(message.contains("Failed to parse TOML configuration"));
    }
}
