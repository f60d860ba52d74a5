//! Configuration management for Deckhand.
//!
//! Configuration is loaded in order of precedence:
//! 1. Defaults
//! 2. Config file (~/.deckhand/config.toml)
//! 3. Environment variables
//! 4. CLI flags (handled at CLI layer)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Remote control plane configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Base URL every request path is resolved against
    #[serde(default = "default_target_url")]
    pub url: String,

    /// HTTP timeout in seconds (0 disables the timeout)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_target_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: default_target_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Credentials sent with every request.
///
/// Obtaining and storing the token is left to whoever writes this file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub token: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// App name guessing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessConfig {
    /// Name of the git remote that points at the platform
    #[serde(default = "default_remote")]
    pub remote: String,
}

fn default_remote() -> String {
    "deckhand".to_string()
}

impl Default for GuessConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub guess: GuessConfig,
}

impl Config {
    /// Returns the default Deckhand configuration directory (~/.deckhand)
    pub fn deckhand_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".deckhand"))
    }

    /// Returns the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        Self::deckhand_dir().map(|d| d.join("config.toml"))
    }

    /// Load configuration from the default path with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = Self::default_config_path() {
            if path.exists() {
                Self::load_from_file(&path)?
            } else {
                Config::default()
            }
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DECKHAND_TARGET") {
            self.target.url = url;
        }

        if let Ok(timeout) = std::env::var("DECKHAND_TIMEOUT") {
            if let Ok(timeout) = timeout.parse() {
                self.target.timeout_secs = timeout;
            }
        }

        if let Ok(token) = std::env::var("DECKHAND_TOKEN") {
            self.auth.token = Some(token);
        }

        if let Ok(level) = std::env::var("DECKHAND_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Save configuration to a specific file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Replace the target URL after checking it looks like one
    pub fn set_target(&mut self, url: &str) -> Result<(), ConfigError> {
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "target must start with http:// or https://, got \"{}\"",
                url
            )));
        }
        self.target.url = url.to_string();
        Ok(())
    }

    /// Base URL with any trailing slash removed
    pub fn target_url(&self) -> &str {
        self.target.url.trim_end_matches('/')
    }
}
