//! Configuration handling for docread.
//!
//! Loaded from `<config dir>/config.toml`; every field has a default, so a
//! missing file or section is not an error. The OCR API key is never stored
//! in the file, only the name of the environment variable that holds it.

use directories::ProjectDirs;
use docread_core::{Error, Result};
use docread_ocr::DEFAULT_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// OCR service configuration
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// OCR service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OcrConfig {
    /// Endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Use OCR at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_api_key_env() -> String {
    "MISTRAL_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_enabled() -> bool {
    true
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            enabled: default_enabled(),
        }
    }
}

impl OcrConfig {
    /// API key from the configured environment variable, if set and non-blank.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from `path`, or the default location when `None`.
    ///
    /// A file that does not exist yields the defaults.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        let Some(path) = path.or_else(Self::config_path) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::read(&path)
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("invalid config file {}: {e}", path.display())))
    }

    /// Location of the config file.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Commented sample configuration, matching the defaults.
    #[must_use]
    pub fn sample_toml() -> String {
        format!(
            r#"# docread configuration

[ocr]
# OCR service endpoint
endpoint = "{DEFAULT_ENDPOINT}"
# Environment variable holding the API key (also read from .env)
api_key_env = "MISTRAL_API_KEY"
# Request timeout in seconds
timeout_secs = 60
# Set to false to skip OCR entirely
enabled = true

[logging]
# trace, debug, info, warn or error
level = "info"
"#
        )
    }
}

/// Get the config directory for docread.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("DOCREAD_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }

    ProjectDirs::from("", "", "docread").map(|dirs| dirs.config_dir().to_path_buf())
}
