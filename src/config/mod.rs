//! Configuration management for Ludex.
//!
//! Configuration is read from `~/.config/ludex/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::http_client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// Environment variable that overrides `api.api_key`.
pub const API_KEY_ENV: &str = "LUDEX_API_KEY";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

/// Remote catalog settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Upper bound for any single catalog request.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Local file locations. Unset paths fall back to the platform data directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: Option<PathBuf>,
    pub session_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// Load from an explicit path, creating the commented default there if
    /// it is missing. Environment overrides are not applied.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/ludex/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("ludex").join("config.toml"))
    }

    /// A non-blank key from the environment wins over the file.
    fn apply_env(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api.api_key = Some(key);
        }
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        format!(
            r##"# Ludex Configuration

[api]
# Catalog service root. Must serve games, games/{{id}} and
# games/{{id}}/screenshots.
base_url = "{base_url}"

# API key sent as the `key` query parameter. The {env} environment
# variable takes precedence over this value.
# api_key = ""

# Request timeout in seconds
timeout_secs = {timeout}

[storage]
# SQLite database holding accounts and bookmarks.
# Defaults to <data dir>/ludex/ludex.db
# database_path = "/path/to/ludex.db"

# File remembering the logged-in account.
# Defaults to <data dir>/ludex/session.toml
# session_path = "/path/to/session.toml"
"##,
            base_url = DEFAULT_BASE_URL,
            env = API_KEY_ENV,
            timeout = DEFAULT_TIMEOUT.as_secs(),
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
