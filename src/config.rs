//! Client configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::puzzle::DEFAULT_MAX_TURNS;

/// Environment variable overriding [`ClientConfig::server_url`].
pub const SERVER_URL_ENV: &str = "WORD_TRINITY_SERVER_URL";

/// Environment variable overriding [`ClientConfig::user_id`].
pub const USER_ID_ENV: &str = "WORD_TRINITY_USER_ID";

/// Settings for a puzzle client.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the puzzle server.
    #[serde(default = "default_server_url")]
    server_url: String,

    /// Turn budget per puzzle.
    #[serde(default = "default_max_turns")]
    max_turns: u32,

    /// Player id sent with statistics requests.
    #[serde(default)]
    user_id: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_max_turns() -> u32 {
    DEFAULT_MAX_TURNS
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            max_turns: default_max_turns(),
            user_id: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if
    /// the turn budget is zero.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(server_url = %config.server_url, max_turns = config.max_turns, "Config loaded successfully");
        Ok(config)
    }

    /// Applies `WORD_TRINITY_*` environment overrides.
    #[instrument(skip(self))]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(SERVER_URL_ENV).ok(),
            std::env::var(USER_ID_ENV).ok(),
        )
    }

    /// Replaces the server URL and user id where a value is given.
    pub fn with_overrides(mut self, server_url: Option<String>, user_id: Option<String>) -> Self {
        if let Some(url) = server_url.filter(|u| !u.is_empty()) {
            debug!(server_url = %url, "Overriding server URL");
            self.server_url = url;
        }
        if let Some(id) = user_id.filter(|u| !u.is_empty()) {
            self.user_id = Some(id);
        }
        self
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_turns == 0 {
            return Err(ConfigError::new("max_turns must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
