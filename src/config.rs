//! Layered configuration.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `~/.config/worktodo/config.toml` (user-global)
//! 3. `./worktodo.toml` (working directory)
//! 4. `WORKTODO_*` environment variables (`WORKTODO_API_TOKEN` -> `api_token`)
//!
//! [`Config::load_with_dotenv`] reads a `.env` file into the environment first.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.baserow.io";
pub const DEFAULT_TABLE_ID: u64 = 623600;
const LOCAL_CONFIG_FILE: &str = "worktodo.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A required value is missing.
    #[error("'{field}' is not configured (set it in {hint})")]
    NotConfigured { field: String, hint: String },

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

const fn default_timeout_secs() -> u64 {
    30
}

/// Connection settings for the remote task table.
#[derive(Clone, Deserialize, Serialize)]
pub struct Config {
    /// Scheme and host of the table service, without a trailing path.
    pub base_url: String,
    /// Numeric identifier of the task table.
    pub table_id: u64,
    /// Database token sent as `Authorization: Token <api_token>`.
    #[serde(default)]
    pub api_token: String,
    /// Upper bound for a single request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            table_id: DEFAULT_TABLE_ID,
            api_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Keeps the token out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("table_id", &self.table_id)
            .field("api_token", &if self.api_token.is_empty() { "" } else { "***" })
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Config = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Same as [`Config::load`], reading `.env` from the working directory first.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// The provider chain, exposed so tests can layer extra providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("WORKTODO_"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("worktodo").join("config.toml"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::NotConfigured {
                field: "api_token".into(),
                hint: format!("WORKTODO_API_TOKEN, ./{} or the user config file", LOCAL_CONFIG_FILE),
            });
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "base_url".into(),
                reason: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
