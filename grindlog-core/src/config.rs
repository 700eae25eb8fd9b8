//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/grindlog/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/grindlog/` (~/.config/grindlog/)
//! - Data: `$XDG_DATA_HOME/grindlog/` (~/.local/share/grindlog/)
//! - State/Logs: `$XDG_STATE_HOME/grindlog/` (~/.local/state/grindlog/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Which user's problems the CLI reads and writes
    #[serde(default)]
    pub user: UserConfig,

    /// Database location override
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Owner scope for problem records
#[derive(Debug, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: i64,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

fn default_user_id() -> i64 {
    1
}

/// Database configuration
#[derive(Debug, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Explicit database file; falls back to [`Config::database_path`]
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every query come back empty
    pub fn validate(&self) -> Result<()> {
        if self.user.id <= 0 {
            return Err(Error::Config(format!(
                "user.id must be positive, got {}",
                self.user.id
            )));
        }
        if self.logging.max_files == 0 {
            return Err(Error::Config(
                "logging.max_files must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Database file to open: the configured override, or the XDG default.
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(Self::database_path)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/grindlog/config.toml` (~/.config/grindlog/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("grindlog").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("grindlog")
    }

    /// Returns the state directory path (for logs)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("grindlog")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/grindlog/data.db` (~/.local/share/grindlog/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Pin the XDG variables to their defaults when unset, so every path
    /// helper resolves the same way for the life of the process.
    pub fn ensure_xdg_env() {
        if std::env::var_os("XDG_DATA_HOME").is_none() {
            std::env::set_var("XDG_DATA_HOME", xdg_data_home());
        }

        if std::env::var_os("XDG_STATE_HOME").is_none() {
            std::env::set_var("XDG_STATE_HOME", xdg_state_home());
        }

        if std::env::var_os("XDG_CONFIG_HOME").is_none() {
            std::env::set_var("XDG_CONFIG_HOME", xdg_config_home());
        }
    }
}
