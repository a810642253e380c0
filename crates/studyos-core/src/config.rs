//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/studyos/config.toml)
//! 3. Environment variables (STUDYOS_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "STUDYOS";

/// Default storage quota, the same budget browsers give local storage
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Default read-model refresh interval
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 5_000;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the JSON documents
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Byte quota for all documents together (0 = unlimited)
    #[serde(default = "default_quota")]
    pub quota_bytes: u64,

    /// Polling period for read models in milliseconds (0 disables polling)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,

    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            quota_bytes: default_quota(),
            refresh_interval_ms: default_refresh_interval(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (STUDYOS_DATA_DIR, STUDYOS_QUOTA_BYTES, STUDYOS_REFRESH_INTERVAL_MS)
    /// 2. Config file (~/.config/studyos/config.toml or STUDYOS_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // Empty or "0" removes the quota
        if let Ok(val) = std::env::var(format!("{}_QUOTA_BYTES", ENV_PREFIX)) {
            match val.trim() {
                "" => self.quota_bytes = 0,
                v => {
                    if let Ok(bytes) = v.parse() {
                        self.quota_bytes = bytes;
                    }
                }
            }
        }

        if let Ok(val) = std::env::var(format!("{}_REFRESH_INTERVAL_MS", ENV_PREFIX)) {
            if let Ok(ms) = val.trim().parse() {
                self.refresh_interval_ms = ms;
            }
        }
    }

    /// Ensure data directory exists
    pub fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Set a single value by key name, as used by `studyos config set`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "quota_bytes" => {
                self.quota_bytes = match value.trim() {
                    "" | "none" => 0,
                    v => v
                        .parse()
                        .with_context(|| format!("Invalid byte count: {}", v))?,
                }
            }
            "refresh_interval_ms" => {
                self.refresh_interval_ms = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid interval: {}", value))?
            }
            "log_file" => {
                self.log_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            _ => bail!(
                "Unknown config key: {}. Valid keys: data_dir, quota_bytes, refresh_interval_ms, log_file",
                key
            ),
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with STUDYOS_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studyos")
            .join("config.toml")
    }

    /// Byte quota, `None` when unlimited
    pub fn quota(&self) -> Option<u64> {
        (self.quota_bytes > 0).then_some(self.quota_bytes)
    }

    /// Refresh interval as a `Duration`, `None` when polling is disabled
    pub fn refresh_interval(&self) -> Option<std::time::Duration> {
        (self.refresh_interval_ms > 0)
            .then(|| std::time::Duration::from_millis(self.refresh_interval_ms))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studyos")
}

fn default_quota() -> u64 {
    DEFAULT_QUOTA_BYTES
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}
