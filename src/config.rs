//! Configuration management for the logger

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::buffer::{DEFAULT_CAPACITY, DEFAULT_SLACK, MAX_BACKING_LEN};
use crate::error::ConfigError;
use crate::level::LogLevel;
use crate::logger::OutputMode;
use crate::INTERNAL_TARGET;

/// Environment variable overriding the configured level
pub const LEVEL_ENV: &str = "RINGLOG_LEVEL";

/// Environment variable overriding the buffer capacity
pub const CAPACITY_ENV: &str = "RINGLOG_CAPACITY";

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Most verbose level let through: "error", "warn", "info" or "debug"
    #[serde(default)]
    pub level: LogLevel,

    /// "direct" prints every message as it arrives, "buffered" waits for a dump
    #[serde(default)]
    pub mode: OutputMode,

    /// Number of lines kept in the ring buffer (default: 1000)
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Extra ring buffer slots allocated beyond the capacity (default: 0)
    #[serde(default = "default_slack")]
    pub slack: usize,

    /// Color level tags on the console
    #[serde(default = "default_color")]
    pub color: bool,

    /// Prefix lines with the local time
    #[serde(default)]
    pub timestamps: bool,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_slack() -> usize {
    DEFAULT_SLACK
}

fn default_color() -> bool {
    true
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            mode: OutputMode::default(),
            capacity: default_capacity(),
            slack: default_slack(),
            color: default_color(),
            timestamps: false,
        }
    }
}

impl LoggerConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(default_path())
    }

    /// Load configuration from `path`, or return the defaults if it does not exist
    ///
    /// A leading `~` in the path is expanded to the home directory.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand_path(path.as_ref());
        if !path.exists() {
            tracing::debug!(
                target: INTERNAL_TARGET,
                path = %path.display(),
                "no logger config file, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!(
            target: INTERNAL_TARGET,
            path = %path.display(),
            "loaded logger config"
        );
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid logger configuration")
    }

    /// Save configuration to `path`, creating parent directories as needed
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = expand_path(path.as_ref());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Apply `RINGLOG_LEVEL` / `RINGLOG_CAPACITY` overrides from the environment
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(
            std::env::var(LEVEL_ENV).ok().as_deref(),
            std::env::var(CAPACITY_ENV).ok().as_deref(),
        )
    }

    /// Apply level and capacity overrides given as strings
    pub fn apply_overrides(
        mut self,
        level: Option<&str>,
        capacity: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(level) = level {
            self.level = level.parse()?;
        }
        if let Some(raw) = capacity {
            self.capacity = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0 && n <= MAX_BACKING_LEN)
                .ok_or_else(|| ConfigError::InvalidCapacity(raw.to_string()))?;
        }
        Ok(self)
    }
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
        None => path.to_path_buf(),
    }
}

/// Get the base configuration directory (<config dir>/ringlog)
/// Falls back to ./.ringlog if the platform config directory cannot be determined
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("ringlog"))
        .unwrap_or_else(|| PathBuf::from(".ringlog"))
}

/// Get the path to the default config file
pub fn default_path() -> PathBuf {
    config_dir().join("config.toml")
}
