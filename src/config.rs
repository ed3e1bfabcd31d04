//! Search configuration
//!
//! Loaded from JSON. Every field has a default, so `{}` is a valid config.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event, Event};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid JSON for this schema
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config parsed but a value is out of range
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Bounds for context expansion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextOptions {
    /// Max visits fetched before each row (default: 2)
    #[serde(default = "default_max_visits")]
    pub max_preceding_visits: usize,

    /// Max visits fetched after each row (default: 2)
    #[serde(default = "default_max_visits")]
    pub max_succeding_visits: usize,

    /// How far back to look, in ms (default: 20 minutes)
    #[serde(default = "default_max_time_ms")]
    pub max_preceding_time_ms: u64,

    /// How far ahead to look, in ms (default: 20 minutes)
    #[serde(default = "default_max_time_ms")]
    pub max_succeding_time_ms: u64,

    /// Max per-row fetch chains in flight (default: 8)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_max_visits() -> usize {
    2
}

fn default_max_time_ms() -> u64 {
    20 * 60 * 1000
}

fn default_concurrency() -> usize {
    8
}

fn default_window_days() -> u32 {
    100
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            max_preceding_visits: default_max_visits(),
            max_succeding_visits: default_max_visits(),
            max_preceding_time_ms: default_max_time_ms(),
            max_succeding_time_ms: default_max_time_ms(),
            concurrency: default_concurrency(),
        }
    }
}

impl ContextOptions {
    /// Sets both visit-count bounds
    pub fn with_max_visits(mut self, preceding: usize, succeding: usize) -> Self {
        self.max_preceding_visits = preceding;
        self.max_succeding_visits = succeding;
        self
    }

    /// Sets both time bounds
    pub fn with_max_time(mut self, preceding: Duration, succeding: Duration) -> Self {
        self.max_preceding_time_ms = duration_ms(preceding);
        self.max_succeding_time_ms = duration_ms(succeding);
        self
    }

    /// Sets the fan-out cap
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Fan-out cap, never below one
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Top-level search configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Days covered by the default search window (default: 100)
    #[serde(default = "default_window_days")]
    pub default_window_days: u32,

    /// Default context expansion bounds
    #[serde(default)]
    pub context: ContextOptions,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_window_days: default_window_days(),
            context: ContextOptions::default(),
        }
    }
}

impl HistoryConfig {
    /// Parses and validates a JSON config
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        let shown = path.display().to_string();
        log_event(Event::ConfigLoaded, &[("path", shown.as_str())]);
        Ok(config)
    }

    /// Rejects values the search layer cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_window_days == 0 {
            return Err(ConfigError::Invalid(
                "default_window_days must be at least 1".into(),
            ));
        }
        if self.context.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "context.concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Length of the default window in ms
    pub fn default_window_ms(&self) -> i64 {
        i64::from(self.default_window_days) * 24 * 60 * 60 * 1000
    }
}
