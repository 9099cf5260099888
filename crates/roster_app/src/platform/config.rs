use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::LogDestination;
use roster_core::visibility::{ObserveOptions, TriggerConfig, TriggerMode};
use roster_core::validate_page_size;
use roster_engine::{FetchSettings, RetryPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILENAME: &str = "roster.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings read from `roster.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub page_size: u32,
    pub stale_time_secs: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_response_bytes: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub viewport_rows: u16,
    pub trigger_cooldown_ms: u64,
    pub trigger_margin_rows: u32,
    pub log: LogDestination,
    pub log_file: PathBuf,
    pub session_file: PathBuf,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        let retry = RetryPolicy::default();
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            page_size: 10,
            stale_time_secs: 60,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_response_bytes: fetch.max_bytes,
            max_retries: retry.max_retries,
            retry_backoff_ms: retry.backoff.as_millis() as u64,
            viewport_rows: 15,
            trigger_cooldown_ms: 1_000,
            trigger_margin_rows: 0,
            log: LogDestination::File,
            log_file: PathBuf::from("./roster.log"),
            session_file: PathBuf::from("./.roster_session.ron"),
        }
    }
}

impl ConsoleConfig {
    /// Reads the config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_page_size(self.page_size).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if self.viewport_rows < 3 {
            return Err(ConfigError::Invalid(format!(
                "viewport_rows must be at least 3, got {}",
                self.viewport_rows
            )));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".to_string()));
        }
        Ok(())
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_response_bytes,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn trigger_config(&self) -> TriggerConfig {
        TriggerConfig {
            mode: TriggerMode::Entering,
            options: ObserveOptions {
                root_margin: self.trigger_margin_rows,
                ..ObserveOptions::default()
            },
            cooldown: Duration::from_millis(self.trigger_cooldown_ms),
        }
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }
}
