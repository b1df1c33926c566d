//! Retry policy configuration
//!
//! Policy values loaded from `.gh-ci-watcher.toml`; every field has a
//! default so a partial (or missing) file is fine.

use crate::ConfigError;
use gh_client::MAX_PER_PAGE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Retry policy and housekeeping settings loaded from `.gh-ci-watcher.toml`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Workflow runs at or beyond this attempt count are never rerun
    #[serde(default = "default_max_run_attempts")]
    pub max_run_attempts: u32,

    /// More failing check runs than this on one PR disables reruns for it
    #[serde(default = "default_max_failed_checks")]
    pub max_failed_checks: usize,

    /// Batch mode only considers PRs updated within this many days
    #[serde(default = "default_recency_days")]
    pub recency_days: u32,

    /// Batch mode processes at most this many PRs per cycle
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Page size used for every list request
    #[serde(default = "default_page_size")]
    pub page_size: u8,

    /// File receiving debug-level logs
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_max_run_attempts() -> u32 {
    4
}

fn default_max_failed_checks() -> usize {
    10
}

fn default_recency_days() -> u32 {
    3
}

fn default_max_batch_size() -> usize {
    10
}

fn default_page_size() -> u8 {
    MAX_PER_PAGE
}

fn default_log_file() -> String {
    "./watcher.log".to_string()
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            max_run_attempts: default_max_run_attempts(),
            max_failed_checks: default_max_failed_checks(),
            recency_days: default_recency_days(),
            max_batch_size: default_max_batch_size(),
            page_size: default_page_size(),
            log_file: default_log_file(),
        }
    }
}

impl WatcherConfig {
    /// Load config from an explicit path, CWD, or home directory, or use defaults
    ///
    /// A config file that exists but does not parse is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match crate::load_config_file(explicit)? {
            Some(content) => {
                let config: Self = toml::from_str(&content)?;
                log::debug!("Loaded watcher config from file");
                Ok(config)
            }
            None => {
                log::debug!("Using default watcher config");
                Ok(Self::default())
            }
        }
    }

    /// Reject values that would make the watcher do nothing or misbehave
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_run_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "max_run_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "max_batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.page_size == 0 || self.page_size > MAX_PER_PAGE {
            return Err(ConfigError::Invalid {
                field: "page_size",
                reason: format!("must be between 1 and {}", MAX_PER_PAGE),
            });
        }
        if self.log_file.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "log_file",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
