//! Configuration for gh-ci-watcher
//!
//! This crate provides:
//! - Configuration file loading (TOML)
//! - Retry policy configuration (WatcherConfig)
//! - Validated per-invocation settings (Settings)

pub mod config_file;
pub mod error;
pub mod repository;
pub mod settings;
pub mod watcher_config;

pub use config_file::load_config_file;
pub use error::ConfigError;
pub use repository::Repository;
pub use settings::{parse_ignore_list, Selection, Settings};
pub use watcher_config::WatcherConfig;
