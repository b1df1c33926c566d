use std::path::PathBuf;
use thiserror::Error;

/// Problems with the watcher's configuration; all of them are fatal
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required option --{0}")]
    Missing(&'static str),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
