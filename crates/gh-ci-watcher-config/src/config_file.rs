use crate::ConfigError;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = ".gh-ci-watcher.toml";

/// Load config file content
///
/// An explicitly requested path must exist. Otherwise searches for
/// `.gh-ci-watcher.toml` in:
/// 1. Current working directory
/// 2. Home directory
///
/// Returns the file content if found, None otherwise.
pub fn load_config_file(explicit: Option<&Path>) -> Result<Option<String>, ConfigError> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        return Ok(Some(content));
    }

    // Try current directory first
    if let Ok(content) = std::fs::read_to_string(CONFIG_FILE) {
        log::debug!("Loaded config from {}", CONFIG_FILE);
        return Ok(Some(content));
    }

    // Try home directory
    if let Some(home_config) = get_home_config_path() {
        if let Ok(content) = std::fs::read_to_string(&home_config) {
            log::debug!("Loaded config from {}", home_config.display());
            return Ok(Some(content));
        }
    }

    Ok(None)
}

/// Get the path to the config file in the home directory
fn get_home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE))
}
