//! The repository a watcher cycle runs against

use gh_client::DEFAULT_HOST;
use serde::{Deserialize, Serialize};

/// Target repository of a watcher cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// GitHub organization or user name
    pub org: String,
    /// Repository name
    pub repo: String,
    /// GitHub host (None = github.com)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl Repository {
    pub fn new(org: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            host: None,
        }
    }

    pub fn with_host(
        org: impl Into<String>,
        repo: impl Into<String>,
        host: Option<String>,
    ) -> Self {
        // Normalize github.com to None
        let host = host.filter(|h| h != DEFAULT_HOST && !h.is_empty());
        Self {
            org: org.into(),
            repo: repo.into(),
            host,
        }
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.host {
            Some(host) => write!(f, "{}/{}/{}", host, self.org, self.repo),
            None => write!(f, "{}/{}", self.org, self.repo),
        }
    }
}
