//! Token resolution and client construction
//!
//! Builds an authenticated `OctocrabClient` for github.com or a GitHub
//! Enterprise host.

use crate::{OctocrabClient, DEFAULT_HOST};
use anyhow::{Context, Result};
use log::{debug, info};
use octocrab::Octocrab;
use std::sync::Arc;

/// Resolves the GitHub token to authenticate with
///
/// Tries multiple sources in order:
/// 1. A token passed explicitly (e.g. the `--token` flag)
/// 2. Host-specific env var (e.g., `GITHUB_TOKEN_GHE_EXAMPLE_COM`)
/// 3. `gh auth token --hostname {host}` command
/// 4. Generic `GITHUB_TOKEN` or `GH_TOKEN` (github.com only)
#[derive(Debug, Clone)]
pub struct TokenResolver {
    /// Cached default token from GITHUB_TOKEN/GH_TOKEN
    default_token: Option<String>,
}

impl Default for TokenResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenResolver {
    /// Create a new token resolver
    pub fn new() -> Self {
        let default_token = std::env::var("GITHUB_TOKEN")
            .or_else(|_| std::env::var("GH_TOKEN"))
            .ok();

        Self { default_token }
    }

    /// Get a token for the given host
    ///
    /// # Arguments
    ///
    /// * `explicit` - Token supplied on the command line, wins when non-empty
    /// * `host` - The GitHub host (None = github.com)
    pub async fn resolve(&self, explicit: Option<&str>, host: Option<&str>) -> Result<String> {
        if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
            debug!("Using token passed on the command line");
            return Ok(token.to_string());
        }

        let host = host.unwrap_or(DEFAULT_HOST);

        // Try host-specific env var
        let env_key = host_env_key(host);
        if let Ok(token) = std::env::var(&env_key) {
            debug!("Using token from env var {} for host {}", env_key, host);
            return Ok(token);
        }

        // Try gh CLI with hostname; a missing gh binary just falls through
        debug!("Trying gh auth token for host {}", host);
        match tokio::process::Command::new("gh")
            .args(["auth", "token", "--hostname", host])
            .output()
            .await
        {
            Ok(output) if output.status.success() => {
                let token = String::from_utf8(output.stdout)
                    .context("Invalid UTF-8 in gh auth token output")?
                    .trim()
                    .to_string();
                if !token.is_empty() {
                    debug!("Using token from gh CLI for host {}", host);
                    return Ok(token);
                }
            }
            Ok(_) => debug!("gh auth token returned no token for host {}", host),
            Err(e) => debug!("Could not run gh auth token: {}", e),
        }

        // Fallback to default token (for github.com only)
        if host == DEFAULT_HOST {
            if let Some(ref token) = self.default_token {
                debug!("Using default token (GITHUB_TOKEN/GH_TOKEN) for github.com");
                return Ok(token.clone());
            }
        }

        Err(anyhow::anyhow!(
            "No token found for host '{}'. \
             Pass --token, set {} or run 'gh auth login --hostname {}'",
            host,
            env_key,
            host
        ))
    }
}

/// Environment variable holding a host-specific token
fn host_env_key(host: &str) -> String {
    format!(
        "GITHUB_TOKEN_{}",
        host.replace(['.', '-'], "_").to_uppercase()
    )
}

/// Build an authenticated client for the given host
///
/// Must be called from within a tokio runtime.
pub fn build_client(host: Option<&str>, token: String) -> Result<OctocrabClient> {
    let effective_host = host.unwrap_or(DEFAULT_HOST);
    info!("Creating GitHub client for host: {}", effective_host);

    let mut builder = Octocrab::builder().personal_token(token);

    if effective_host != DEFAULT_HOST {
        let uri = format!("https://{}/api/v3", effective_host);
        builder = builder.base_uri(&uri).context("Failed to set base URI")?;
    }

    let octocrab = builder.build().context("Failed to build Octocrab client")?;
    Ok(OctocrabClient::new(Arc::new(octocrab)))
}
