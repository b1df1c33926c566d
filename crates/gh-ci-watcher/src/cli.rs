//! Command line options

use clap::Parser;
use gh_ci_watcher_config::{ConfigError, Settings, WatcherConfig};
use std::path::PathBuf;

/// Rerun failed GitHub Actions jobs on blocked pull requests
#[derive(Debug, Parser)]
#[command(name = "gh-ci-watcher", version, about)]
pub struct Cli {
    /// GitHub organization name
    #[arg(long, env = "GH_CI_WATCHER_ORG")]
    pub org: Option<String>,

    /// GitHub repository name
    #[arg(long, env = "GH_CI_WATCHER_REPO")]
    pub repo: Option<String>,

    /// GitHub personal access token
    #[arg(long)]
    pub token: Option<String>,

    /// GitHub Enterprise host (default: github.com)
    #[arg(long)]
    pub host: Option<String>,

    /// PR number to process; without it the most recently updated blocked PRs are processed
    #[arg(long)]
    pub pr: Option<u64>,

    /// Only log what would be rerun, never restart any job
    #[arg(long, alias = "dryrun")]
    pub dry_run: bool,

    /// Audit store (SQLite path) receiving every rerun decision
    #[arg(long, alias = "pstoken", env = "GH_CI_WATCHER_AUDIT_DB", hide_env_values = true)]
    pub audit_db: Option<String>,

    /// Comma-separated workflow name substrings to ignore (not applied yet)
    #[arg(long)]
    pub ignore: Option<String>,

    /// Config file (default: ./.gh-ci-watcher.toml, then ~/.gh-ci-watcher.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log file receiving debug output
    #[arg(long)]
    pub log_file: Option<String>,

    /// Never rerun a workflow run at or beyond this attempt
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Skip a PR entirely when more checks than this have failed
    #[arg(long)]
    pub max_failed_checks: Option<usize>,

    /// Batch mode: only PRs updated within this many days
    #[arg(long)]
    pub recency_days: Option<u32>,

    /// Batch mode: process at most this many PRs
    #[arg(long)]
    pub batch_size: Option<usize>,
}

impl Cli {
    /// Apply command line overrides on top of the file config
    pub fn policy(&self, mut config: WatcherConfig) -> WatcherConfig {
        if let Some(max_attempts) = self.max_attempts {
            config.max_run_attempts = max_attempts;
        }
        if let Some(max_failed_checks) = self.max_failed_checks {
            config.max_failed_checks = max_failed_checks;
        }
        if let Some(recency_days) = self.recency_days {
            config.recency_days = recency_days;
        }
        if let Some(batch_size) = self.batch_size {
            config.max_batch_size = batch_size;
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }
        config
    }

    /// Validate options into settings; the token is kept out of `Settings`
    pub fn into_settings(
        self,
        config: WatcherConfig,
    ) -> Result<(Settings, Option<String>), ConfigError> {
        let policy = self.policy(config);
        let settings = Settings::new(self.org, self.repo, self.host, self.pr, policy)?
            .with_dry_run(self.dry_run)
            .with_audit_db(self.audit_db)
            .with_ignore_list(self.ignore.as_deref());
        Ok((settings, self.token))
    }
}
