//! Validated settings for one watcher invocation
//!
//! `Settings` is built once at startup from the command line and the
//! config file and is read-only afterwards.

use crate::{ConfigError, Repository, WatcherConfig};

/// Which pull requests a cycle processes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Exactly this PR, regardless of its state
    Single(u64),
    /// The most recently updated blocked PRs
    Batch,
}

/// Everything a watcher cycle needs to know
#[derive(Debug, Clone)]
pub struct Settings {
    pub repository: Repository,
    pub selection: Selection,
    pub dry_run: bool,
    /// Connection string of the audit store, if decisions should be recorded
    pub audit_db: Option<String>,
    /// Lower-cased workflow name substrings to ignore.
    ///
    /// Parsed and reported, but not consulted when deciding reruns: it is
    /// not settled yet whether a match should suppress resolution, skip the
    /// rerun, or leave the check out of the failure ceiling.
    pub ignore_workflows: Vec<String>,
    pub policy: WatcherConfig,
}

impl Settings {
    /// Validate raw option values into settings
    ///
    /// `org` and `repo` are required; a PR number of 0 means batch mode.
    pub fn new(
        org: Option<String>,
        repo: Option<String>,
        host: Option<String>,
        pr: Option<u64>,
        policy: WatcherConfig,
    ) -> Result<Self, ConfigError> {
        let org = required("org", org)?;
        let repo = required("repo", repo)?;
        policy.validate()?;

        let selection = match pr {
            Some(number) if number > 0 => Selection::Single(number),
            _ => Selection::Batch,
        };

        Ok(Self {
            repository: Repository::with_host(org, repo, host),
            selection,
            dry_run: false,
            audit_db: None,
            ignore_workflows: Vec::new(),
            policy,
        })
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Empty connection strings count as "no audit store"
    pub fn with_audit_db(mut self, audit_db: Option<String>) -> Self {
        self.audit_db = audit_db.filter(|dsn| !dsn.trim().is_empty());
        self
    }

    pub fn with_ignore_list(mut self, csv: Option<&str>) -> Self {
        self.ignore_workflows = csv.map(parse_ignore_list).unwrap_or_default();
        self
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(field))
}

/// Split a comma-separated list of workflow name substrings
///
/// Entries are trimmed and lower-cased; empty entries are dropped.
pub fn parse_ignore_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pr: Option<u64>) -> Result<Settings, ConfigError> {
        Settings::new(
            Some("vitessio".to_string()),
            Some("vitess".to_string()),
            None,
            pr,
            WatcherConfig::default(),
        )
    }

    #[test]
    fn test_pr_number_selects_single_mode() {
        assert_eq!(settings(Some(42)).unwrap().selection, Selection::Single(42));
        assert_eq!(settings(None).unwrap().selection, Selection::Batch);
        assert_eq!(settings(Some(0)).unwrap().selection, Selection::Batch);
    }

    #[test]
    fn test_missing_org_is_a_config_error() {
        let err = Settings::new(
            Some("  ".to_string()),
            Some("vitess".to_string()),
            None,
            None,
            WatcherConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("org")));
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let policy = WatcherConfig {
            max_batch_size: 0,
            ..WatcherConfig::default()
        };
        let err = Settings::new(
            Some("vitessio".to_string()),
            Some("vitess".to_string()),
            None,
            None,
            policy,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_parse_ignore_list() {
        assert_eq!(
            parse_ignore_list(" Cluster (vreplication) , ,docker_test,"),
            vec!["cluster (vreplication)".to_string(), "docker_test".to_string()]
        );
        assert!(parse_ignore_list("").is_empty());
    }

    #[test]
    fn test_builders() {
        let settings = settings(None)
            .unwrap()
            .with_dry_run(true)
            .with_audit_db(Some(" ".to_string()))
            .with_ignore_list(Some("e2e"));

        assert!(settings.dry_run);
        assert_eq!(settings.audit_db, None);
        assert_eq!(settings.ignore_workflows, vec!["e2e".to_string()]);
    }
}
