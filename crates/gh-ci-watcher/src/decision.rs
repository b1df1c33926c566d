//! Retry decisions and per-PR reports

use serde::Serialize;

/// What the engine did with one failing check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryOutcome {
    /// A rerun was issued (or simulated in dry-run mode)
    Attempted,
    /// The workflow run already reached the attempt limit
    SkippedLimit,
    /// The PR has too many failing checks, nothing was rerun
    SkippedThrottled,
    /// No failed workflow run matches the check run
    SkippedNotFound,
}

impl RetryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryOutcome::Attempted => "attempted",
            RetryOutcome::SkippedLimit => "skipped-limit",
            RetryOutcome::SkippedThrottled => "skipped-throttled",
            RetryOutcome::SkippedNotFound => "skipped-not-found",
        }
    }
}

impl std::fmt::Display for RetryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decision about one failing check run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetryDecision {
    pub pr_number: u64,
    /// Workflow run name, or the check run name when no run was resolved
    pub workflow_name: String,
    /// Attempt count of the resolved run, 0 when no run was resolved
    pub attempt: u32,
    /// Workflow run URL, or the check run URL when no run was resolved
    pub source_url: String,
    pub outcome: RetryOutcome,
}

/// Result of processing one pull request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeRequestReport {
    pub pr_number: u64,
    /// Completed check runs with a `failure` conclusion
    pub failed_checks: usize,
    /// Reruns issued, or simulated in dry-run mode
    pub started: usize,
    pub decisions: Vec<RetryDecision>,
}

impl ChangeRequestReport {
    pub fn new(pr_number: u64) -> Self {
        Self {
            pr_number,
            ..Self::default()
        }
    }

    pub fn count(&self, outcome: RetryOutcome) -> usize {
        self.decisions
            .iter()
            .filter(|d| d.outcome == outcome)
            .count()
    }
}
