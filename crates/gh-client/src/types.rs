//! GitHub API data transfer objects
//!
//! These types represent the data returned from the GitHub API.
//! They are intentionally separate from the watcher's decision logic
//! to keep this crate pure and reusable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pull request from the GitHub API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number (e.g., 123)
    pub number: u64,

    /// PR title
    pub title: String,

    /// HEAD commit SHA
    pub head_sha: String,

    /// HEAD label in `owner:branch` form
    pub head_label: String,

    /// HEAD branch name (e.g., "feature/foo")
    pub head_branch: String,

    /// Mergeable state from GitHub (null if not yet computed, or when the
    /// PR came from the list endpoint which never computes it)
    pub mergeable_state: Option<MergeableState>,

    /// When the PR was last updated
    pub updated_at: DateTime<Utc>,

    /// PR URL for opening in browser
    pub html_url: String,
}

impl PullRequest {
    /// Branch name used to look up workflow runs.
    ///
    /// Taken from the part of the head label after `owner:`, falling back
    /// to the head ref when the label carries no owner prefix.
    pub fn branch(&self) -> &str {
        match self.head_label.split_once(':') {
            Some((_, branch)) if !branch.is_empty() => branch,
            _ => &self.head_branch,
        }
    }

    /// Whether GitHub reports the PR as blocked
    ///
    /// An unknown (null) mergeable state is not blocked.
    pub fn is_blocked(&self) -> bool {
        matches!(self.mergeable_state, Some(MergeableState::Blocked))
    }
}

/// Mergeable state as reported by GitHub
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeableState {
    /// The merge is clean
    Clean,
    /// The head branch is behind the base branch
    Behind,
    /// The merge has conflicts
    Dirty,
    /// The merge is blocked (e.g., by required reviews or failing checks)
    Blocked,
    /// CI checks are failing or pending, but merging is allowed
    Unstable,
    /// The PR is a draft
    Draft,
    /// Mergeable with passing commit status and pre-receive hooks
    HasHooks,
    /// State is unknown or not yet computed
    #[default]
    Unknown,
}

/// A CI check run from the GitHub API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRun {
    /// Check run ID
    pub id: u64,

    /// Name of the check (e.g., "build", "test")
    pub name: String,

    /// Current status
    pub status: CheckRunStatus,

    /// Conclusion (only set when status is Completed)
    pub conclusion: Option<CheckConclusion>,

    /// ID of the check suite this run belongs to
    pub check_suite_id: Option<u64>,

    /// URL to the check run in the browser
    pub html_url: Option<String>,
}

impl CheckRun {
    /// Completed with a `failure` conclusion
    pub fn is_failure(&self) -> bool {
        self.status == CheckRunStatus::Completed
            && self.conclusion == Some(CheckConclusion::Failure)
    }
}

/// Status of a check run or workflow job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    /// Check is queued
    Queued,
    /// Check is in progress
    InProgress,
    /// Check has completed
    Completed,
    /// Check is waiting on a deployment protection rule
    Waiting,
    /// Check is pending
    Pending,
}

/// Conclusion of a completed check run or workflow job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    /// Check passed
    Success,
    /// Check failed
    Failure,
    /// Check was neutral (neither success nor failure)
    Neutral,
    /// Check was cancelled
    Cancelled,
    /// Check was skipped
    Skipped,
    /// Check timed out
    TimedOut,
    /// Action is required from the user
    ActionRequired,
    /// Check is stale (superseded by newer run)
    Stale,
}

/// A GitHub Actions workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Workflow run ID
    pub id: u64,
    /// Name of the workflow
    pub name: String,
    /// Status of the run
    pub status: WorkflowRunStatus,
    /// Conclusion (only set when completed)
    pub conclusion: Option<WorkflowRunConclusion>,
    /// Attempt number of the run, starting at 1
    pub run_attempt: u32,
    /// ID of the check suite backing this run
    pub check_suite_id: Option<u64>,
    /// URL to view the workflow run
    pub html_url: String,
}

impl WorkflowRun {
    /// Completed with a `failure` conclusion
    pub fn is_failed(&self) -> bool {
        self.status == WorkflowRunStatus::Completed
            && self.conclusion == Some(WorkflowRunConclusion::Failure)
    }
}

/// Status of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowRunStatus {
    /// Workflow was requested
    Requested,
    /// Workflow is queued
    Queued,
    /// Workflow is waiting
    Waiting,
    /// Workflow is in progress
    InProgress,
    /// Workflow has completed
    Completed,
    /// Workflow is pending
    Pending,
}

/// Conclusion of a completed workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowRunConclusion {
    /// Workflow succeeded
    Success,
    /// Workflow failed
    Failure,
    /// Workflow was neutral
    Neutral,
    /// Workflow was cancelled
    Cancelled,
    /// Workflow was skipped
    Skipped,
    /// Workflow timed out
    TimedOut,
    /// Action required
    ActionRequired,
    /// Workflow is stale
    Stale,
    /// Workflow failed at startup
    StartupFailure,
}

/// A single job inside a workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowJob {
    /// Job ID
    pub id: u64,
    /// ID of the workflow run this job belongs to
    pub run_id: u64,
    /// Attempt of the run this job executed in
    pub run_attempt: u32,
    /// Job name as shown in the checks tab
    pub name: String,
    /// Current status
    pub status: CheckRunStatus,
    /// Conclusion (only set when completed)
    pub conclusion: Option<CheckConclusion>,
    /// When the job completed
    pub completed_at: Option<DateTime<Utc>>,
}
