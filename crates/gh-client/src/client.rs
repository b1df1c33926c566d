//! GitHub client trait
//!
//! This module defines the core `GitHubClient` trait that all client
//! implementations must satisfy. The watcher only talks to GitHub through
//! this trait, which keeps the decision logic testable against an
//! in-memory implementation.

use crate::types::{CheckRun, PullRequest, WorkflowJob, WorkflowRun};
use async_trait::async_trait;

/// Largest page size the GitHub REST API honours
pub const MAX_PER_PAGE: u8 = 100;

/// GitHub API client trait
///
/// Defines the interface for interacting with the GitHub API.
/// Every list operation fetches a single page; callers pick the page size.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a client can be shared behind
/// an `Arc` between the watcher's components.
///
/// # Example
///
/// ```rust,ignore
/// use gh_client::{GitHubClient, PullRequest};
///
/// async fn open_prs(client: &dyn GitHubClient) -> anyhow::Result<Vec<PullRequest>> {
///     client.list_open_pull_requests("vitessio", "vitess", 30).await
/// }
/// ```
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// Fetch a single pull request by number
    ///
    /// Unlike the list endpoint, this returns the computed mergeable state.
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `pr_number` - Pull request number
    ///
    /// # Returns
    ///
    /// The pull request details, or an error if not found.
    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest>;

    /// List open pull requests, most recently updated first
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner (user or organization)
    /// * `repo` - Repository name
    /// * `per_page` - Page size (capped at [`MAX_PER_PAGE`])
    async fn list_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        per_page: u8,
    ) -> anyhow::Result<Vec<PullRequest>>;

    /// List completed check runs for a commit
    ///
    /// Only the latest attempt of each check is returned.
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `commit_sha` - The commit SHA to get checks for
    /// * `per_page` - Page size (capped at [`MAX_PER_PAGE`])
    async fn list_completed_check_runs(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
        per_page: u8,
    ) -> anyhow::Result<Vec<CheckRun>>;

    /// List workflow runs for a branch, newest first
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `branch` - Branch name the runs were triggered on
    /// * `per_page` - Page size (capped at [`MAX_PER_PAGE`])
    async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        per_page: u8,
    ) -> anyhow::Result<Vec<WorkflowRun>>;

    /// List the jobs of the latest attempt of a workflow run
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `run_id` - Workflow run ID
    /// * `per_page` - Page size (capped at [`MAX_PER_PAGE`])
    async fn list_workflow_jobs(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
        per_page: u8,
    ) -> anyhow::Result<Vec<WorkflowJob>>;

    /// Rerun failed workflow jobs for a specific run
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `run_id` - Workflow run ID
    ///
    /// # Returns
    ///
    /// Ok(()) once GitHub accepted the rerun, error otherwise
    async fn rerun_failed_jobs(&self, owner: &str, repo: &str, run_id: u64) -> anyhow::Result<()>;
}
