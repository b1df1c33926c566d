//! GitHub API client for the CI watcher
//!
//! This crate provides a trait-based GitHub API client covering the
//! handful of endpoints the watcher needs: pull request lookup, check
//! runs, Actions workflow runs and jobs, and rerunning failed jobs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              GitHubClient trait                  │
//! │  - fetch_pull_request()                          │
//! │  - list_open_pull_requests()                     │
//! │  - list_completed_check_runs()                   │
//! │  - list_workflow_runs() / list_workflow_jobs()   │
//! │  - rerun_failed_jobs()                           │
//! └─────────────────────────────────────────────────┘
//!                        │
//!                        ▼
//!              ┌─────────────────┐
//!              │ OctocrabClient  │
//!              │ (direct API)    │
//!              └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_client::{GitHubClient, TokenResolver};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let token = TokenResolver::new().resolve(None, None).await?;
//! let client = gh_client::build_client(None, token)?;
//!
//! let prs = client.list_open_pull_requests("owner", "repo", 30).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod octocrab_client;
pub mod types;

/// Default GitHub host (public GitHub)
pub const DEFAULT_HOST: &str = "github.com";

pub use auth::{build_client, TokenResolver};
pub use client::{GitHubClient, MAX_PER_PAGE};
pub use octocrab_client::OctocrabClient;
pub use types::{
    CheckConclusion, CheckRun, CheckRunStatus, MergeableState, PullRequest, WorkflowJob,
    WorkflowRun, WorkflowRunConclusion, WorkflowRunStatus,
};
