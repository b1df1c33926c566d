//! Octocrab-based GitHub API client
//!
//! Direct implementation of the `GitHubClient` trait using the octocrab library.
//! Pull requests go through octocrab's typed handlers; the Checks and Actions
//! endpoints are called with raw GET/POST requests and decoded into the
//! crate-local wire types below, since only a handful of fields are needed.

use crate::client::{GitHubClient, MAX_PER_PAGE};
use crate::types::{
    CheckConclusion, CheckRun, CheckRunStatus, MergeableState, PullRequest, WorkflowJob,
    WorkflowRun, WorkflowRunConclusion, WorkflowRunStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Direct GitHub API client using octocrab
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
}

impl OctocrabClient {
    /// Create a new client with the given octocrab instance
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }
}

#[derive(Debug, Serialize)]
struct CheckRunsQuery {
    status: &'static str,
    filter: &'static str,
    per_page: u8,
}

#[derive(Debug, Serialize)]
struct WorkflowRunsQuery<'a> {
    branch: &'a str,
    per_page: u8,
}

#[derive(Debug, Serialize)]
struct WorkflowJobsQuery {
    filter: &'static str,
    per_page: u8,
}

impl WorkflowJobsQuery {
    /// Jobs of the run's latest attempt only
    fn latest(per_page: u8) -> Self {
        Self {
            filter: "latest",
            per_page: per_page.min(MAX_PER_PAGE),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CheckRunsPage {
    check_runs: Vec<WireCheckRun>,
}

#[derive(Debug, Deserialize)]
struct WireCheckRun {
    id: u64,
    name: String,
    status: String,
    conclusion: Option<String>,
    check_suite: Option<WireCheckSuite>,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireCheckSuite {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct WorkflowRunsPage {
    workflow_runs: Vec<WireWorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct WireWorkflowRun {
    id: u64,
    name: Option<String>,
    status: String,
    conclusion: Option<String>,
    run_attempt: Option<u32>,
    check_suite_id: Option<u64>,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct WorkflowJobsPage {
    jobs: Vec<WireWorkflowJob>,
}

#[derive(Debug, Deserialize)]
struct WireWorkflowJob {
    id: u64,
    run_id: u64,
    run_attempt: Option<u32>,
    name: String,
    status: String,
    conclusion: Option<String>,
    completed_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl GitHubClient for OctocrabClient {
    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest> {
        debug!("Fetching PR #{} for {}/{}", pr_number, owner, repo);

        let pr = self.octocrab.pulls(owner, repo).get(pr_number).await?;
        Ok(convert_pull_request(&pr))
    }

    async fn list_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        per_page: u8,
    ) -> anyhow::Result<Vec<PullRequest>> {
        debug!("Listing open PRs for {}/{}", owner, repo);

        let page = self
            .octocrab
            .pulls(owner, repo)
            .list()
            .state(octocrab::params::State::Open)
            .sort(octocrab::params::pulls::Sort::Updated)
            .direction(octocrab::params::Direction::Descending)
            .per_page(per_page.min(MAX_PER_PAGE))
            .send()
            .await?;

        let prs: Vec<PullRequest> = page.items.iter().map(convert_pull_request).collect();

        debug!("Listed {} open PRs for {}/{}", prs.len(), owner, repo);
        Ok(prs)
    }

    async fn list_completed_check_runs(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
        per_page: u8,
    ) -> anyhow::Result<Vec<CheckRun>> {
        debug!(
            "Listing completed check runs for {}/{} @ {}",
            owner, repo, commit_sha
        );

        let route = format!("/repos/{}/{}/commits/{}/check-runs", owner, repo, commit_sha);
        let query = CheckRunsQuery {
            status: "completed",
            filter: "latest",
            per_page: per_page.min(MAX_PER_PAGE),
        };
        let page: CheckRunsPage = self.octocrab.get(route, Some(&query)).await?;

        Ok(page.check_runs.into_iter().map(convert_check_run).collect())
    }

    async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        per_page: u8,
    ) -> anyhow::Result<Vec<WorkflowRun>> {
        debug!(
            "Listing workflow runs for {}/{} on branch {}",
            owner, repo, branch
        );

        let route = format!("/repos/{}/{}/actions/runs", owner, repo);
        let query = WorkflowRunsQuery {
            branch,
            per_page: per_page.min(MAX_PER_PAGE),
        };
        let page: WorkflowRunsPage = self.octocrab.get(route, Some(&query)).await?;

        Ok(page
            .workflow_runs
            .into_iter()
            .map(convert_workflow_run)
            .collect())
    }

    async fn list_workflow_jobs(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
        per_page: u8,
    ) -> anyhow::Result<Vec<WorkflowJob>> {
        debug!("Listing jobs of workflow run {} in {}/{}", run_id, owner, repo);

        let route = format!("/repos/{}/{}/actions/runs/{}/jobs", owner, repo, run_id);
        let query = WorkflowJobsQuery::latest(per_page);
        let page: WorkflowJobsPage = self.octocrab.get(route, Some(&query)).await?;

        Ok(page.jobs.into_iter().map(convert_workflow_job).collect())
    }

    async fn rerun_failed_jobs(&self, owner: &str, repo: &str, run_id: u64) -> anyhow::Result<()> {
        debug!("Rerunning failed jobs of run {} in {}/{}", run_id, owner, repo);

        let route = format!(
            "/repos/{}/{}/actions/runs/{}/rerun-failed-jobs",
            owner, repo, run_id
        );
        // Use serde_json::Value as response type for POST requests
        self.octocrab
            .post::<(), serde_json::Value>(route, None::<&()>)
            .await?;
        Ok(())
    }
}

/// Convert octocrab PullRequest to our PullRequest type
fn convert_pull_request(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        title: pr.title.clone().unwrap_or_default(),
        head_sha: pr.head.sha.clone(),
        head_label: pr.head.label.clone().unwrap_or_default(),
        head_branch: pr.head.ref_field.clone(),
        mergeable_state: pr.mergeable_state.as_ref().map(convert_mergeable_state),
        updated_at: pr.updated_at.unwrap_or_else(Utc::now),
        html_url: pr
            .html_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_default(),
    }
}

/// Convert octocrab MergeableState enum to our enum
fn convert_mergeable_state(state: &octocrab::models::pulls::MergeableState) -> MergeableState {
    use octocrab::models::pulls::MergeableState as OMS;
    match state {
        OMS::Clean => MergeableState::Clean,
        OMS::Behind => MergeableState::Behind,
        OMS::Dirty => MergeableState::Dirty,
        OMS::Blocked => MergeableState::Blocked,
        OMS::Unstable => MergeableState::Unstable,
        OMS::Draft => MergeableState::Draft,
        OMS::HasHooks => MergeableState::HasHooks,
        OMS::Unknown => MergeableState::Unknown,
        _ => MergeableState::Unknown,
    }
}

fn convert_check_run(run: WireCheckRun) -> CheckRun {
    CheckRun {
        id: run.id,
        name: run.name,
        status: convert_status_string(&run.status),
        conclusion: run.conclusion.as_deref().and_then(convert_conclusion_string),
        check_suite_id: run.check_suite.map(|suite| suite.id),
        html_url: run.html_url,
    }
}

fn convert_workflow_run(run: WireWorkflowRun) -> WorkflowRun {
    WorkflowRun {
        id: run.id,
        name: run.name.unwrap_or_default(),
        status: convert_run_status_string(&run.status),
        conclusion: run
            .conclusion
            .as_deref()
            .and_then(convert_run_conclusion_string),
        run_attempt: run.run_attempt.unwrap_or(1),
        check_suite_id: run.check_suite_id,
        html_url: run.html_url,
    }
}

fn convert_workflow_job(job: WireWorkflowJob) -> WorkflowJob {
    WorkflowJob {
        id: job.id,
        run_id: job.run_id,
        run_attempt: job.run_attempt.unwrap_or(1),
        name: job.name,
        status: convert_status_string(&job.status),
        conclusion: job.conclusion.as_deref().and_then(convert_conclusion_string),
        completed_at: job.completed_at,
    }
}

/// Convert check run / job status string from GitHub API to our enum
fn convert_status_string(status: &str) -> CheckRunStatus {
    match status.to_lowercase().as_str() {
        "queued" => CheckRunStatus::Queued,
        "in_progress" => CheckRunStatus::InProgress,
        "completed" => CheckRunStatus::Completed,
        "waiting" => CheckRunStatus::Waiting,
        _ => CheckRunStatus::Pending,
    }
}

/// Convert conclusion string from GitHub API to our enum
///
/// Unrecognised conclusions map to `None` so they are never mistaken
/// for a failure.
fn convert_conclusion_string(conclusion: &str) -> Option<CheckConclusion> {
    match conclusion.to_lowercase().as_str() {
        "success" => Some(CheckConclusion::Success),
        "failure" => Some(CheckConclusion::Failure),
        "neutral" => Some(CheckConclusion::Neutral),
        "cancelled" => Some(CheckConclusion::Cancelled),
        "skipped" => Some(CheckConclusion::Skipped),
        "timed_out" => Some(CheckConclusion::TimedOut),
        "action_required" => Some(CheckConclusion::ActionRequired),
        "stale" => Some(CheckConclusion::Stale),
        _ => None,
    }
}

fn convert_run_status_string(status: &str) -> WorkflowRunStatus {
    match status.to_lowercase().as_str() {
        "requested" => WorkflowRunStatus::Requested,
        "queued" => WorkflowRunStatus::Queued,
        "waiting" => WorkflowRunStatus::Waiting,
        "in_progress" => WorkflowRunStatus::InProgress,
        "completed" => WorkflowRunStatus::Completed,
        _ => WorkflowRunStatus::Pending,
    }
}

fn convert_run_conclusion_string(conclusion: &str) -> Option<WorkflowRunConclusion> {
    match conclusion.to_lowercase().as_str() {
        "success" => Some(WorkflowRunConclusion::Success),
        "failure" => Some(WorkflowRunConclusion::Failure),
        "neutral" => Some(WorkflowRunConclusion::Neutral),
        "cancelled" => Some(WorkflowRunConclusion::Cancelled),
        "skipped" => Some(WorkflowRunConclusion::Skipped),
        "timed_out" => Some(WorkflowRunConclusion::TimedOut),
        "action_required" => Some(WorkflowRunConclusion::ActionRequired),
        "stale" => Some(WorkflowRunConclusion::Stale),
        "startup_failure" => Some(WorkflowRunConclusion::StartupFailure),
        _ => None,
    }
}
