//! In-memory GitHub client and audit sinks shared by the unit tests

use crate::audit::{AuditError, AuditSink};
use crate::decision::RetryDecision;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gh_ci_watcher_config::{Repository, Selection, Settings, WatcherConfig};
use gh_client::{
    CheckConclusion, CheckRun, CheckRunStatus, GitHubClient, MergeableState, PullRequest,
    WorkflowJob, WorkflowRun, WorkflowRunConclusion, WorkflowRunStatus,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Mock client for testing
///
/// Serves canned data and records every call that matters to the
/// assertions (reruns, job listings, PR fetches).
#[derive(Debug, Default)]
pub struct MockClient {
    pub pull_requests: Vec<PullRequest>,
    /// Overrides returned by `fetch_pull_request`, keyed by PR number
    pub pull_request_details: HashMap<u64, PullRequest>,
    pub check_runs: Vec<CheckRun>,
    pub workflow_runs: Vec<WorkflowRun>,
    pub jobs: HashMap<u64, Vec<WorkflowJob>>,

    pub fail_fetch_for: HashSet<u64>,
    pub fail_check_runs: bool,
    pub fail_workflow_runs: bool,
    pub fail_jobs_for: HashSet<u64>,
    pub fail_rerun_for: HashSet<u64>,

    pub reruns: Mutex<Vec<u64>>,
    pub job_listings: Mutex<Vec<u64>>,
    pub pr_fetches: Mutex<Vec<u64>>,
}

impl MockClient {
    pub fn reruns(&self) -> Vec<u64> {
        self.reruns.lock().unwrap().clone()
    }

    pub fn job_listings(&self) -> Vec<u64> {
        self.job_listings.lock().unwrap().clone()
    }

    pub fn pr_fetches(&self) -> Vec<u64> {
        self.pr_fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitHubClient for MockClient {
    async fn fetch_pull_request(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest> {
        self.pr_fetches.lock().unwrap().push(pr_number);
        if self.fail_fetch_for.contains(&pr_number) {
            anyhow::bail!("PR {} unavailable", pr_number);
        }
        self.pull_request_details
            .get(&pr_number)
            .or_else(|| self.pull_requests.iter().find(|pr| pr.number == pr_number))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("PR not found"))
    }

    async fn list_open_pull_requests(
        &self,
        _owner: &str,
        _repo: &str,
        per_page: u8,
    ) -> anyhow::Result<Vec<PullRequest>> {
        let mut prs = self.pull_requests.clone();
        prs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        prs.truncate(per_page as usize);
        Ok(prs)
    }

    async fn list_completed_check_runs(
        &self,
        _owner: &str,
        _repo: &str,
        _commit_sha: &str,
        _per_page: u8,
    ) -> anyhow::Result<Vec<CheckRun>> {
        if self.fail_check_runs {
            anyhow::bail!("check runs unavailable");
        }
        Ok(self.check_runs.clone())
    }

    async fn list_workflow_runs(
        &self,
        _owner: &str,
        _repo: &str,
        _branch: &str,
        _per_page: u8,
    ) -> anyhow::Result<Vec<WorkflowRun>> {
        if self.fail_workflow_runs {
            anyhow::bail!("workflow runs unavailable");
        }
        Ok(self.workflow_runs.clone())
    }

    async fn list_workflow_jobs(
        &self,
        _owner: &str,
        _repo: &str,
        run_id: u64,
        _per_page: u8,
    ) -> anyhow::Result<Vec<WorkflowJob>> {
        self.job_listings.lock().unwrap().push(run_id);
        if self.fail_jobs_for.contains(&run_id) {
            anyhow::bail!("jobs of run {} unavailable", run_id);
        }
        Ok(self.jobs.get(&run_id).cloned().unwrap_or_default())
    }

    async fn rerun_failed_jobs(
        &self,
        _owner: &str,
        _repo: &str,
        run_id: u64,
    ) -> anyhow::Result<()> {
        self.reruns.lock().unwrap().push(run_id);
        if self.fail_rerun_for.contains(&run_id) {
            anyhow::bail!("rerun of {} rejected", run_id);
        }
        Ok(())
    }
}

/// Audit sink keeping decisions in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub decisions: Arc<Mutex<Vec<RetryDecision>>>,
}

impl AuditSink for RecordingSink {
    fn record(&self, decision: &RetryDecision) -> Result<(), AuditError> {
        self.decisions.lock().unwrap().push(decision.clone());
        Ok(())
    }
}

/// Audit sink whose store is always unreachable
#[derive(Debug, Clone, Default)]
pub struct FailingSink;

impl AuditSink for FailingSink {
    fn record(&self, _decision: &RetryDecision) -> Result<(), AuditError> {
        Err(AuditError::Unavailable("store is down".to_string()))
    }
}

pub fn settings(selection: Selection) -> Settings {
    Settings {
        repository: Repository::new("org", "repo"),
        selection,
        dry_run: false,
        audit_db: None,
        ignore_workflows: Vec::new(),
        policy: WatcherConfig::default(),
    }
}

pub fn pull_request(
    number: u64,
    mergeable_state: Option<MergeableState>,
    updated_at: DateTime<Utc>,
) -> PullRequest {
    PullRequest {
        number,
        title: format!("PR {}", number),
        head_sha: format!("sha{}", number),
        head_label: format!("org:branch-{}", number),
        head_branch: format!("branch-{}", number),
        mergeable_state,
        updated_at,
        html_url: format!("https://github.com/org/repo/pull/{}", number),
    }
}

pub fn failed_check(id: u64, name: &str, check_suite_id: u64) -> CheckRun {
    CheckRun {
        id,
        name: name.to_string(),
        status: CheckRunStatus::Completed,
        conclusion: Some(CheckConclusion::Failure),
        check_suite_id: Some(check_suite_id),
        html_url: Some(format!("https://github.com/org/repo/runs/{}", id)),
    }
}

pub fn passed_check(id: u64, name: &str, check_suite_id: u64) -> CheckRun {
    CheckRun {
        conclusion: Some(CheckConclusion::Success),
        ..failed_check(id, name, check_suite_id)
    }
}

pub fn failed_run(id: u64, name: &str, run_attempt: u32, check_suite_id: u64) -> WorkflowRun {
    WorkflowRun {
        id,
        name: name.to_string(),
        status: WorkflowRunStatus::Completed,
        conclusion: Some(WorkflowRunConclusion::Failure),
        run_attempt,
        check_suite_id: Some(check_suite_id),
        html_url: format!("https://github.com/org/repo/actions/runs/{}", id),
    }
}

pub fn job(id: u64, run_id: u64, name: &str, conclusion: CheckConclusion) -> WorkflowJob {
    WorkflowJob {
        id,
        run_id,
        run_attempt: 1,
        name: name.to_string(),
        status: CheckRunStatus::Completed,
        conclusion: Some(conclusion),
        completed_at: Some(Utc::now()),
    }
}
