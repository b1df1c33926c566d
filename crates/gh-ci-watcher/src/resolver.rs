//! Workflow run resolution
//!
//! Maps a failed check run to the failed Actions workflow run whose jobs
//! should be rerun. Jobs that already passed, in the same run or in a more
//! recent one, suppress an older failure with the same name, so a job that
//! was retried and went green is never the reason for another rerun.

use gh_ci_watcher_config::Repository;
use gh_client::{
    CheckConclusion, CheckRun, CheckRunStatus, GitHubClient, WorkflowJob, WorkflowRun,
};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Finds the workflow run behind a failed check run
pub struct WorkflowRunResolver {
    client: Arc<dyn GitHubClient>,
    repository: Repository,
    page_size: u8,
}

impl WorkflowRunResolver {
    pub fn new(client: Arc<dyn GitHubClient>, repository: Repository, page_size: u8) -> Self {
        Self {
            client,
            repository,
            page_size,
        }
    }

    /// Resolve the workflow run to retry for `check_run` on `branch`
    ///
    /// Only the first page of runs is inspected, newest first. Returns
    /// `None` when no failed run has an unsuppressed failing job matching
    /// the check run, or when GitHub could not be queried.
    pub async fn resolve(&self, check_run: &CheckRun, branch: &str) -> Option<WorkflowRun> {
        let Repository { org, repo, .. } = &self.repository;

        let runs = match self
            .client
            .list_workflow_runs(org, repo, branch, self.page_size)
            .await
        {
            Ok(runs) => runs,
            Err(e) => {
                warn!("Failed to list workflow runs for branch {}: {}", branch, e);
                return None;
            }
        };

        // Names of matching jobs seen passing during this resolution
        let mut succeeded: HashSet<String> = HashSet::new();

        for run in runs.iter().filter(|run| run.is_failed()) {
            let jobs = match self
                .client
                .list_workflow_jobs(org, repo, run.id, self.page_size)
                .await
            {
                Ok(jobs) => jobs,
                Err(e) => {
                    warn!("Failed to list jobs of workflow run {}: {}", run.id, e);
                    return None;
                }
            };

            if let Some(job) = terminal_failure(run, &jobs, check_run, &mut succeeded) {
                info!(
                    "Check {} matches workflow run {} ({}), failed job {} completed at {}",
                    check_run.name,
                    run.name,
                    run.id,
                    job.name,
                    job.completed_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "unknown".to_string()),
                );
                return Some(run.clone());
            }
        }

        debug!(
            "No failed workflow run on {} matches check {} ({})",
            branch, check_run.name, check_run.id
        );
        None
    }
}

/// Find the job that makes `run` the one to retry for `check_run`
///
/// A completed job is eligible when its name equals the check run's name or
/// when the run belongs to the check run's check suite. Within the run an
/// eligible success suppresses failures of the same name from the same or an
/// earlier attempt, whatever order the jobs are listed in. Names recorded in
/// `succeeded` by earlier-listed runs suppress failures of any attempt. Every
/// eligible success of this run is added to `succeeded` afterwards.
fn terminal_failure<'j>(
    run: &WorkflowRun,
    jobs: &'j [WorkflowJob],
    check_run: &CheckRun,
    succeeded: &mut HashSet<String>,
) -> Option<&'j WorkflowJob> {
    let same_suite =
        run.check_suite_id.is_some() && run.check_suite_id == check_run.check_suite_id;

    let eligible: Vec<&WorkflowJob> = jobs
        .iter()
        .filter(|job| job.status == CheckRunStatus::Completed)
        .filter(|job| same_suite || job.name == check_run.name)
        .collect();

    // Latest attempt each job name passed in
    let mut passed_at: HashMap<&str, u32> = HashMap::new();
    for job in eligible.iter().copied() {
        if let Some(CheckConclusion::Success) = job.conclusion {
            let attempt = passed_at.entry(job.name.as_str()).or_insert(job.run_attempt);
            *attempt = (*attempt).max(job.run_attempt);
        }
    }

    let passed_since = |job: &WorkflowJob| {
        matches!(passed_at.get(job.name.as_str()), Some(&attempt) if attempt >= job.run_attempt)
    };

    let found = eligible.into_iter().find(|job| match job.conclusion {
        Some(CheckConclusion::Failure) => !succeeded.contains(&job.name) && !passed_since(*job),
        Some(
            CheckConclusion::Success
            | CheckConclusion::Neutral
            | CheckConclusion::Cancelled
            | CheckConclusion::Skipped
            | CheckConclusion::TimedOut
            | CheckConclusion::ActionRequired
            | CheckConclusion::Stale,
        )
        | None => false,
    });

    succeeded.extend(passed_at.into_keys().map(str::to_string));
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{failed_check, failed_run, job, MockClient};
    use gh_client::{WorkflowRunConclusion, WorkflowRunStatus};

    fn resolver(mock: Arc<MockClient>) -> WorkflowRunResolver {
        WorkflowRunResolver::new(mock, Repository::new("org", "repo"), 100)
    }

    #[test]
    fn test_success_before_failure_suppresses_run() {
        let run = failed_run(1, "CI", 1, 10);
        let check = failed_check(100, "A", 99);
        let jobs = vec![
            job(1, 1, "A", CheckConclusion::Success),
            job(2, 1, "A", CheckConclusion::Failure),
        ];

        let mut succeeded = HashSet::new();
        assert!(terminal_failure(&run, &jobs, &check, &mut succeeded).is_none());
        assert!(succeeded.contains("A"));
    }

    #[test]
    fn test_failure_before_success_suppresses_run() {
        let run = failed_run(1, "CI", 1, 10);
        let check = failed_check(100, "A", 99);
        let jobs = vec![
            job(1, 1, "A", CheckConclusion::Failure),
            job(2, 1, "A", CheckConclusion::Success),
        ];

        let mut succeeded = HashSet::new();
        assert!(terminal_failure(&run, &jobs, &check, &mut succeeded).is_none());
    }

    #[test]
    fn test_earlier_attempt_success_keeps_latest_failure() {
        let run = failed_run(1, "CI", 2, 10);
        let check = failed_check(100, "A", 99);
        let mut passed = job(1, 1, "A", CheckConclusion::Success);
        passed.run_attempt = 1;
        let mut failed = job(2, 1, "A", CheckConclusion::Failure);
        failed.run_attempt = 2;
        let jobs = vec![passed, failed];

        let mut succeeded = HashSet::new();
        let found = terminal_failure(&run, &jobs, &check, &mut succeeded).unwrap();
        assert_eq!(found.id, 2);
    }

    #[test]
    fn test_later_attempt_success_suppresses_earlier_failure() {
        let run = failed_run(1, "CI", 2, 10);
        let check = failed_check(100, "A", 99);
        let mut failed = job(1, 1, "A", CheckConclusion::Failure);
        failed.run_attempt = 1;
        let mut passed = job(2, 1, "A", CheckConclusion::Success);
        passed.run_attempt = 2;
        let jobs = vec![failed, passed];

        let mut succeeded = HashSet::new();
        assert!(terminal_failure(&run, &jobs, &check, &mut succeeded).is_none());
    }

    #[test]
    fn test_unrelated_jobs_are_ignored() {
        let run = failed_run(1, "CI", 1, 10);
        let check = failed_check(100, "A", 99);
        let jobs = vec![
            job(1, 1, "B", CheckConclusion::Failure),
            job(2, 1, "A", CheckConclusion::Cancelled),
        ];

        let mut succeeded = HashSet::new();
        assert!(terminal_failure(&run, &jobs, &check, &mut succeeded).is_none());
    }

    #[test]
    fn test_same_check_suite_matches_any_job_name() {
        let run = failed_run(1, "CI", 1, 10);
        let check = failed_check(100, "Some check", 10);
        let jobs = vec![job(1, 1, "B", CheckConclusion::Failure)];

        let mut succeeded = HashSet::new();
        let found = terminal_failure(&run, &jobs, &check, &mut succeeded).unwrap();
        assert_eq!(found.id, 1);
    }

    #[test]
    fn test_incomplete_jobs_are_skipped() {
        let run = failed_run(1, "CI", 1, 10);
        let check = failed_check(100, "A", 99);
        let mut pending = job(1, 1, "A", CheckConclusion::Failure);
        pending.status = CheckRunStatus::InProgress;

        let mut succeeded = HashSet::new();
        assert!(terminal_failure(&run, &[pending], &check, &mut succeeded).is_none());
    }

    #[tokio::test]
    async fn test_resolves_failed_run_with_matching_job() {
        let mut mock = MockClient::default();
        mock.workflow_runs = vec![failed_run(7, "Unit Test", 1, 70)];
        mock.jobs.insert(7, vec![job(1, 7, "unit", CheckConclusion::Failure)]);
        let mock = Arc::new(mock);

        let run = resolver(mock.clone())
            .resolve(&failed_check(100, "unit", 999), "feature-x")
            .await
            .unwrap();

        assert_eq!(run.id, 7);
    }

    #[tokio::test]
    async fn test_only_completed_failed_runs_are_candidates() {
        let mut in_progress = failed_run(1, "CI", 1, 10);
        in_progress.status = WorkflowRunStatus::InProgress;
        in_progress.conclusion = None;
        let mut passed = failed_run(2, "CI", 1, 20);
        passed.conclusion = Some(WorkflowRunConclusion::Success);

        let mut mock = MockClient::default();
        mock.workflow_runs = vec![in_progress, passed];
        mock.jobs.insert(1, vec![job(1, 1, "unit", CheckConclusion::Failure)]);
        mock.jobs.insert(2, vec![job(2, 2, "unit", CheckConclusion::Failure)]);
        let mock = Arc::new(mock);

        let run = resolver(mock.clone())
            .resolve(&failed_check(100, "unit", 999), "feature-x")
            .await;

        assert!(run.is_none());
        assert!(mock.job_listings().is_empty());
    }

    #[tokio::test]
    async fn test_newer_success_suppresses_older_failed_run() {
        // Runs are listed newest first: the newer run passed "unit" but failed
        // elsewhere, so the older "unit" failure is stale.
        let mut mock = MockClient::default();
        mock.workflow_runs = vec![failed_run(2, "CI", 1, 20), failed_run(1, "CI", 1, 10)];
        mock.jobs.insert(
            2,
            vec![
                job(3, 2, "unit", CheckConclusion::Success),
                job(4, 2, "lint", CheckConclusion::Failure),
            ],
        );
        mock.jobs.insert(1, vec![job(1, 1, "unit", CheckConclusion::Failure)]);
        let mock = Arc::new(mock);

        let run = resolver(mock.clone())
            .resolve(&failed_check(100, "unit", 999), "feature-x")
            .await;

        assert!(run.is_none());
        assert_eq!(mock.job_listings(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_listing_errors_resolve_to_not_found() {
        let mut mock = MockClient::default();
        mock.fail_workflow_runs = true;
        let run = resolver(Arc::new(mock))
            .resolve(&failed_check(100, "unit", 999), "feature-x")
            .await;
        assert!(run.is_none());

        let mut mock = MockClient::default();
        mock.workflow_runs = vec![failed_run(1, "CI", 1, 10), failed_run(2, "CI", 1, 20)];
        mock.jobs.insert(2, vec![job(1, 2, "unit", CheckConclusion::Failure)]);
        mock.fail_jobs_for.insert(1);
        let mock = Arc::new(mock);

        let run = resolver(mock.clone())
            .resolve(&failed_check(100, "unit", 999), "feature-x")
            .await;
        assert!(run.is_none());
        assert_eq!(mock.job_listings(), vec![1]);
    }
}
