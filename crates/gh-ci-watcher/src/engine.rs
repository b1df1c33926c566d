//! Retry decision engine
//!
//! Processes one pull request: lists its completed check runs, trips the
//! circuit breaker when too many of them failed, and otherwise resolves
//! each failure to a workflow run and reruns its failed jobs within the
//! attempt limit.

use crate::audit::AuditSink;
use crate::decision::{ChangeRequestReport, RetryDecision, RetryOutcome};
use crate::resolver::WorkflowRunResolver;
use gh_ci_watcher_config::{Repository, Settings};
use gh_client::{CheckRun, GitHubClient, PullRequest};
use log::{debug, error, info, warn};
use std::sync::Arc;

pub struct RetryEngine {
    client: Arc<dyn GitHubClient>,
    resolver: WorkflowRunResolver,
    sink: Box<dyn AuditSink>,
    repository: Repository,
    max_run_attempts: u32,
    max_failed_checks: usize,
    page_size: u8,
    dry_run: bool,
}

impl RetryEngine {
    pub fn new(
        client: Arc<dyn GitHubClient>,
        settings: &Settings,
        sink: Box<dyn AuditSink>,
    ) -> Self {
        let resolver = WorkflowRunResolver::new(
            Arc::clone(&client),
            settings.repository.clone(),
            settings.policy.page_size,
        );

        Self {
            client,
            resolver,
            sink,
            repository: settings.repository.clone(),
            max_run_attempts: settings.policy.max_run_attempts,
            max_failed_checks: settings.policy.max_failed_checks,
            page_size: settings.policy.page_size,
            dry_run: settings.dry_run,
        }
    }

    /// Fetch PR `pr_number` and retry its failed checks
    ///
    /// A PR that cannot be fetched yields an empty report.
    pub async fn process_pull_request(&self, pr_number: u64) -> ChangeRequestReport {
        let Repository { org, repo, .. } = &self.repository;

        match self.client.fetch_pull_request(org, repo, pr_number).await {
            Ok(pr) => {
                debug!(
                    "PR #{} \"{}\" ({}): mergeable state {:?}, head {} ({})",
                    pr.number,
                    pr.title,
                    pr.html_url,
                    pr.mergeable_state,
                    pr.head_sha,
                    pr.head_label
                );
                self.retry_failed_checks(&pr).await
            }
            Err(e) => {
                warn!("PR #{} not found: {}", pr_number, e);
                ChangeRequestReport::new(pr_number)
            }
        }
    }

    /// Retry the failed checks on the head commit of `pr`
    pub async fn retry_failed_checks(&self, pr: &PullRequest) -> ChangeRequestReport {
        let Repository { org, repo, .. } = &self.repository;
        let mut report = ChangeRequestReport::new(pr.number);

        let check_runs = match self
            .client
            .list_completed_check_runs(org, repo, &pr.head_sha, self.page_size)
            .await
        {
            Ok(runs) => runs,
            Err(e) => {
                error!(
                    "Failed to list check runs for PR #{} @ {}: {}",
                    pr.number, pr.head_sha, e
                );
                return report;
            }
        };

        let failed: Vec<&CheckRun> = check_runs.iter().filter(|run| run.is_failure()).collect();
        report.failed_checks = failed.len();

        if failed.len() > self.max_failed_checks {
            warn!(
                "PR #{} has {} failing checks (limit {}), not rerunning anything",
                pr.number,
                failed.len(),
                self.max_failed_checks
            );
            report.decisions = failed
                .iter()
                .map(|check| unresolved(pr.number, check, RetryOutcome::SkippedThrottled))
                .collect();
            return report;
        }

        let branch = pr.branch();
        for (i, check) in failed.iter().enumerate() {
            debug!(
                "{}: check {} ({}) failed on PR #{}",
                i, check.name, check.id, pr.number
            );

            let Some(run) = self.resolver.resolve(check, branch).await else {
                info!("No workflow run found for check {}", check.name);
                report
                    .decisions
                    .push(unresolved(pr.number, check, RetryOutcome::SkippedNotFound));
                continue;
            };

            let mut decision = RetryDecision {
                pr_number: pr.number,
                workflow_name: run.name.clone(),
                attempt: run.run_attempt,
                source_url: run.html_url.clone(),
                outcome: RetryOutcome::SkippedLimit,
            };

            if run.run_attempt >= self.max_run_attempts {
                info!(
                    "Not rerunning {} since it has already run {} times",
                    run.name, run.run_attempt
                );
                report.decisions.push(decision);
                continue;
            }

            decision.outcome = RetryOutcome::Attempted;
            if let Err(e) = self.sink.record(&decision) {
                warn!("Failed to record retry of {}: {}", run.name, e);
            }
            report.decisions.push(decision);

            if self.dry_run {
                info!(
                    "Dry run: would rerun failed jobs of {} ({}), attempt {}",
                    run.name, run.id, run.run_attempt
                );
                report.started += 1;
                continue;
            }

            match self.client.rerun_failed_jobs(org, repo, run.id).await {
                Ok(()) => {
                    report.started += 1;
                    info!("Successfully started rerun of {} ({})", run.name, run.id);
                }
                Err(e) => {
                    error!("Failed starting rerun of {} ({}): {}", run.name, run.id, e);
                }
            }
        }

        report
    }
}

/// Decision for a check run that never got as far as a workflow run
fn unresolved(pr_number: u64, check: &CheckRun, outcome: RetryOutcome) -> RetryDecision {
    RetryDecision {
        pr_number,
        workflow_name: check.name.clone(),
        attempt: 0,
        source_url: check.html_url.clone().unwrap_or_default(),
        outcome,
    }
}
