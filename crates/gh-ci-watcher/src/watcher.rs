//! One watcher cycle: select PRs, then retry their failed checks in order

use crate::audit::AuditSink;
use crate::decision::{ChangeRequestReport, RetryOutcome};
use crate::engine::RetryEngine;
use crate::selector::ChangeRequestSelector;
use chrono::{DateTime, Utc};
use gh_ci_watcher_config::Settings;
use gh_client::GitHubClient;
use log::{error, info};
use std::sync::Arc;

/// What a cycle did, per PR and in total
#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
    pub reports: Vec<ChangeRequestReport>,
}

impl CycleSummary {
    pub fn processed(&self) -> usize {
        self.reports.len()
    }

    pub fn started(&self) -> usize {
        self.reports.iter().map(|r| r.started).sum()
    }

    pub fn count(&self, outcome: RetryOutcome) -> usize {
        self.reports.iter().map(|r| r.count(outcome)).sum()
    }
}

pub struct Watcher {
    settings: Settings,
    selector: ChangeRequestSelector,
    engine: RetryEngine,
}

impl Watcher {
    pub fn new(
        client: Arc<dyn GitHubClient>,
        settings: Settings,
        sink: Box<dyn AuditSink>,
    ) -> Self {
        let selector = ChangeRequestSelector::new(Arc::clone(&client), &settings);
        let engine = RetryEngine::new(client, &settings, sink);
        Self {
            settings,
            selector,
            engine,
        }
    }

    /// Run one cycle anchored at `now`
    ///
    /// PRs are processed one after another; a PR that fails never stops
    /// the ones after it.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> CycleSummary {
        let mut summary = CycleSummary::default();

        let numbers = match self.selector.select(self.settings.selection, now).await {
            Ok(numbers) => numbers,
            Err(e) => {
                error!(
                    "Failed to list open PRs for {}: {}",
                    self.settings.repository, e
                );
                return summary;
            }
        };

        info!(
            "Processing {} PR(s) in {}{}",
            numbers.len(),
            self.settings.repository,
            if self.settings.dry_run { " (dry run)" } else { "" }
        );

        for number in numbers {
            let report = self.engine.process_pull_request(number).await;
            info!(
                "PR #{}: {} failing check(s), started {} rerun(s)",
                report.pr_number, report.failed_checks, report.started
            );
            summary.reports.push(report);
        }

        summary
    }
}
