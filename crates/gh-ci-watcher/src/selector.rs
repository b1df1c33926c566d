//! Pull request selection
//!
//! In batch mode the watcher only looks at recently updated PRs that
//! GitHub reports as `blocked`. "Blocked" also covers PRs that merely await
//! review, so this is a heuristic for "has failing or pending checks", and
//! PRs whose mergeable state GitHub has not computed are left out.

use chrono::{DateTime, Duration, Utc};
use gh_ci_watcher_config::{Repository, Selection, Settings};
use gh_client::GitHubClient;
use log::{debug, warn};
use std::sync::Arc;

pub struct ChangeRequestSelector {
    client: Arc<dyn GitHubClient>,
    repository: Repository,
    recency_days: u32,
    max_batch_size: usize,
    page_size: u8,
}

impl ChangeRequestSelector {
    pub fn new(client: Arc<dyn GitHubClient>, settings: &Settings) -> Self {
        Self {
            client,
            repository: settings.repository.clone(),
            recency_days: settings.policy.recency_days,
            max_batch_size: settings.policy.max_batch_size,
            page_size: settings.policy.page_size,
        }
    }

    /// PR numbers to process, most recently updated first
    ///
    /// `now` anchors the recency window. Fails only when the open PRs
    /// cannot be listed.
    pub async fn select(
        &self,
        selection: Selection,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<u64>> {
        match selection {
            Selection::Single(number) => Ok(vec![number]),
            Selection::Batch => self.select_batch(now).await,
        }
    }

    async fn select_batch(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<u64>> {
        let Repository { org, repo, .. } = &self.repository;
        // A window reaching past the representable range has no cutoff
        let cutoff = Duration::try_days(i64::from(self.recency_days))
            .and_then(|window| now.checked_sub_signed(window));

        let prs = self
            .client
            .list_open_pull_requests(org, repo, self.page_size)
            .await?;

        let mut selected = Vec::new();
        for pr in prs {
            if selected.len() >= self.max_batch_size {
                break;
            }
            // Listing is ordered by update time, nothing after this is recent
            if cutoff.is_some_and(|cutoff| pr.updated_at < cutoff) {
                debug!(
                    "PR #{} last updated {}, outside the {} day window",
                    pr.number, pr.updated_at, self.recency_days
                );
                break;
            }

            // The list endpoint never computes mergeable state
            let blocked = match pr.mergeable_state {
                Some(_) => pr.is_blocked(),
                None => match self.client.fetch_pull_request(org, repo, pr.number).await {
                    Ok(detail) => detail.is_blocked(),
                    Err(e) => {
                        warn!("Failed to fetch PR #{}: {}", pr.number, e);
                        false
                    }
                },
            };

            if blocked {
                selected.push(pr.number);
            } else {
                debug!("PR #{} is not blocked, skipping", pr.number);
            }
        }

        debug!("Selected {} PR(s): {:?}", selected.len(), selected);
        Ok(selected)
    }
}
