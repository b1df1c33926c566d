use anyhow::Context;
use clap::Parser;
use gh_ci_watcher::cli::Cli;
use gh_ci_watcher::{logger, open_sink, RetryOutcome, Watcher};
use gh_ci_watcher_config::{Selection, WatcherConfig};
use gh_client::TokenResolver;
use std::path::Path;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let file_config = WatcherConfig::load(cli.config.as_deref())?;
    let (settings, token) = cli.into_settings(file_config)?;

    logger::init(Path::new(&settings.policy.log_file))?;

    match settings.selection {
        Selection::Single(number) => {
            log::info!("Starting watcher for {}, PR #{}", settings.repository, number)
        }
        Selection::Batch => log::info!(
            "Starting watcher for {}, up to {} blocked PR(s) updated in the last {} day(s)",
            settings.repository,
            settings.policy.max_batch_size,
            settings.policy.recency_days
        ),
    }
    if !settings.ignore_workflows.is_empty() {
        log::info!(
            "Ignore list {:?} is parsed but not applied yet",
            settings.ignore_workflows
        );
    }

    let host = settings.repository.host.clone();
    let token = TokenResolver::new()
        .resolve(token.as_deref(), host.as_deref())
        .await?;
    let client = gh_client::build_client(host.as_deref(), token)?;
    let sink = open_sink(settings.audit_db.as_deref()).context("Failed to open audit store")?;

    let watcher = Watcher::new(Arc::new(client), settings, sink);
    let summary = watcher.run_cycle(chrono::Utc::now()).await;

    log::info!(
        "Done, started {} rerun(s) across {} PR(s) ({} over attempt limit, {} throttled, {} without workflow run)",
        summary.started(),
        summary.processed(),
        summary.count(RetryOutcome::SkippedLimit),
        summary.count(RetryOutcome::SkippedThrottled),
        summary.count(RetryOutcome::SkippedNotFound)
    );
    Ok(())
}
