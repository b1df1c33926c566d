//! Reruns failed GitHub Actions jobs on pull requests
//!
//! A cycle selects pull requests (one given PR, or the most recently
//! updated blocked ones), looks at the completed check runs of each head
//! commit and reruns the failed jobs of the workflow runs behind them.
//!
//! ```text
//! ChangeRequestSelector ─► RetryEngine ─► WorkflowRunResolver ─► GitHubClient
//!                               │
//!                               └──────► AuditSink
//! ```
//!
//! Reruns are bounded three ways: a workflow run at the attempt limit is
//! left alone, a PR with more failing checks than the ceiling gets no
//! reruns at all, and a failing job that already passed under the same
//! name is never the reason for a rerun.

pub mod audit;
pub mod cli;
pub mod decision;
pub mod engine;
pub mod logger;
pub mod resolver;
pub mod selector;
pub mod watcher;

#[cfg(test)]
mod testing;

pub use audit::{open_sink, AuditError, AuditSink, NoopAuditSink, SqliteAuditSink};
pub use decision::{ChangeRequestReport, RetryDecision, RetryOutcome};
pub use engine::RetryEngine;
pub use resolver::WorkflowRunResolver;
pub use selector::ChangeRequestSelector;
pub use watcher::{CycleSummary, Watcher};
