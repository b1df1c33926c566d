//! Audit trail of retry decisions
//!
//! Recording is best effort: the engine logs a failed write and carries on.
//! Without an audit store the engine gets a [`NoopAuditSink`].

use crate::decision::RetryDecision;
use log::{debug, info};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("audit store unavailable: {0}")]
    Unavailable(String),
}

/// Destination for retry decisions
pub trait AuditSink: Send + Sync {
    fn record(&self, decision: &RetryDecision) -> Result<(), AuditError>;
}

/// Sink used when no audit store is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _decision: &RetryDecision) -> Result<(), AuditError> {
        Ok(())
    }
}

/// SQLite-backed audit store.
///
/// One connection is opened at startup and reused for every insert. Each
/// decision is a single independent statement, no transactions.
pub struct SqliteAuditSink {
    conn: Mutex<Connection>,
}

impl SqliteAuditSink {
    /// Open (creating if needed) the store at `path` and ensure the schema exists.
    ///
    /// Accepts a plain file path, `:memory:`, or a `sqlite://` prefixed path.
    pub fn open(dsn: &str) -> Result<Self, AuditError> {
        let path = dsn.strip_prefix("sqlite://").unwrap_or(dsn);
        let conn = Connection::open(Path::new(path))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS retry_decisions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                pr_number INTEGER NOT NULL,
                workflow_name TEXT NOT NULL,
                attempt INTEGER NOT NULL,
                source_url TEXT NOT NULL,
                outcome TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            );",
        )?;

        let sink = Self {
            conn: Mutex::new(conn),
        };
        info!(
            "Recording retry decisions to {} ({} already recorded)",
            path,
            sink.len()?
        );
        Ok(sink)
    }

    /// Number of recorded decisions
    fn len(&self) -> Result<usize, AuditError> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM retry_decisions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, AuditError> {
        self.conn
            .lock()
            .map_err(|_| AuditError::Unavailable("connection lock poisoned".to_string()))
    }
}

impl AuditSink for SqliteAuditSink {
    fn record(&self, decision: &RetryDecision) -> Result<(), AuditError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO retry_decisions
                (pr_number, workflow_name, attempt, source_url, outcome, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                decision.pr_number as i64,
                decision.workflow_name,
                decision.attempt,
                decision.source_url,
                decision.outcome.as_str(),
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        debug!(
            "Recorded {} decision for PR #{} ({})",
            decision.outcome, decision.pr_number, decision.workflow_name
        );
        Ok(())
    }
}

/// Open the configured audit store, or a no-op sink when none is configured
pub fn open_sink(dsn: Option<&str>) -> Result<Box<dyn AuditSink>, AuditError> {
    match dsn {
        Some(dsn) => Ok(Box::new(SqliteAuditSink::open(dsn)?)),
        None => {
            debug!("No audit store configured");
            Ok(Box::new(NoopAuditSink))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::RetryOutcome;

    fn decision() -> RetryDecision {
        RetryDecision {
            pr_number: 42,
            workflow_name: "Cluster (vtgate)".to_string(),
            attempt: 2,
            source_url: "https://github.com/org/repo/actions/runs/7".to_string(),
            outcome: RetryOutcome::Attempted,
        }
    }

    #[test]
    fn test_sqlite_sink_records_rows() {
        let sink = SqliteAuditSink::open(":memory:").unwrap();
        assert_eq!(sink.len().unwrap(), 0);

        sink.record(&decision()).unwrap();
        sink.record(&decision()).unwrap();
        assert_eq!(sink.len().unwrap(), 2);

        let conn = sink.lock().unwrap();
        let (name, attempt, outcome): (String, u32, String) = conn
            .query_row(
                "SELECT workflow_name, attempt, outcome FROM retry_decisions LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(name, "Cluster (vtgate)");
        assert_eq!(attempt, 2);
        assert_eq!(outcome, "attempted");
    }

    #[test]
    fn test_sqlite_sink_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.db");
        let dsn = format!("sqlite://{}", path.display());

        SqliteAuditSink::open(&dsn)
            .unwrap()
            .record(&decision())
            .unwrap();

        let reopened = SqliteAuditSink::open(&dsn).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
    }

    #[test]
    fn test_open_sink_without_dsn_is_noop() {
        let sink = open_sink(None).unwrap();
        assert!(sink.record(&decision()).is_ok());
    }

    #[test]
    fn test_open_sink_reports_unreachable_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("audit.db");
        assert!(open_sink(Some(path.to_str().unwrap())).is_err());
    }
}
