//! Per-run results and where they go afterwards.

use crate::error::{MaintenanceError, MaintenanceResult};
use crate::system::SystemSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

/// How one task ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "lowercase")]
pub enum TaskOutcome {
    Succeeded(String),
    Failed(String),
}

impl TaskOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Succeeded(t) | Self::Failed(t) => t,
        }
    }
}

/// Everything one maintenance run produced, keyed by task name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: BTreeMap<String, TaskOutcome>,
    /// Taken after every task has finished.
    pub system: SystemSnapshot,
}

impl RunReport {
    pub(crate) fn started(at: DateTime<Utc>) -> Self {
        Self {
            started_at: at,
            finished_at: at,
            outcomes: BTreeMap::new(),
            system: SystemSnapshot::default(),
        }
    }

    pub(crate) fn record(&mut self, name: String, outcome: TaskOutcome) {
        self.outcomes.insert(name, outcome);
    }

    #[must_use]
    pub fn get(&self, task: &str) -> Option<&TaskOutcome> {
        self.outcomes.get(task)
    }

    /// Names of the tasks that failed.
    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_success())
            .map(|(n, _)| n.as_str())
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.values().all(TaskOutcome::is_success)
    }

    /// Plain-text listing, one block per task.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Maintenance run {} - {}",
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            self.finished_at.format("%H:%M:%S")
        );
        for (name, outcome) in &self.outcomes {
            let status = if outcome.is_success() { "ok" } else { "FAILED" };
            let _ = writeln!(out, "\n[{name}] {status}\n{}", outcome.text());
        }
        let _ = write!(out, "\nPost-maintenance report\n{}", self.system);
        out
    }
}

/// Destination for a finished report (mail, file, log…).
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Delivers `report`, addressed to `contact` if the sink needs one.
    async fn deliver(&self, report: &RunReport, contact: Option<&str>) -> MaintenanceResult<()>;
}

/// Writes the summary to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl ReportSink for LogSink {
    async fn deliver(&self, report: &RunReport, contact: Option<&str>) -> MaintenanceResult<()> {
        info!(
            contact = contact.unwrap_or("-"),
            tasks = report.outcomes.len(),
            failed = report.failed().count(),
            "maintenance report\n{}",
            report.summary()
        );
        Ok(())
    }
}

/// Overwrites a file with the summary.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReportSink for FileSink {
    async fn deliver(&self, report: &RunReport, _contact: Option<&str>) -> MaintenanceResult<()> {
        tokio::fs::write(&self.path, report.summary())
            .await
            .map_err(|e| MaintenanceError::Delivery(format!("{}: {e}", self.path.display())))?;
        info!(path = %self.path.display(), "report written");
        Ok(())
    }
}
