//! Fan-out of the maintenance tasks with a join barrier.

use crate::report::{RunReport, TaskOutcome};
use crate::system::SystemSnapshot;
use crate::task::MaintenanceTask;
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Produces the post-run system snapshot; runs on the blocking pool.
pub type SnapshotSource = Arc<dyn Fn() -> SystemSnapshot + Send + Sync>;

/// The set of tasks making up one maintenance run.
#[derive(Clone)]
pub struct Workflow {
    tasks: Vec<Arc<dyn MaintenanceTask>>,
    snapshot: SnapshotSource,
}

impl Default for Workflow {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            snapshot: Arc::new(SystemSnapshot::collect),
        }
    }
}

impl Workflow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces how the post-run snapshot is taken.
    #[must_use]
    pub fn with_snapshot_source(
        mut self,
        source: impl Fn() -> SystemSnapshot + Send + Sync + 'static,
    ) -> Self {
        self.snapshot = Arc::new(source);
        self
    }

    #[must_use]
    pub fn with_task(mut self, task: impl MaintenanceTask + 'static) -> Self {
        self.add(task);
        self
    }

    pub fn add(&mut self, task: impl MaintenanceTask + 'static) {
        self.tasks.push(Arc::new(task));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.name())
    }

    /// Runs every task concurrently and waits for all of them, then takes
    /// the system snapshot.
    ///
    /// A task that errors or panics is recorded as failed; it never stops
    /// its siblings or the join.
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::started(Utc::now());
        let mut set = JoinSet::new();

        for task in &self.tasks {
            let task = Arc::clone(task);
            set.spawn(async move {
                let name = task.name().to_string();
                let outcome = match AssertUnwindSafe(task.run()).catch_unwind().await {
                    Ok(Ok(text)) => TaskOutcome::Succeeded(text),
                    Ok(Err(e)) => {
                        warn!(task = %name, error = %e, "task failed");
                        TaskOutcome::Failed(e.to_string())
                    }
                    Err(_) => {
                        warn!(task = %name, "task panicked");
                        TaskOutcome::Failed("task panicked".to_string())
                    }
                };
                (name, outcome)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((name, outcome)) => report.record(name, outcome),
                Err(e) => warn!(error = %e, "task join failed"),
            }
        }

        let snapshot = Arc::clone(&self.snapshot);
        report.system = tokio::task::spawn_blocking(move || (*snapshot)())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "system snapshot failed");
                SystemSnapshot::default()
            });

        report.finished_at = Utc::now();
        info!(
            tasks = report.outcomes.len(),
            failed = report.failed().count(),
            "maintenance run finished"
        );
        report
    }
}
