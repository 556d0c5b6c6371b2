//! The protected maintenance run.
//!
//! - [`MaintenanceGate`] lets one run through at a time, and only for a
//!   caller holding an [`Activated`](tuneup_license::Activated) proof
//! - [`Workflow`] fans the tasks out concurrently and joins them into a
//!   [`RunReport`], closed by a [`SystemSnapshot`] of the machine
//! - [`ReportSink`] is where the report goes afterwards

mod error;
mod gate;
mod report;
mod system;
mod task;
mod workflow;

pub use error::{MaintenanceError, MaintenanceResult};
pub use gate::MaintenanceGate;
pub use report::{FileSink, LogSink, ReportSink, RunReport, TaskOutcome};
pub use system::{StorageSnapshot, SystemSnapshot};
pub use task::{standard_tasks, CommandTask, FnTask, MaintenanceTask};
pub use workflow::{SnapshotSource, Workflow};
