//! Maintenance error types.

use thiserror::Error;

/// Result type for maintenance operations.
pub type MaintenanceResult<T> = Result<T, MaintenanceError>;

/// Errors a maintenance task or report sink can report.
#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error("{program} exited with {status}: {stderr}")]
    Command {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("task failed: {0}")]
    Failed(String),

    #[error("report delivery failed: {0}")]
    Delivery(String),
}
