//! Error types for the agent.

use thiserror::Error;
use tuneup_license::LicenseError;

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors that end an agent session.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Local license state could not be read or written.
    #[error(transparent)]
    License(#[from] LicenseError),

    /// No key is stored and nobody is there to enter one.
    #[error("no activation key stored; run the agent interactively first")]
    NotActivated,

    /// The license service could not be reached; the stored key was kept.
    #[error("license could not be verified: {0}")]
    Unverified(String),

    /// The maintenance run task ended abnormally.
    #[error("maintenance run aborted: {0}")]
    RunAborted(#[from] tokio::task::JoinError),
}
