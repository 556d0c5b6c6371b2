//! Error types for the license database.

use thiserror::Error;

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur in license database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A record with this subscriber id already exists.
    #[error("license already exists for id: {0}")]
    DuplicateId(String),

    /// A stored row could not be decoded.
    #[error("invalid row: {0}")]
    InvalidRow(String),

    /// A previous holder of the connection lock panicked.
    #[error("connection lock poisoned")]
    LockPoisoned,
}
