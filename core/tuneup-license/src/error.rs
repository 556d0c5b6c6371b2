//! Error types for the activation client.

use std::path::PathBuf;
use thiserror::Error;

/// Client-side licensing errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// A locally stored value (key or contact address) does not exist.
    #[error("local file missing: {}", .0.display())]
    LocalFileMissing(PathBuf),

    /// A contact address does not have the `local@domain.tld` shape.
    #[error("invalid email format: {0}")]
    InvalidEmailFormat(String),

    /// No per-user configuration directory could be determined.
    #[error("no configuration directory available")]
    NoConfigDir,

    /// Malformed key or fingerprint.
    #[error("invalid value: {0}")]
    InvalidValue(#[from] tuneup_types::Error),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl LicenseError {
    /// Returns true if this error means "nothing stored yet".
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::LocalFileMissing(_))
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
