//! Outcomes of a `check_license` request and their wire form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of evaluating one check request against the license database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The record was unbound and is now bound to the caller's fingerprint.
    Activated,
    /// The record is bound to the caller's fingerprint.
    Validated,
    /// The record is bound to a different fingerprint.
    HashMismatch,
    /// No record carries the supplied key.
    KeyNotFound,
    /// The key or the fingerprint was absent or unusable.
    MissingParameter,
    /// The storage layer failed; nothing was changed.
    InternalError,
}

impl Verdict {
    /// Returns true if the caller may use the license.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Activated | Self::Validated)
    }

    /// Returns true if the key can never be valid on the calling machine.
    #[must_use]
    pub fn is_definitive_rejection(&self) -> bool {
        matches!(self, Self::HashMismatch | Self::KeyNotFound)
    }

    /// HTTP status code the service answers with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Activated | Self::Validated => 200,
            Self::MissingParameter => 400,
            Self::HashMismatch => 403,
            Self::KeyNotFound => 404,
            Self::InternalError => 500,
        }
    }

    /// Human-readable message placed in the response body.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Activated => "activated",
            Self::Validated => "validated",
            Self::HashMismatch => "hash mismatch",
            Self::KeyNotFound => "license does not exist",
            Self::MissingParameter => "activation key or hash missing",
            Self::InternalError => "internal server error",
        }
    }

    /// Maps a response status back to a verdict on the client side.
    ///
    /// 200 is ambiguous between activation and validation; the body's
    /// `valid` flag is authoritative there, so this returns `Validated`.
    #[must_use]
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200 => Some(Self::Validated),
            400 => Some(Self::MissingParameter),
            403 => Some(Self::HashMismatch),
            404 => Some(Self::KeyNotFound),
            500..=599 => Some(Self::InternalError),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// JSON body of every `check_license` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub valid: bool,
    pub message: String,
}

impl From<Verdict> for CheckResponse {
    fn from(verdict: Verdict) -> Self {
        Self {
            valid: verdict.is_valid(),
            message: verdict.message().to_string(),
        }
    }
}
