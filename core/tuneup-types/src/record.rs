//! Server-side license records.

use crate::{ActivationKey, Fingerprint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored in the `hash` column of a record that has never been activated.
pub const UNBOUND_SENTINEL: &str = "default_hash_value";

/// Device binding of a license record.
///
/// Moves from `Unbound` to `Bound` once and never back; only removing the
/// whole record resets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "fingerprint", rename_all = "lowercase")]
pub enum Binding {
    Unbound,
    Bound(Fingerprint),
}

impl Binding {
    /// Decodes the value persisted in the database column.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        match Fingerprint::parse(value) {
            Ok(fp) => Self::Bound(fp),
            Err(_) => Self::Unbound,
        }
    }

    /// Returns the value to persist in the database column.
    #[must_use]
    pub fn as_stored(&self) -> &str {
        match self {
            Self::Unbound => UNBOUND_SENTINEL,
            Self::Bound(fp) => fp.as_str(),
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    /// Returns the bound fingerprint, if any.
    #[must_use]
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Self::Unbound => None,
            Self::Bound(fp) => Some(fp),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => write!(f, "unbound"),
            Self::Bound(fp) => write!(f, "{fp}"),
        }
    }
}

/// One license seat as held by the license database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Subscriber identifier chosen by the administrator.
    pub id: String,
    /// Secret token handed to the subscriber.
    pub activation_key: ActivationKey,
    /// Device the seat is bound to.
    pub binding: Binding,
    /// When the seat was first bound.
    pub activated_on: Option<DateTime<Utc>>,
}

impl LicenseRecord {
    /// Creates a freshly provisioned, unbound record.
    #[must_use]
    pub fn provisioned(id: impl Into<String>, activation_key: ActivationKey) -> Self {
        Self {
            id: id.into(),
            activation_key,
            binding: Binding::Unbound,
            activated_on: None,
        }
    }
}
