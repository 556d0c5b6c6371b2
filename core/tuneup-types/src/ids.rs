//! Identifier types carried over the wire.
//!
//! Activation keys are opaque tokens; new ones are UUID v4 strings, but any
//! non-empty string issued by an administrator is accepted.

use crate::record::UNBOUND_SENTINEL;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque secret token identifying one license seat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationKey(String);

impl ActivationKey {
    /// Mints a fresh random activation key.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parses an activation key, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyKey);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Takes a key exactly as received in a request.
    ///
    /// Only the empty string is refused; whitespace is part of the key.
    pub fn from_wire(s: &str) -> Result<Self, Error> {
        if s.is_empty() {
            return Err(Error::EmptyKey);
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A prefix of the key safe to put in logs: at most half of it, and
    /// never more than eight characters.
    #[must_use]
    pub fn redacted(&self) -> String {
        let shown = (self.0.chars().count() / 2).min(8);
        let prefix: String = self.0.chars().take(shown).collect();
        format!("{prefix}...")
    }
}

impl fmt::Display for ActivationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActivationKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Identity label of one machine, as sent in the `hash` query parameter.
///
/// The service treats it as an opaque string. The only value it refuses is
/// the unbound marker, which would otherwise leave a record claimable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parses a fingerprint, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyFingerprint);
        }
        if trimmed == UNBOUND_SENTINEL {
            return Err(Error::ReservedFingerprint);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Takes a fingerprint exactly as received in a request.
    pub fn from_wire(s: &str) -> Result<Self, Error> {
        if s.is_empty() {
            return Err(Error::EmptyFingerprint);
        }
        if s == UNBOUND_SENTINEL {
            return Err(Error::ReservedFingerprint);
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the fingerprint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
