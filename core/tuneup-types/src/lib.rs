//! Core type definitions for Tune-Up licensing.
//!
//! This crate defines the types shared by the validation service, the
//! license database and the activation client:
//! - Activation keys and machine fingerprints
//! - License records and their one-shot device binding
//! - The `check_license` verdicts and wire response
//!
//! Nothing in here performs I/O.

mod ids;
mod record;
mod verdict;

pub use ids::{ActivationKey, Fingerprint};
pub use record::{Binding, LicenseRecord, UNBOUND_SENTINEL};
pub use verdict::{CheckResponse, Verdict};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when constructing types from raw input.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("activation key is empty")]
    EmptyKey,

    #[error("fingerprint is empty")]
    EmptyFingerprint,

    #[error("fingerprint uses the reserved unbound marker")]
    ReservedFingerprint,
}
