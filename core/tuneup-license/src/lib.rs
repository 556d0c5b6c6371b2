//! Licensing and activation for Tune-Up.
//!
//! This module handles:
//! - Machine fingerprinting for device binding
//! - Local storage of the activation key and contact address
//! - Checking keys against the license service
//! - The prompt/validate/retry activation flow shared by all front ends
//! - Sending license cancellation requests
//!
//! # Design Principles
//!
//! - **Trust on first use**: the first machine to validate a key owns it
//! - **Fail closed**: nothing is unlocked unless the service said yes
//! - **Provisional outages**: an unreachable service never deletes a key;
//!   only a definitive "not found" or "hash mismatch" does

mod activation;
mod cancel;
mod client;
mod device;
mod email;
mod error;
mod store;

pub use activation::{
    Activated, ActivationOutcome, ActivationState, Activator, NonInteractive, Notice, Prompter,
};
pub use cancel::{CancellationSink, LogCancellation};
pub use client::{CheckOutcome, ClientConfig, LicenseValidator};
pub use device::{DeviceFingerprint, IdentitySource, StaticIdentity, SystemIdentity};
pub use email::is_valid_email;
pub use error::{LicenseError, LicenseResult};
pub use store::{LicenseStore, APP_DIR_NAME};

#[cfg(feature = "online")]
pub use client::HttpValidator;
