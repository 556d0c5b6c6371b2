//! License cancellation requests.
//!
//! Unsubscribing does not touch the local key: it asks whoever administers
//! the licenses to cancel the seat, and the key stops validating once the
//! record is removed on the server.

use crate::error::LicenseResult;
use async_trait::async_trait;
use tracing::info;
use tuneup_types::ActivationKey;

/// Where cancellation requests are sent (mail, ticketing, log…).
#[async_trait]
pub trait CancellationSink: Send + Sync {
    /// Asks for the license `key`, held by `contact`, to be cancelled.
    async fn request(&self, key: &ActivationKey, contact: &str) -> LicenseResult<()>;
}

/// Writes the request to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCancellation;

#[async_trait]
impl CancellationSink for LogCancellation {
    async fn request(&self, key: &ActivationKey, contact: &str) -> LicenseResult<()> {
        info!(key = %key, contact, "license cancellation requested");
        Ok(())
    }
}
