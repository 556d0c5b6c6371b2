//! Shared helpers for maintenance tests.

#![allow(dead_code)]

use async_trait::async_trait;
use tempfile::TempDir;
use tuneup_license::{Activated, Activator, CheckOutcome, LicenseStore, LicenseValidator, NonInteractive};
use tuneup_types::{ActivationKey, Fingerprint, Verdict};

struct AlwaysValid;

#[async_trait]
impl LicenseValidator for AlwaysValid {
    async fn check(&self, _key: &ActivationKey, _fingerprint: &Fingerprint) -> CheckOutcome {
        CheckOutcome::Valid(Verdict::Validated)
    }
}

/// Runs a real activation pass against an accepting validator.
pub async fn activated() -> Activated {
    let dir = TempDir::new().unwrap();
    let store = LicenseStore::new(dir.path());
    store.save_key(&ActivationKey::parse("ABC").unwrap()).unwrap();

    let mut activator = Activator::new(
        store,
        AlwaysValid,
        NonInteractive,
        Fingerprint::parse("machine").unwrap(),
    );
    activator
        .activate()
        .await
        .unwrap()
        .activated()
        .cloned()
        .unwrap()
}
