//! Shared test helpers for agent tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tuneup_license::{CancellationSink, CheckOutcome, LicenseResult, LicenseStore, LicenseValidator};
use tuneup_maintenance::{FnTask, MaintenanceError, SystemSnapshot, Workflow};
use tuneup_types::{ActivationKey, Fingerprint, Verdict};

/// Validator that accepts exactly one key.
pub struct OneKeyValidator(pub &'static str);

#[async_trait]
impl LicenseValidator for OneKeyValidator {
    async fn check(&self, key: &ActivationKey, _fingerprint: &Fingerprint) -> CheckOutcome {
        if key.as_str() == self.0 {
            CheckOutcome::Valid(Verdict::Validated)
        } else {
            CheckOutcome::Invalid(Verdict::KeyNotFound)
        }
    }
}

/// Validator standing in for a server that never answers.
pub struct DownValidator;

#[async_trait]
impl LicenseValidator for DownValidator {
    async fn check(&self, _key: &ActivationKey, _fingerprint: &Fingerprint) -> CheckOutcome {
        CheckOutcome::Unreachable("request timed out".into())
    }
}

pub fn fingerprint() -> Fingerprint {
    Fingerprint::parse("f00dfeed").unwrap()
}

/// A store in a fresh temp dir, optionally pre-populated.
pub fn store(key: Option<&str>, email: Option<&str>) -> (TempDir, LicenseStore) {
    let dir = TempDir::new().unwrap();
    let store = LicenseStore::new(dir.path());
    if let Some(key) = key {
        store.save_key(&ActivationKey::parse(key).unwrap()).unwrap();
    }
    if let Some(email) = email {
        store.save_email(email).unwrap();
    }
    (dir, store)
}

/// A two-task workflow (one failing) that counts its runs.
pub fn counting_workflow() -> (Workflow, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let workflow = Workflow::new()
        .with_task(FnTask::new("disk_cleanup", move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok("freed 1.2 GB".to_string())
            }
        }))
        .with_task(FnTask::new("defender_scan", || async {
            Err(MaintenanceError::Failed("engine unavailable".into()))
        }))
        .with_snapshot_source(SystemSnapshot::default);
    (workflow, runs)
}

/// Cancellation sink that records what it was asked to send.
#[derive(Default)]
pub struct RecordingCancellation(Mutex<Vec<(String, String)>>);

impl RecordingCancellation {
    pub fn requests(&self) -> Vec<(String, String)> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl CancellationSink for RecordingCancellation {
    async fn request(&self, key: &ActivationKey, contact: &str) -> LicenseResult<()> {
        self.0.lock().unwrap().push((key.to_string(), contact.to_string()));
        Ok(())
    }
}
