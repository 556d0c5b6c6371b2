//! Single-flight gate around the maintenance run.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;
use tuneup_license::Activated;

/// Runs the protected work at most once at a time.
///
/// Clones share the same flag, so the interactive loop and a scheduled
/// trigger in the same process contend for one slot.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceGate {
    running: Arc<AtomicBool>,
}

/// Clears the running flag when dropped, whether the work finished,
/// returned an error, panicked or was aborted.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl MaintenanceGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a run is in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Spawns `work` unless a run is already in flight.
    ///
    /// Returns immediately either way. A dropped request is not queued and
    /// the caller gets no further notification; the return value only says
    /// whether this call started a run.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn run_if_idle<F>(&self, activated: &Activated, work: F) -> bool
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.run_if_idle_with_handle(activated, work).is_some()
    }

    /// Like [`run_if_idle`](Self::run_if_idle), but hands back the spawned
    /// task so a caller that has nothing else to do can wait for it.
    pub fn run_if_idle_with_handle<F>(&self, activated: &Activated, work: F) -> Option<JoinHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("maintenance already running, trigger dropped");
            return None;
        }

        debug!(verdict = %activated.verdict(), "maintenance gate entered");
        let guard = RunningGuard(Arc::clone(&self.running));
        Some(tokio::spawn(async move {
            let _guard = guard;
            work.await
        }))
    }
}
