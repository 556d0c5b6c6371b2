//! Machine details recorded after each run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use sysinfo::{Disks, System};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Space on the system volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSnapshot {
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub used_bytes: u64,
}

/// Storage, memory, CPU and OS of the machine as seen after the tasks ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub storage: Option<StorageSnapshot>,
    pub total_memory_bytes: u64,
    pub cpu: Option<String>,
    pub os_version: Option<String>,
}

impl SystemSnapshot {
    /// Reads the current values from the OS. Blocks while it does.
    #[must_use]
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();

        let cpu = sys
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .filter(|brand| !brand.is_empty());

        Self {
            storage: system_volume(&Disks::new_with_refreshed_list()),
            total_memory_bytes: sys.total_memory(),
            cpu,
            os_version: System::long_os_version(),
        }
    }
}

fn system_volume(disks: &Disks) -> Option<StorageSnapshot> {
    let disk = disks
        .list()
        .iter()
        .find(|d| is_system_root(d.mount_point()))
        .or_else(|| disks.list().first())?;

    let total = disk.total_space();
    let free = disk.available_space();
    Some(StorageSnapshot {
        total_bytes: total,
        free_bytes: free,
        used_bytes: total.saturating_sub(free),
    })
}

#[cfg(target_os = "windows")]
fn is_system_root(mount: &Path) -> bool {
    mount.to_string_lossy().to_ascii_uppercase().starts_with("C:")
}

#[cfg(not(target_os = "windows"))]
fn is_system_root(mount: &Path) -> bool {
    mount == Path::new("/")
}

fn gib(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

impl fmt::Display for SystemSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total RAM: {:.2} GB", gib(self.total_memory_bytes))?;
        match &self.storage {
            Some(s) => writeln!(
                f,
                "Storage - Volume Size: {:.2} GB, Free Space: {:.2} GB, Used Space: {:.2} GB",
                gib(s.total_bytes),
                gib(s.free_bytes),
                gib(s.used_bytes)
            )?,
            None => writeln!(f, "Storage: unknown")?,
        }
        writeln!(f, "CPU: {}", self.cpu.as_deref().unwrap_or("unknown"))?;
        writeln!(f, "OS Version: {}", self.os_version.as_deref().unwrap_or("unknown"))
    }
}
