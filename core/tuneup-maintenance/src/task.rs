//! Maintenance task seam and the stock task adapters.
//!
//! What a task actually does (disk cleanup, scans, defragmentation…) is
//! opaque to the workflow; it only sees a name and a success or error text.

use crate::error::{MaintenanceError, MaintenanceResult};
use async_trait::async_trait;
use std::future::Future;
use tokio::process::Command;
use tracing::{debug, info};

/// One independently failing unit of the maintenance run.
#[async_trait]
pub trait MaintenanceTask: Send + Sync {
    /// Key under which the outcome is recorded.
    fn name(&self) -> &str;

    /// Runs the task, returning text for the report.
    async fn run(&self) -> MaintenanceResult<String>;
}

/// Runs an external program; stdout is the success text.
#[derive(Debug, Clone)]
pub struct CommandTask {
    name: String,
    program: String,
    args: Vec<String>,
}

impl CommandTask {
    pub fn new<I, S>(name: impl Into<String>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl MaintenanceTask for CommandTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> MaintenanceResult<String> {
        info!(task = %self.name, program = %self.program, "starting");
        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| MaintenanceError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(MaintenanceError::Command {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(task = %self.name, bytes = stdout.len(), "finished");
        Ok(if stdout.is_empty() {
            "completed".to_string()
        } else {
            stdout
        })
    }
}

/// A task backed by an async closure.
pub struct FnTask<F> {
    name: String,
    f: F,
}

impl<F> FnTask<F> {
    pub fn new<Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = MaintenanceResult<String>> + Send,
    {
        Self { name: name.into(), f }
    }
}

#[async_trait]
impl<F, Fut> MaintenanceTask for FnTask<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = MaintenanceResult<String>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> MaintenanceResult<String> {
        (self.f)().await
    }
}

/// The stock task set for this platform.
///
/// On Windows these are the OS maintenance tools; elsewhere only the
/// process listing is available.
#[must_use]
pub fn standard_tasks() -> Vec<CommandTask> {
    #[cfg(target_os = "windows")]
    {
        vec![
            CommandTask::new("disk_cleanup", "cleanmgr", ["/sagerun:1"]),
            CommandTask::new("sfc_scan", "sfc", ["/scannow"]),
            CommandTask::new(
                "defender_scan",
                r"C:\Program Files\Windows Defender\MpCmdRun.exe",
                ["-Scan", "-ScanType", "1"],
            ),
            CommandTask::new(
                "create_shortcut",
                "powershell.exe",
                [
                    "-NoProfile",
                    "-Command",
                    "$p = [Environment]::GetFolderPath('Desktop') + '\\NTi Support.url'; \
                     if (-not (Test-Path $p)) { \
                     Set-Content -Path $p -Value \"[InternetShortcut]`nURL=https://nticomputers.screenconnect.com\" }",
                ],
            ),
            CommandTask::new("update_download", "wuauclt", ["/detectnow"]),
            CommandTask::new("defragmentation", "defrag", ["C:", "/O", "/L"]),
            CommandTask::new("process_list", "tasklist", Vec::<String>::new()),
        ]
    }

    #[cfg(not(target_os = "windows"))]
    {
        vec![CommandTask::new("process_list", "ps", ["-eo", "comm,rss"])]
    }
}
