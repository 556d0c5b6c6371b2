//! Agent sessions: the scheduled run and the interactive menu loop.

use crate::error::{AgentError, AgentResult};
use crate::menu::MenuCommand;
use crate::prompt::LinePrompter;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tuneup_license::{
    Activated, ActivationOutcome, Activator, CancellationSink, LicenseStore, LicenseValidator, Prompter,
};
use tuneup_maintenance::{MaintenanceGate, ReportSink, RunReport, Workflow};

/// The gated maintenance run plus where its report goes.
#[derive(Clone)]
pub struct MaintenanceRun {
    gate: MaintenanceGate,
    workflow: Arc<Workflow>,
    sink: Arc<dyn ReportSink>,
    contact: Option<String>,
}

impl MaintenanceRun {
    pub fn new(workflow: Workflow, sink: impl ReportSink + 'static) -> Self {
        Self {
            gate: MaintenanceGate::new(),
            workflow: Arc::new(workflow),
            sink: Arc::new(sink),
            contact: None,
        }
    }

    /// Address the report is delivered to.
    pub fn set_contact(&mut self, contact: Option<String>) {
        self.contact = contact;
    }

    #[must_use]
    pub fn gate(&self) -> &MaintenanceGate {
        &self.gate
    }

    /// Starts a run in the background unless one is already in flight.
    ///
    /// The report is delivered to the sink before the handle resolves; a
    /// delivery failure is logged and does not fail the run.
    pub fn trigger(&self, activated: &Activated) -> Option<JoinHandle<RunReport>> {
        let workflow = Arc::clone(&self.workflow);
        let sink = Arc::clone(&self.sink);
        let contact = self.contact.clone();
        self.gate.run_if_idle_with_handle(activated, async move {
            let report = workflow.run().await;
            if let Err(e) = sink.deliver(&report, contact.as_deref()).await {
                warn!(error = %e, "report delivery failed");
            }
            report
        })
    }
}

/// Unattended entry point, as invoked by a scheduler.
///
/// Validates the stored key without prompting and, if it is valid, runs
/// maintenance to completion. Returns `None` if a run was already in flight
/// in this process.
pub async fn run_scheduled<V, P>(
    activator: &mut Activator<V, P>,
    run: &mut MaintenanceRun,
) -> AgentResult<Option<RunReport>>
where
    V: LicenseValidator,
    P: Prompter,
{
    let activated = match activator.activate().await? {
        ActivationOutcome::Valid(activated) => activated,
        ActivationOutcome::Unreachable(reason) => return Err(AgentError::Unverified(reason)),
        ActivationOutcome::Cancelled => return Err(AgentError::NotActivated),
    };

    run.set_contact(activator.store().load_email().ok());
    match run.trigger(&activated) {
        Some(handle) => Ok(Some(handle.await?)),
        None => Ok(None),
    }
}

/// Question asked before a cancellation request goes out.
pub const UNSUBSCRIBE_QUESTION: &str = "Are you sure you want to unsubscribe and cancel your license?";

/// Sends a cancellation request for the stored key and contact address.
///
/// The local key is kept. Returns false, without sending anything, if
/// either value is missing.
pub async fn send_cancellation(store: &LicenseStore, sink: &dyn CancellationSink) -> AgentResult<bool> {
    let (key, contact) = match (store.load_key(), store.load_email()) {
        (Ok(key), Ok(contact)) => (key, contact),
        (key, contact) => {
            warn!(
                key_missing = key.is_err(),
                contact_missing = contact.is_err(),
                "license key or email address not found, cancellation not sent"
            );
            return Ok(false);
        }
    };
    sink.request(&key, &contact).await?;
    info!("license cancellation requested");
    Ok(true)
}

/// Interactive session: activate, collect a contact address, then serve
/// menu commands until the user quits or input ends.
///
/// A run in flight when the session ends is awaited before returning.
pub async fn run_interactive<V, R, W>(
    activator: &mut Activator<V, LinePrompter<R, W>>,
    run: &mut MaintenanceRun,
    cancellation: &dyn CancellationSink,
) -> AgentResult<()>
where
    V: LicenseValidator,
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let activated = match activator.activate().await? {
        ActivationOutcome::Valid(activated) => activated,
        ActivationOutcome::Unreachable(_) | ActivationOutcome::Cancelled => return Ok(()),
    };

    let Some(contact) = activator.ensure_contact().await? else {
        return Ok(());
    };
    run.set_contact(Some(contact));

    let prompter = activator.prompter_mut();
    prompter.say("Commands:").await;
    for command in MenuCommand::ALL {
        prompter.say(&format!("  {command:<8} {}", command.help())).await;
    }

    let mut in_flight: Option<JoinHandle<RunReport>> = None;
    while let Some(line) = activator.prompter_mut().read_command().await {
        if line.is_empty() {
            continue;
        }
        let command = match line.parse::<MenuCommand>() {
            Ok(command) => command,
            Err(e) => {
                activator.prompter_mut().say(&e.to_string()).await;
                continue;
            }
        };

        match command {
            MenuCommand::Run => {
                if let Some(handle) = run.trigger(&activated) {
                    info!("maintenance triggered");
                    activator.prompter_mut().say("Maintenance started.").await;
                    in_flight = Some(handle);
                }
            }
            MenuCommand::Status => {
                let running = if run.gate().is_running() { "running" } else { "idle" };
                let text = format!("License: {} ({}). Maintenance: {running}.", activated.key(), activated.verdict());
                activator.prompter_mut().say(&text).await;
            }
            MenuCommand::Unsubscribe => {
                if !activator.prompter_mut().confirm(UNSUBSCRIBE_QUESTION).await {
                    activator.prompter_mut().say("Unsubscribe cancelled.").await;
                    continue;
                }
                let text = if send_cancellation(activator.store(), cancellation).await? {
                    "Your license cancellation request has been sent."
                } else {
                    "License key or email address not found; cancellation request not sent."
                };
                activator.prompter_mut().say(text).await;
            }
            MenuCommand::Forget => {
                activator.forget()?;
                activator
                    .prompter_mut()
                    .say("Activation key removed from this machine.")
                    .await;
                break;
            }
            MenuCommand::Quit => break,
        }
    }

    if let Some(handle) = in_flight {
        if run.gate().is_running() {
            activator
                .prompter_mut()
                .say("Waiting for maintenance to finish...")
                .await;
        }
        let report = handle.await?;
        let text = if report.all_succeeded() {
            "Maintenance finished.".to_string()
        } else {
            format!("Maintenance finished; failed: {}.", report.failed().collect::<Vec<_>>().join(", "))
        };
        activator.prompter_mut().say(&text).await;
    }
    Ok(())
}
