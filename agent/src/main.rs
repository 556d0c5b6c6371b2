//! Tune-Up Maintenance Agent
//!
//! Activates this machine against the license server and runs the
//! maintenance tasks once the license is valid.
//!
//! Usage:
//!   tuneup-agent                 interactive session
//!   tuneup-agent run             unattended run (scheduler, logon)
//!   tuneup-agent unsubscribe     request cancellation of the license
//!   tuneup-agent forget          remove the stored activation key

use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use tuneup_agent::{
    run_interactive, run_scheduled, send_cancellation, MaintenanceRun, TerminalPrompter,
    UNSUBSCRIBE_QUESTION,
};
use tuneup_license::{
    Activator, ClientConfig, DeviceFingerprint, HttpValidator, LicenseStore, LogCancellation,
    NonInteractive,
};
use tuneup_maintenance::{standard_tasks, FileSink, LogSink, Workflow};

#[derive(Parser, Debug)]
#[command(name = "tuneup-agent")]
#[command(about = "Tune-Up maintenance agent")]
struct Args {
    /// Base URL of the license server
    #[arg(long, env = "TUNEUP_LICENSE_SERVER", default_value = "http://127.0.0.1:5000", global = true)]
    server: String,

    /// Seconds to wait for the license server
    #[arg(long, default_value = "20", global = true)]
    timeout_secs: u64,

    /// Directory holding the activation key and contact address
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Write the maintenance report to this file instead of the log
    #[arg(long, global = true)]
    report_file: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the stored key and run maintenance without prompting
    Run,
    /// Request cancellation of this machine's license
    Unsubscribe {
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Remove the stored activation key from this machine
    Forget,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let store = match &args.config_dir {
        Some(dir) => LicenseStore::new(dir),
        None => LicenseStore::default_location().context("Failed to locate config directory")?,
    };

    match args.command {
        Some(Command::Forget) => {
            store.delete_key().context("Failed to remove activation key")?;
            println!("Activation key removed from this machine.");
        }
        Some(Command::Unsubscribe { yes }) => {
            let mut terminal = TerminalPrompter::stdio();
            if !yes && !terminal.confirm(UNSUBSCRIBE_QUESTION).await {
                println!("Unsubscribe cancelled.");
                return Ok(());
            }
            if send_cancellation(&store, &LogCancellation).await? {
                println!("Your license cancellation request has been sent.");
            } else {
                anyhow::bail!("License key or email address not found; cancellation request not sent");
            }
        }
        Some(Command::Run) => {
            let validator = http_validator(&args)?;
            let mut run = maintenance_run(&args);
            let mut activator =
                Activator::new(store, validator, NonInteractive, DeviceFingerprint::generate());
            match run_scheduled(&mut activator, &mut run).await? {
                Some(report) if !report.all_succeeded() => {
                    warn!(failed = report.failed().count(), "maintenance finished with failures");
                }
                Some(_) => info!("maintenance finished"),
                None => info!("maintenance already running"),
            }
        }
        None => {
            let validator = http_validator(&args)?;
            let mut run = maintenance_run(&args);
            let mut activator = Activator::new(
                store,
                validator,
                TerminalPrompter::stdio(),
                DeviceFingerprint::generate(),
            );
            run_interactive(&mut activator, &mut run, &LogCancellation).await?;
        }
    }
    Ok(())
}

fn http_validator(args: &Args) -> Result<HttpValidator> {
    let config = ClientConfig {
        server_url: args.server.clone(),
        timeout_secs: args.timeout_secs,
    };
    info!(server = %config.server_url, "Tune-Up agent starting...");
    HttpValidator::new(&config).context("Failed to build HTTP client")
}

fn maintenance_run(args: &Args) -> MaintenanceRun {
    let mut workflow = Workflow::new();
    for task in standard_tasks() {
        workflow.add(task);
    }
    match &args.report_file {
        Some(path) => MaintenanceRun::new(workflow, FileSink::new(path)),
        None => MaintenanceRun::new(workflow, LogSink),
    }
}
