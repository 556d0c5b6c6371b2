//! Tune-Up License Server
//!
//! Answers `GET /check_license?key=..&hash=..` for the maintenance agents
//! and binds each license to the first machine that presents it.
//!
//! Usage:
//!   tuneup-license-server serve --bind 0.0.0.0:5000
//!   tuneup-license-server create <subscriber-id>
//!   tuneup-license-server list

use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tuneup_db::LicenseDb;
use tuneup_license_server::{build_router, AppState};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "tuneup-license-server")]
#[command(about = "Tune-Up license validation service")]
struct Args {
    /// Path to the SQLite license database
    #[arg(long, env = "TUNEUP_LICENSE_DB", default_value = "licenses.db", global = true)]
    db: PathBuf,

    /// Address the HTTP service listens on
    #[arg(long, env = "TUNEUP_BIND", default_value = "0.0.0.0:5000", global = true)]
    bind: String,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP validation service (default)
    Serve,
    /// Create the licenses table
    Init,
    /// Provision an unbound license for a subscriber and print its key
    Create {
        /// Subscriber identifier
        id: String,
    },
    /// Remove a subscriber's license
    Remove {
        /// Subscriber identifier
        id: String,
    },
    /// List all licenses
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let db = LicenseDb::open(&args.db)
        .with_context(|| format!("Failed to open license database {}", args.db.display()))?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(db, &args.bind).await,
        Command::Init => {
            db.init_schema().context("Failed to create licenses table")?;
            println!("Licenses table ready in {}", args.db.display());
            Ok(())
        }
        Command::Create { id } => {
            let key = db
                .create_license(&id)
                .with_context(|| format!("Failed to create license for {id}"))?;
            println!("{key}");
            Ok(())
        }
        Command::Remove { id } => {
            if db.remove_license(&id).context("Failed to remove license")? {
                println!("Removed license for {id}");
            } else {
                println!("No license for {id}");
            }
            Ok(())
        }
        Command::List => {
            let licenses = db.list_licenses().context("Failed to list licenses")?;
            println!("{:<24} {:<36} {:<64} ACTIVATED", "ID", "KEY", "HASH");
            for record in licenses {
                let activated = record
                    .activated_on
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<24} {:<36} {:<64} {}",
                    record.id,
                    record.activation_key.to_string(),
                    record.binding.to_string(),
                    activated
                );
            }
            Ok(())
        }
    }
}

async fn serve(db: LicenseDb, bind: &str) -> Result<()> {
    info!("Tune-Up license server starting...");
    let count = db.count().context("Failed to read license count")?;
    let app = build_router(AppState { db });

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!(licenses = count, "listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
