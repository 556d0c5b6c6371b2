//! Tune-Up maintenance agent.
//!
//! Wires the activation flow to a front end and unlocks the maintenance
//! run once the license service accepts this machine.

mod error;
mod menu;
mod prompt;
mod session;

pub use error::{AgentError, AgentResult};
pub use menu::{MenuCommand, UnknownCommand};
pub use prompt::{notice_text, LinePrompter, TerminalPrompter};
pub use session::{
    run_interactive, run_scheduled, send_cancellation, MaintenanceRun, UNSUBSCRIBE_QUESTION,
};
