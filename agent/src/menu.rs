//! Commands accepted by the interactive session.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One entry of the agent's menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    /// Start a maintenance run in the background.
    Run,
    /// Show license and run status.
    Status,
    /// Ask for the license to be cancelled.
    Unsubscribe,
    /// Remove the stored activation key and leave.
    Forget,
    /// Leave the session.
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl MenuCommand {
    pub const ALL: [Self; 5] = [Self::Run, Self::Status, Self::Unsubscribe, Self::Forget, Self::Quit];

    #[must_use]
    pub fn help(&self) -> &'static str {
        match self {
            Self::Run => "run maintenance now",
            Self::Status => "show license and maintenance status",
            Self::Unsubscribe => "request cancellation of your license",
            Self::Forget => "remove the activation key from this machine and exit",
            Self::Quit => "exit",
        }
    }
}

impl fmt::Display for MenuCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Run => "run",
            Self::Status => "status",
            Self::Unsubscribe => "unsubscribe",
            Self::Forget => "forget",
            Self::Quit => "quit",
        };
        f.pad(name)
    }
}

impl FromStr for MenuCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "run" | "r" | "run maintenance" => Ok(Self::Run),
            "status" | "s" => Ok(Self::Status),
            "unsubscribe" | "cancel" => Ok(Self::Unsubscribe),
            "forget" => Ok(Self::Forget),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            _ => Err(UnknownCommand(s.trim().to_string())),
        }
    }
}
