//! Line-oriented front end for the activation flow.

use async_trait::async_trait;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tracing::warn;
use tuneup_license::{Notice, Prompter};
use tuneup_types::Verdict;

/// Asks questions on a writer and reads answers line by line.
///
/// End of input counts as the user cancelling.
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

/// [`LinePrompter`] over the process's stdin and stdout.
pub type TerminalPrompter = LinePrompter<BufReader<Stdin>, Stdout>;

impl TerminalPrompter {
    #[must_use]
    pub fn stdio() -> Self {
        LinePrompter::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> LinePrompter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Writes one line of output.
    pub async fn say(&mut self, text: &str) {
        if let Err(e) = self.write_all(format!("{text}\n").as_bytes()).await {
            warn!(error = %e, "cannot write to terminal");
        }
    }

    /// Asks a yes/no question; anything but `y` or `yes` is a no.
    pub async fn confirm(&mut self, question: &str) -> bool {
        self.ask(&format!("{question} [y/N] "))
            .await
            .is_some_and(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    /// Shows the command prompt and reads the next command line.
    pub async fn read_command(&mut self) -> Option<String> {
        self.ask("> ").await
    }

    async fn ask(&mut self, question: &str) -> Option<String> {
        if let Err(e) = self.write_all(question.as_bytes()).await {
            warn!(error = %e, "cannot write to terminal");
            return None;
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line).await {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                warn!(error = %e, "cannot read from terminal");
                None
            }
        }
    }

    async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await
    }
}

#[async_trait]
impl<R, W> Prompter for LinePrompter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn ask_key(&mut self) -> Option<String> {
        self.ask("Enter your activation key: ").await
    }

    async fn ask_email(&mut self) -> Option<String> {
        self.ask("Enter your email address for maintenance reports: ").await
    }

    async fn notify(&mut self, notice: Notice) {
        self.say(&notice_text(&notice)).await;
    }
}

/// What the user reads for each activation notice.
#[must_use]
pub fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::KeyAccepted(Verdict::Activated) => "License activated for this machine.".to_string(),
        Notice::KeyAccepted(_) => "License verified.".to_string(),
        Notice::KeyRejected(Verdict::HashMismatch) => {
            "This key is already activated on another machine. Please enter a different key.".to_string()
        }
        Notice::KeyRejected(verdict) => format!("Invalid activation key ({verdict}). Please try again."),
        Notice::BlankKey => "Activation key cannot be empty.".to_string(),
        Notice::CannotVerify(reason) => format!(
            "Could not reach the license server ({reason}). Your key was kept; please try again later."
        ),
        Notice::InvalidEmail => "Invalid email format. Please try again.".to_string(),
        Notice::EmailSaved => "Email address saved.".to_string(),
    }
}
