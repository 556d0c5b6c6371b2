//! Client-side activation state machine.
//!
//! ```text
//! NoKey ─► Prompting ─► Validating ─► Valid
//!             ▲             │
//!             └── Invalid ◄─┤
//!                           └─► Unreachable
//! ```
//!
//! A stored key is validated first. A definitive rejection deletes it and
//! asks the user for another one, forever, until a key validates or the user
//! cancels. An unreachable service ends the pass without touching the stored
//! key. Presentation (terminal, tray, dialogs) is supplied through
//! [`Prompter`], so every front end drives the same machine.

use crate::client::{CheckOutcome, LicenseValidator};
use crate::email::is_valid_email;
use crate::error::{LicenseError, LicenseResult};
use crate::store::LicenseStore;
use async_trait::async_trait;
use tracing::{debug, info, warn};
use tuneup_types::{ActivationKey, Fingerprint, Verdict};

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The key was accepted.
    KeyAccepted(Verdict),
    /// The key was refused; a new one is needed.
    KeyRejected(Verdict),
    /// The entered key was blank.
    BlankKey,
    /// The service could not verify the key right now.
    CannotVerify(String),
    /// The entered contact address is malformed.
    InvalidEmail,
    /// The contact address was stored.
    EmailSaved,
}

/// User interaction capability of a front end.
///
/// Returning `None` from a question means the user cancelled.
#[async_trait]
pub trait Prompter: Send {
    async fn ask_key(&mut self) -> Option<String>;
    async fn ask_email(&mut self) -> Option<String>;
    async fn notify(&mut self, notice: Notice);
}

/// A front end that cannot ask anything, e.g. a scheduled run.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

#[async_trait]
impl Prompter for NonInteractive {
    async fn ask_key(&mut self) -> Option<String> {
        None
    }

    async fn ask_email(&mut self) -> Option<String> {
        None
    }

    async fn notify(&mut self, notice: Notice) {
        info!(?notice, "activation notice");
    }
}

/// Where the machine currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationState {
    NoKey,
    Prompting,
    Validating { key: ActivationKey, stored: bool },
    Invalid(Verdict),
    Valid(Activated),
    Unreachable(String),
    Cancelled,
}

/// Proof that a key validated for this machine during this process.
///
/// Only [`Activator::activate`] hands these out; the maintenance gate asks
/// for one before it runs anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activated {
    key: ActivationKey,
    verdict: Verdict,
}

impl Activated {
    #[must_use]
    pub fn key(&self) -> &ActivationKey {
        &self.key
    }

    /// `Activated` on first use, `Validated` afterwards.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }
}

/// Result of one activation pass.
#[derive(Debug, Clone)]
pub enum ActivationOutcome {
    Valid(Activated),
    /// Provisional: the stored key (if any) was kept.
    Unreachable(String),
    Cancelled,
}

impl ActivationOutcome {
    #[must_use]
    pub fn activated(&self) -> Option<&Activated> {
        match self {
            Self::Valid(a) => Some(a),
            _ => None,
        }
    }
}

/// Drives prompting, validation and persistence.
pub struct Activator<V, P> {
    store: LicenseStore,
    validator: V,
    prompter: P,
    fingerprint: Fingerprint,
    state: ActivationState,
}

impl<V: LicenseValidator, P: Prompter> Activator<V, P> {
    pub fn new(store: LicenseStore, validator: V, prompter: P, fingerprint: Fingerprint) -> Self {
        Self {
            store,
            validator,
            prompter,
            fingerprint,
            state: ActivationState::NoKey,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ActivationState {
        &self.state
    }

    #[must_use]
    pub fn store(&self) -> &LicenseStore {
        &self.store
    }

    #[must_use]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Mutable access to the front end, e.g. to show unrelated messages.
    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    /// Returns the stored key, or `LocalFileMissing`.
    pub fn load_local_key(&self) -> LicenseResult<ActivationKey> {
        self.store.load_key()
    }

    /// Checks `key` against the service for this machine.
    pub async fn validate(&self, key: &ActivationKey) -> CheckOutcome {
        self.validator.check(key, &self.fingerprint).await
    }

    /// Runs the state machine until the key is valid, the service is
    /// unreachable, or the user cancels.
    pub async fn activate(&mut self) -> LicenseResult<ActivationOutcome> {
        let initial = match self.store.load_key() {
            Ok(key) => ActivationState::Validating { key, stored: true },
            Err(e) if e.is_missing() => ActivationState::NoKey,
            Err(LicenseError::InvalidValue(_)) => {
                self.store.delete_key()?;
                ActivationState::NoKey
            }
            Err(e) => return Err(e),
        };
        self.transition(initial);

        loop {
            let next = match self.state.clone() {
                ActivationState::NoKey | ActivationState::Invalid(_) => ActivationState::Prompting,
                ActivationState::Prompting => match self.prompter.ask_key().await {
                    None => ActivationState::Cancelled,
                    Some(raw) => match ActivationKey::parse(&raw) {
                        Ok(key) => ActivationState::Validating { key, stored: false },
                        Err(_) => {
                            self.prompter.notify(Notice::BlankKey).await;
                            ActivationState::Prompting
                        }
                    },
                },
                ActivationState::Validating { key, stored } => {
                    match self.validate(&key).await {
                        CheckOutcome::Valid(verdict) => {
                            if !stored {
                                self.store.save_key(&key)?;
                            }
                            info!(%verdict, "license valid");
                            self.prompter.notify(Notice::KeyAccepted(verdict)).await;
                            ActivationState::Valid(Activated { key, verdict })
                        }
                        CheckOutcome::Invalid(verdict) => {
                            warn!(%verdict, "license rejected, discarding stored key");
                            self.store.delete_key()?;
                            self.prompter.notify(Notice::KeyRejected(verdict)).await;
                            ActivationState::Invalid(verdict)
                        }
                        CheckOutcome::Unreachable(reason) => {
                            warn!(%reason, "license could not be verified");
                            self.prompter
                                .notify(Notice::CannotVerify(reason.clone()))
                                .await;
                            ActivationState::Unreachable(reason)
                        }
                    }
                }
                ActivationState::Unreachable(reason) => {
                    return Ok(ActivationOutcome::Unreachable(reason));
                }
                ActivationState::Valid(activated) => return Ok(ActivationOutcome::Valid(activated)),
                ActivationState::Cancelled => return Ok(ActivationOutcome::Cancelled),
            };
            self.transition(next);
        }
    }

    /// Returns the stored contact address, prompting until a well-formed
    /// one is entered. `None` means the user cancelled.
    pub async fn ensure_contact(&mut self) -> LicenseResult<Option<String>> {
        match self.store.load_email() {
            Ok(email) => return Ok(Some(email)),
            Err(LicenseError::LocalFileMissing(_) | LicenseError::InvalidEmailFormat(_)) => {}
            Err(e) => return Err(e),
        }

        loop {
            let Some(raw) = self.prompter.ask_email().await else {
                return Ok(None);
            };
            let email = raw.trim();
            if !is_valid_email(email) {
                self.prompter.notify(Notice::InvalidEmail).await;
                continue;
            }
            self.store.save_email(email)?;
            self.prompter.notify(Notice::EmailSaved).await;
            return Ok(Some(email.to_string()));
        }
    }

    /// Deletes the stored key and returns to `NoKey`.
    pub fn forget(&mut self) -> LicenseResult<()> {
        self.store.delete_key()?;
        self.transition(ActivationState::NoKey);
        Ok(())
    }

    fn transition(&mut self, next: ActivationState) {
        debug!(from = ?self.state, to = ?next, "activation state");
        self.state = next;
    }
}
