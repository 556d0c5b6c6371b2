//! Local persistence of the activation key and contact address.
//!
//! Each value is one plain-text line in its own file under the per-user
//! configuration directory. Files are only created once a value has been
//! accepted.

use crate::email::is_valid_email;
use crate::error::{LicenseError, LicenseResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use tuneup_types::ActivationKey;

/// Directory under the user's config dir that holds the files.
pub const APP_DIR_NAME: &str = "NTi";
const KEY_FILE: &str = ".license_key";
const EMAIL_FILE: &str = ".email";

/// File-backed store for the client activation state.
#[derive(Debug, Clone)]
pub struct LicenseStore {
    dir: PathBuf,
}

impl LicenseStore {
    /// Creates a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a store in the platform config directory
    /// (e.g. `%APPDATA%\NTi` on Windows, `~/.config/NTi` on Linux).
    pub fn default_location() -> LicenseResult<Self> {
        let base = dirs::config_dir().ok_or(LicenseError::NoConfigDir)?;
        Ok(Self::new(base.join(APP_DIR_NAME)))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn key_path(&self) -> PathBuf {
        self.dir.join(KEY_FILE)
    }

    #[must_use]
    pub fn email_path(&self) -> PathBuf {
        self.dir.join(EMAIL_FILE)
    }

    // ── Activation key ───────────────────────────────────────────

    /// Returns the stored key, or `LocalFileMissing` if none is stored.
    pub fn load_key(&self) -> LicenseResult<ActivationKey> {
        let raw = read_line(&self.key_path())?;
        Ok(ActivationKey::parse(&raw)?)
    }

    pub fn save_key(&self, key: &ActivationKey) -> LicenseResult<()> {
        write_line(&self.dir, &self.key_path(), key.as_str())
    }

    /// Deletes the stored key. Deleting an absent key is not an error.
    pub fn delete_key(&self) -> LicenseResult<()> {
        match fs::remove_file(self.key_path()) {
            Ok(()) => {
                debug!(path = %self.key_path().display(), "stored key deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // ── Contact address ──────────────────────────────────────────

    /// Returns the stored contact address.
    ///
    /// A stored value that fails the shape check is reported as
    /// `InvalidEmailFormat` so the caller can prompt for a new one.
    pub fn load_email(&self) -> LicenseResult<String> {
        let email = read_line(&self.email_path())?;
        if !is_valid_email(&email) {
            return Err(LicenseError::InvalidEmailFormat(email));
        }
        Ok(email)
    }

    /// Validates and stores a contact address.
    pub fn save_email(&self, email: &str) -> LicenseResult<()> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(LicenseError::InvalidEmailFormat(email.to_string()));
        }
        write_line(&self.dir, &self.email_path(), email)
    }
}

fn read_line(path: &Path) -> LicenseResult<String> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let line = content.trim();
            if line.is_empty() {
                Err(LicenseError::LocalFileMissing(path.to_path_buf()))
            } else {
                Ok(line.to_string())
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(LicenseError::LocalFileMissing(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

fn write_line(dir: &Path, path: &Path, value: &str) -> LicenseResult<()> {
    fs::create_dir_all(dir)?;
    fs::write(path, value)?;
    debug!(path = %path.display(), "stored");
    Ok(())
}
