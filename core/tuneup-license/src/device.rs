//! Machine fingerprinting for license binding.
//!
//! A fingerprint is the SHA-256 of one stable machine identifier, hex
//! encoded. It labels the device; it is not a secret and it is easy to
//! spoof, so the service only uses it to tell seats apart.

use sha2::{Digest, Sha256};
use tuneup_types::Fingerprint;

/// Supplies the raw machine identifier that gets hashed.
pub trait IdentitySource: Send + Sync {
    /// Returns the identifier, or `None` if this source has nothing to offer.
    fn identifier(&self) -> Option<String>;
}

/// The identifier of the current machine as reported by the OS.
///
/// Prefers the platform machine id and falls back to the hostname.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl IdentitySource for SystemIdentity {
    fn identifier(&self) -> Option<String> {
        get_machine_id().or_else(get_hostname)
    }
}

/// A fixed identifier, for callers that already know what to bind to.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub String);

impl IdentitySource for StaticIdentity {
    fn identifier(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Derives machine fingerprints.
pub struct DeviceFingerprint;

impl DeviceFingerprint {
    /// Fingerprints the current machine.
    #[must_use]
    pub fn generate() -> Fingerprint {
        Self::from_source(&SystemIdentity)
    }

    /// Fingerprints whatever identifier `source` reports.
    ///
    /// A source with no identifier hashes the empty string, which is still
    /// stable per machine.
    #[must_use]
    pub fn from_source(source: &dyn IdentitySource) -> Fingerprint {
        Self::from_identifier(&source.identifier().unwrap_or_default())
    }

    /// Hashes a raw identifier into a fingerprint.
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Fingerprint {
        let digest = Sha256::digest(identifier.as_bytes());
        // 64 hex chars are never empty and never the unbound marker.
        match Fingerprint::parse(&hex::encode(digest)) {
            Ok(fp) => fp,
            Err(_) => unreachable!("hex digest is a valid fingerprint"),
        }
    }
}

fn get_hostname() -> Option<String> {
    hostname::get().ok().and_then(|h| h.into_string().ok())
}

/// Gets the machine ID (platform-specific unique identifier).
fn get_machine_id() -> Option<String> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|output| {
                output
                    .lines()
                    .find(|l| l.contains("IOPlatformUUID"))
                    .and_then(|l| l.split('"').nth(3))
                    .map(String::from)
            })
    }

    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/etc/machine-id")
            .or_else(|_| std::fs::read_to_string("/var/lib/dbus/machine-id"))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("reg")
            .args([
                "query",
                r"HKLM\SOFTWARE\Microsoft\Cryptography",
                "/v",
                "MachineGuid",
            ])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|output| {
                output
                    .lines()
                    .find(|l| l.contains("MachineGuid"))
                    .and_then(|l| l.split_whitespace().last())
                    .map(String::from)
            })
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}
