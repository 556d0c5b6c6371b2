//! SQLite license database for Tune-Up.
//!
//! Holds one row per license seat: subscriber id, activation key, bound
//! machine fingerprint (or the unbound marker) and activation time.
//!
//! The validation service needs exactly one primitive from this crate,
//! [`LicenseDb::check_and_bind`], which classifies a check request and
//! performs the one-time bind atomically. The remaining operations back the
//! administrative CLI.

mod error;
mod store;

pub use error::{DbError, DbResult};
pub use store::LicenseDb;
