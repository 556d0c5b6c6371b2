//! License table access backed by SQLite.

use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};
use tuneup_types::{ActivationKey, Binding, Fingerprint, LicenseRecord, Verdict, UNBOUND_SENTINEL};

/// How long a writer waits on another process holding the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistent store of license records.
#[derive(Clone)]
pub struct LicenseDb {
    conn: Arc<Mutex<Connection>>,
}

impl LicenseDb {
    /// Opens (or creates) a license database at the given path.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Opens an in-memory license database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Creates the licenses table if it does not exist.
    pub fn init_schema(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS licenses (
                id TEXT PRIMARY KEY,
                activation_key TEXT NOT NULL UNIQUE,
                hash TEXT NOT NULL,
                activated_on TEXT
            );
            ",
        )?;
        Ok(())
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    // ── Validation ───────────────────────────────────────────────

    /// Classifies a check request and binds the record on first use.
    ///
    /// The lookup, the bind and the fall-through comparison run inside one
    /// `IMMEDIATE` transaction, and the bind itself only succeeds while the
    /// row still carries the unbound marker. Two first uses racing on the
    /// same key (from this process or another one sharing the file) therefore
    /// produce exactly one `Activated`; the loser is classified against the
    /// winner's fingerprint. On any error the transaction is rolled back.
    ///
    /// Never returns `MissingParameter` or `InternalError`; those are the
    /// caller's to produce.
    pub fn check_and_bind(&self, key: &ActivationKey, fingerprint: &Fingerprint) -> DbResult<Verdict> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let stored: Option<String> = tx
            .query_row(
                "SELECT hash FROM licenses WHERE activation_key = ?1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(stored) = stored else {
            return Ok(Verdict::KeyNotFound);
        };

        let verdict = match Binding::from_stored(&stored) {
            Binding::Unbound => {
                let now = Utc::now().to_rfc3339();
                let changed = tx.execute(
                    "UPDATE licenses SET hash = ?1, activated_on = ?2
                     WHERE activation_key = ?3 AND hash = ?4",
                    params![fingerprint.as_str(), now, key.as_str(), UNBOUND_SENTINEL],
                )?;
                if changed == 1 {
                    info!(key = %key.redacted(), fingerprint = %fingerprint, "license bound");
                    Verdict::Activated
                } else {
                    let current: String = tx.query_row(
                        "SELECT hash FROM licenses WHERE activation_key = ?1",
                        params![key.as_str()],
                        |row| row.get(0),
                    )?;
                    classify(&Binding::from_stored(&current), fingerprint)
                }
            }
            bound => classify(&bound, fingerprint),
        };

        tx.commit()?;
        debug!(key = %key.redacted(), ?verdict, "license checked");
        Ok(verdict)
    }

    // ── Administration ───────────────────────────────────────────

    /// Provisions an unbound license for a subscriber and returns its key.
    pub fn create_license(&self, id: &str) -> DbResult<ActivationKey> {
        let record = LicenseRecord::provisioned(id, ActivationKey::generate());
        self.insert(&record)?;
        info!(id, "license created");
        Ok(record.activation_key)
    }

    /// Inserts a record as-is.
    pub fn insert(&self, record: &LicenseRecord) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO licenses (id, activation_key, hash, activated_on) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id,
                record.activation_key.as_str(),
                record.binding.as_stored(),
                record.activated_on.map(|t| t.to_rfc3339()),
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref err, _) if err.code == ErrorCode::ConstraintViolation => {
                DbError::DuplicateId(record.id.clone())
            }
            other => DbError::Database(other),
        })?;
        Ok(())
    }

    /// Removes the license with the given subscriber id.
    ///
    /// Returns false if there was no such license.
    pub fn remove_license(&self, id: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM licenses WHERE id = ?1", params![id])?;
        if removed > 0 {
            info!(id, "license removed");
        }
        Ok(removed > 0)
    }

    /// Lists all licenses ordered by subscriber id.
    pub fn list_licenses(&self) -> DbResult<Vec<LicenseRecord>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, activation_key, hash, activated_on FROM licenses ORDER BY id")?;
        let rows = stmt.query_map([], read_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(decode(row?)?);
        }
        Ok(records)
    }

    /// Looks up a license by activation key.
    pub fn get_license(&self, key: &ActivationKey) -> DbResult<Option<LicenseRecord>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT id, activation_key, hash, activated_on FROM licenses WHERE activation_key = ?1",
                params![key.as_str()],
                read_row,
            )
            .optional()?;
        raw.map(decode).transpose()
    }

    /// Returns the number of licenses.
    pub fn count(&self) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM licenses", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn classify(binding: &Binding, fingerprint: &Fingerprint) -> Verdict {
    if binding.fingerprint() == Some(fingerprint) {
        Verdict::Validated
    } else {
        Verdict::HashMismatch
    }
}

type RawRow = (String, String, String, Option<String>);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode((id, key, hash, activated_on): RawRow) -> DbResult<LicenseRecord> {
    let activation_key = ActivationKey::parse(&key)
        .map_err(|e| DbError::InvalidRow(format!("license {id}: {e}")))?;
    let activated_on = activated_on
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| DbError::InvalidRow(format!("license {id}: bad activated_on: {e}")))
        })
        .transpose()?;
    Ok(LicenseRecord {
        id,
        activation_key,
        binding: Binding::from_stored(&hash),
        activated_on,
    })
}
