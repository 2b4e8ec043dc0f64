//! SQLite implementation of the CodeStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use vericode_core::{AuthCode, ChallengeId, CodeHash};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{AttemptGrant, CodeStore};

const SELECT_COLUMNS: &str =
    "SELECT id, subject, code_hash, created_at, expires_at, used_at, attempts FROM auth_codes";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::TaskFailed(format!("mutex poisoned: {}", e)))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(format!("spawn_blocking failed: {}", e)))?
    }
}

// Helper to convert a row to AuthCode
fn row_to_auth_code(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuthCode> {
    let id_bytes: Vec<u8> = row.get("id")?;
    let attempts: i64 = row.get("attempts")?;

    let id: [u8; 16] = id_bytes.try_into().map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, "id".into(), rusqlite::types::Type::Blob)
    })?;

    Ok(AuthCode {
        id: ChallengeId::from_bytes(id),
        subject: row.get("subject")?,
        code_hash: CodeHash::new(row.get::<_, String>("code_hash")?),
        created_at: row.get("created_at")?,
        expires_at: row.get("expires_at")?,
        used_at: row.get("used_at")?,
        attempts: u32::try_from(attempts).map_err(|_| {
            rusqlite::Error::IntegralValueOutOfRange(6, attempts)
        })?,
    })
}

fn attempts_from_sql(attempts: i64) -> Result<u32> {
    u32::try_from(attempts)
        .map_err(|_| StoreError::InvalidData(format!("attempts out of range: {}", attempts)))
}

#[async_trait]
impl CodeStore for SqliteStore {
    async fn insert(&self, record: &AuthCode) -> Result<()> {
        let record = record.clone();

        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO auth_codes (
                    id, subject, code_hash, created_at, expires_at, used_at, attempts
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id.as_bytes().as_slice(),
                    record.subject,
                    record.code_hash.as_str(),
                    record.created_at,
                    record.expires_at,
                    record.used_at,
                    record.attempts as i64,
                ],
            )?;

            if inserted == 0 {
                return Err(StoreError::Conflict(record.id.to_hex()));
            }
            Ok(())
        })
        .await
    }

    async fn get(&self, id: &ChallengeId) -> Result<Option<AuthCode>> {
        let id = *id;

        self.with_conn(move |conn| {
            conn.query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id.as_bytes().as_slice()],
                row_to_auth_code,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn delete(&self, id: &ChallengeId) -> Result<bool> {
        let id = *id;

        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM auth_codes WHERE id = ?1",
                params![id.as_bytes().as_slice()],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn find_active(&self, subject: &str, now: i64) -> Result<Option<AuthCode>> {
        let subject = subject.to_owned();

        self.with_conn(move |conn| {
            conn.query_row(
                &format!(
                    "{} WHERE subject = ?1 AND used_at IS NULL AND expires_at > ?2
                     ORDER BY created_at DESC, rowid DESC LIMIT 1",
                    SELECT_COLUMNS
                ),
                params![subject, now],
                row_to_auth_code,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn record_failed_attempt(&self, id: &ChallengeId) -> Result<u32> {
        let id = *id;

        self.with_conn(move |conn| {
            let attempts: Option<i64> = conn
                .query_row(
                    "UPDATE auth_codes SET attempts = attempts + 1 WHERE id = ?1
                     RETURNING attempts",
                    params![id.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            let attempts = attempts.ok_or_else(|| StoreError::NotFound(id.to_hex()))?;
            attempts_from_sql(attempts)
        })
        .await
    }

    async fn begin_attempt(
        &self,
        id: &ChallengeId,
        now: i64,
        max: Option<u32>,
    ) -> Result<AttemptGrant> {
        let id = *id;

        self.with_conn(move |conn| {
            let granted: Option<i64> = conn
                .query_row(
                    "UPDATE auth_codes SET attempts = attempts + 1
                     WHERE id = ?1 AND used_at IS NULL AND expires_at > ?2
                       AND (?3 IS NULL OR attempts < ?3)
                     RETURNING attempts",
                    params![id.as_bytes().as_slice(), now, max.map(i64::from)],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(attempts) = granted {
                return Ok(AttemptGrant::Granted {
                    attempts: attempts_from_sql(attempts)?,
                });
            }

            // Still under the connection lock, so this sees the same row state.
            let exhausted: Option<i64> = conn
                .query_row(
                    "SELECT attempts FROM auth_codes
                     WHERE id = ?1 AND used_at IS NULL AND expires_at > ?2",
                    params![id.as_bytes().as_slice(), now],
                    |row| row.get(0),
                )
                .optional()?;

            match exhausted {
                Some(attempts) => Ok(AttemptGrant::Exhausted {
                    attempts: attempts_from_sql(attempts)?,
                }),
                None => Ok(AttemptGrant::Unavailable),
            }
        })
        .await
    }

    async fn mark_used(&self, id: &ChallengeId, at: i64) -> Result<bool> {
        let id = *id;

        self.with_conn(move |conn| {
            let updated = conn.execute(
                "UPDATE auth_codes SET used_at = ?2 WHERE id = ?1 AND used_at IS NULL",
                params![id.as_bytes().as_slice(), at],
            )?;
            Ok(updated == 1)
        })
        .await
    }

    async fn invalidate_active(&self, subject: &str, now: i64) -> Result<usize> {
        let subject = subject.to_owned();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "DELETE FROM auth_codes WHERE subject = ?1 AND used_at IS NULL
                 RETURNING expires_at > ?2",
            )?;
            let still_active = stmt
                .query_map(params![subject, now], |row| row.get::<_, bool>(0))?
                .collect::<rusqlite::Result<Vec<bool>>>()?;

            Ok(still_active.into_iter().filter(|&active| active).count())
        })
        .await
    }

    async fn purge_expired(&self, now: i64) -> Result<usize> {
        let removed = self
            .with_conn(move |conn| {
                let removed = conn.execute(
                    "DELETE FROM auth_codes WHERE used_at IS NOT NULL OR expires_at <= ?1",
                    params![now],
                )?;
                Ok(removed)
            })
            .await?;

        if removed > 0 {
            tracing::debug!(removed, "purged expired challenges");
        }
        Ok(removed)
    }
}
