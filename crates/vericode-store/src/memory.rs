//! In-memory implementation of the CodeStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use vericode_core::{AuthCode, ChallengeId};

use crate::error::{Result, StoreError};
use crate::traits::{AttemptGrant, CodeStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Records indexed by id.
    records: HashMap<ChallengeId, StoredCode>,

    /// Insertion counter, breaks `created_at` ties like SQLite's rowid.
    next_seq: u64,
}

struct StoredCode {
    seq: u64,
    record: AuthCode,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Number of records held, in any state.
    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.records.len()).unwrap_or(0)
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::TaskFailed(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::TaskFailed(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CodeStore for MemoryStore {
    async fn insert(&self, record: &AuthCode) -> Result<()> {
        let mut inner = self.write()?;

        if inner.records.contains_key(&record.id) {
            return Err(StoreError::Conflict(record.id.to_hex()));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.records.insert(
            record.id,
            StoredCode {
                seq,
                record: record.clone(),
            },
        );

        Ok(())
    }

    async fn get(&self, id: &ChallengeId) -> Result<Option<AuthCode>> {
        let inner = self.read()?;
        Ok(inner.records.get(id).map(|s| s.record.clone()))
    }

    async fn delete(&self, id: &ChallengeId) -> Result<bool> {
        let mut inner = self.write()?;
        Ok(inner.records.remove(id).is_some())
    }

    async fn find_active(&self, subject: &str, now: i64) -> Result<Option<AuthCode>> {
        let inner = self.read()?;

        Ok(inner
            .records
            .values()
            .filter(|s| s.record.subject == subject && s.record.is_active(now))
            .max_by_key(|s| (s.record.created_at, s.seq))
            .map(|s| s.record.clone()))
    }

    async fn record_failed_attempt(&self, id: &ChallengeId) -> Result<u32> {
        let mut inner = self.write()?;

        let stored = inner
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_hex()))?;

        stored.record.attempts = stored.record.attempts.saturating_add(1);
        Ok(stored.record.attempts)
    }

    async fn begin_attempt(
        &self,
        id: &ChallengeId,
        now: i64,
        max: Option<u32>,
    ) -> Result<AttemptGrant> {
        let mut inner = self.write()?;

        let Some(stored) = inner.records.get_mut(id) else {
            return Ok(AttemptGrant::Unavailable);
        };
        let record = &mut stored.record;
        if !record.is_active(now) {
            return Ok(AttemptGrant::Unavailable);
        }
        if max.is_some_and(|max| record.attempts >= max) {
            return Ok(AttemptGrant::Exhausted {
                attempts: record.attempts,
            });
        }

        record.attempts = record.attempts.saturating_add(1);
        Ok(AttemptGrant::Granted {
            attempts: record.attempts,
        })
    }

    async fn mark_used(&self, id: &ChallengeId, at: i64) -> Result<bool> {
        let mut inner = self.write()?;

        match inner.records.get_mut(id) {
            Some(stored) if stored.record.used_at.is_none() => {
                stored.record.used_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn invalidate_active(&self, subject: &str, now: i64) -> Result<usize> {
        let mut inner = self.write()?;

        let mut superseded = 0;
        inner.records.retain(|_, s| {
            let unused = s.record.subject == subject && !s.record.is_used();
            if unused && s.record.is_active(now) {
                superseded += 1;
            }
            !unused
        });

        Ok(superseded)
    }

    async fn purge_expired(&self, now: i64) -> Result<usize> {
        let mut inner = self.write()?;

        let before = inner.records.len();
        inner.records.retain(|_, s| s.record.is_active(now));

        Ok(before - inner.records.len())
    }
}
