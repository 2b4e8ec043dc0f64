//! CodeStore trait: the abstract interface for challenge persistence.
//!
//! This trait allows the challenge service to be storage-agnostic.
//! Implementations include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use vericode_core::{AuthCode, ChallengeId};

use crate::error::Result;

/// Result of [`CodeStore::begin_attempt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptGrant {
    /// A slot was reserved. `attempts` includes it.
    Granted { attempts: u32 },
    /// The ceiling was already reached; nothing changed.
    Exhausted { attempts: u32 },
    /// The record is missing, used or expired.
    Unavailable,
}

/// Async interface for persisting issued challenges.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// A record is *active* at `now` when it is unused and `expires_at > now`.
#[async_trait]
pub trait CodeStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new record.
    ///
    /// Returns `Conflict` if a record with the same id exists.
    async fn insert(&self, record: &AuthCode) -> Result<()>;

    /// Get a record by id, active or not.
    async fn get(&self, id: &ChallengeId) -> Result<Option<AuthCode>>;

    /// Delete a record. Returns whether it existed.
    async fn delete(&self, id: &ChallengeId) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Challenge Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// The newest active record for a subject.
    async fn find_active(&self, subject: &str, now: i64) -> Result<Option<AuthCode>>;

    /// Increment the attempt counter unconditionally and return the new value.
    ///
    /// Returns `NotFound` if the record does not exist.
    async fn record_failed_attempt(&self, id: &ChallengeId) -> Result<u32>;

    /// Reserve one check against an active record.
    ///
    /// Increments the counter only while `attempts < max` (no bound when
    /// `max` is `None`), as a single atomic step. Concurrent callers can
    /// never be granted more than `max` checks in total.
    async fn begin_attempt(
        &self,
        id: &ChallengeId,
        now: i64,
        max: Option<u32>,
    ) -> Result<AttemptGrant>;

    /// Consume a record.
    ///
    /// Sets `used_at` only if it is still unset. Returns `true` if this call
    /// consumed the record, `false` if it was already used or is missing.
    async fn mark_used(&self, id: &ChallengeId, at: i64) -> Result<bool>;

    /// Delete every unused record for a subject, expired or not.
    ///
    /// Returns how many of the removed records were still active at `now`.
    async fn invalidate_active(&self, subject: &str, now: i64) -> Result<usize>;

    // ─────────────────────────────────────────────────────────────────────────
    // Maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Delete records that are expired or used. Returns how many were removed.
    async fn purge_expired(&self, now: i64) -> Result<usize>;
}
