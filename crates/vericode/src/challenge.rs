//! The challenge service: issue a code to a subject, verify it later.
//!
//! Sequencing:
//!
//! ```text
//! issue:  invalidate old → generate → hash → insert record → deliver
//! verify: find active → reserve attempt (ceiling?) → compare → consume
//! ```
//!
//! Only the hash is stored. The plaintext code exists in memory between
//! generation and delivery and is never logged.

use std::sync::Arc;

use tracing::{debug, info, warn};
use vericode_core::{AuthCode, ChallengeId};
use vericode_store::{AttemptGrant, CodeStore};

use crate::codes::VerificationCode;
use crate::config::VericodeConfig;
use crate::delivery::{CodeDelivery, CodeMessage, Recipient};
use crate::error::Result;

/// Handle to an issued challenge. Contains no secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    pub id: ChallengeId,
    /// Unix ms after which the code is no longer accepted.
    pub expires_at: i64,
}

/// Result of checking a candidate code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The code matched and has now been consumed.
    Verified { id: ChallengeId },
    /// The code did not match. `attempts` counts checks so far, this one included.
    Mismatch { attempts: u32 },
    /// The attempt ceiling was reached; the candidate was not checked.
    Locked { attempts: u32 },
    /// No unused, unexpired code exists for the subject.
    NotFound,
}

impl VerifyOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerifyOutcome::Verified { .. })
    }
}

/// Issues and verifies one-time codes for subjects.
pub struct ChallengeService<S: CodeStore, D: CodeDelivery> {
    store: Arc<S>,
    delivery: Arc<D>,
    codes: VerificationCode,
    config: VericodeConfig,
}

impl<S: CodeStore, D: CodeDelivery> ChallengeService<S, D> {
    /// Create a service. Fails if the config does not validate.
    pub fn new(store: S, delivery: D, config: VericodeConfig) -> Result<Self> {
        Self::with_shared(Arc::new(store), Arc::new(delivery), config)
    }

    /// Create a service over a store and channel shared with other owners.
    pub fn with_shared(store: Arc<S>, delivery: Arc<D>, config: VericodeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            delivery,
            codes: VerificationCode::new(config.hashing),
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    pub fn config(&self) -> &VericodeConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Issue
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a new code to `subject` and deliver it to `recipient`.
    pub async fn issue(&self, subject: &str, recipient: &Recipient) -> Result<Challenge> {
        self.issue_at(subject, recipient, now_millis()).await
    }

    /// [`issue`](Self::issue) with an explicit clock reading (Unix ms).
    ///
    /// Any code still active for the subject is discarded first. If delivery
    /// fails, the new record is removed again and the delivery error returned.
    pub async fn issue_at(
        &self,
        subject: &str,
        recipient: &Recipient,
        now: i64,
    ) -> Result<Challenge> {
        let superseded = self.store.invalidate_active(subject, now).await?;

        let code = self.codes.generate(self.config.code_length)?;
        let code_hash = self.codes.hash(&code).await?;

        let record = AuthCode::new(subject, code_hash, now, self.config.ttl_ms);
        self.store.insert(&record).await?;

        let message = CodeMessage::compose(recipient, &code, self.config.ttl());
        if let Err(e) = self.delivery.deliver(recipient, &message).await {
            warn!(subject, challenge = %record.id, error = %e, "code delivery failed");
            if let Err(cleanup) = self.store.delete(&record.id).await {
                warn!(challenge = %record.id, error = %cleanup, "failed to remove undelivered challenge");
            }
            return Err(e.into());
        }

        info!(
            subject,
            challenge = %record.id,
            expires_at = record.expires_at,
            superseded,
            "issued verification code"
        );

        Ok(Challenge {
            id: record.id,
            expires_at: record.expires_at,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verify
    // ─────────────────────────────────────────────────────────────────────────

    /// Check `candidate` against the subject's active code.
    pub async fn verify(&self, subject: &str, candidate: &str) -> Result<VerifyOutcome> {
        self.verify_at(subject, candidate, now_millis()).await
    }

    /// [`verify`](Self::verify) with an explicit clock reading (Unix ms).
    pub async fn verify_at(
        &self,
        subject: &str,
        candidate: &str,
        now: i64,
    ) -> Result<VerifyOutcome> {
        let Some(record) = self.store.find_active(subject, now).await? else {
            debug!(subject, "no active verification code");
            return Ok(VerifyOutcome::NotFound);
        };

        // Reserve the check before comparing, so the ceiling holds under
        // concurrent verifiers.
        let attempts = match self
            .store
            .begin_attempt(&record.id, now, self.config.max_attempts)
            .await?
        {
            AttemptGrant::Granted { attempts } => attempts,
            AttemptGrant::Exhausted { attempts } => {
                warn!(subject, challenge = %record.id, attempts, "challenge locked");
                return Ok(VerifyOutcome::Locked { attempts });
            }
            AttemptGrant::Unavailable => {
                debug!(subject, challenge = %record.id, "challenge superseded or consumed");
                return Ok(VerifyOutcome::NotFound);
            }
        };

        let stored_cost = record.code_hash.cost();
        if stored_cost != Some(self.config.hashing.cost) {
            debug!(challenge = %record.id, ?stored_cost, "stored hash uses a different cost");
        }

        if !self.codes.compare(candidate, &record.code_hash).await? {
            warn!(subject, challenge = %record.id, attempts, "verification code mismatch");
            return Ok(VerifyOutcome::Mismatch { attempts });
        }

        // Another verifier may have consumed it while we were comparing.
        if !self.store.mark_used(&record.id, now).await? {
            debug!(subject, challenge = %record.id, "challenge already consumed");
            return Ok(VerifyOutcome::NotFound);
        }

        info!(subject, challenge = %record.id, "verification code accepted");
        Ok(VerifyOutcome::Verified { id: record.id })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Remove expired and consumed records.
    pub async fn purge_expired(&self) -> Result<usize> {
        self.purge_expired_at(now_millis()).await
    }

    /// [`purge_expired`](Self::purge_expired) with an explicit clock reading.
    pub async fn purge_expired_at(&self, now: i64) -> Result<usize> {
        Ok(self.store.purge_expired(now).await?)
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::memory::Outbox;
    use crate::error::{ChallengeError, ConfigError};
    use vericode_core::{HashConfig, MIN_COST};
    use vericode_store::MemoryStore;

    const ADDR: &str = "alice@example.com";

    fn config() -> VericodeConfig {
        VericodeConfig {
            hashing: HashConfig::new(MIN_COST),
            ..VericodeConfig::default()
        }
    }

    fn service(config: VericodeConfig) -> ChallengeService<MemoryStore, Outbox> {
        ChallengeService::new(MemoryStore::new(), Outbox::new(), config).unwrap()
    }

    fn alice() -> Recipient {
        Recipient::new(ADDR, "Alice")
    }

    async fn delivered_code(svc: &ChallengeService<MemoryStore, Outbox>) -> String {
        svc.delivery()
            .last_code_for(ADDR)
            .await
            .unwrap()
            .as_str()
            .to_string()
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let svc = service(config());
        let challenge = svc.issue_at("u1", &alice(), 1_000).await.unwrap();
        assert_eq!(challenge.expires_at, 601_000);

        let code = delivered_code(&svc).await;
        assert_eq!(code.len(), 6);

        let stored = svc.store().get(&challenge.id).await.unwrap().unwrap();
        assert_ne!(stored.code_hash.as_str(), code);

        let outcome = svc.verify_at("u1", &code, 2_000).await.unwrap();
        assert_eq!(outcome, VerifyOutcome::Verified { id: challenge.id });
        assert_eq!(
            svc.store().get(&challenge.id).await.unwrap().unwrap().used_at,
            Some(2_000)
        );
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let svc = service(config());
        svc.issue_at("u1", &alice(), 0).await.unwrap();
        let code = delivered_code(&svc).await;

        assert!(svc.verify_at("u1", &code, 1).await.unwrap().is_verified());
        assert_eq!(
            svc.verify_at("u1", &code, 2).await.unwrap(),
            VerifyOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_expired_code_not_found() {
        let svc = service(config());
        svc.issue_at("u1", &alice(), 0).await.unwrap();
        let code = delivered_code(&svc).await;

        assert_eq!(
            svc.verify_at("u1", &code, 600_000).await.unwrap(),
            VerifyOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_mismatch_counts_attempts() {
        let svc = service(config());
        let challenge = svc.issue_at("u1", &alice(), 0).await.unwrap();
        let code = delivered_code(&svc).await;
        let wrong = if code == "123456" { "654321" } else { "123456" };

        assert_eq!(
            svc.verify_at("u1", wrong, 1).await.unwrap(),
            VerifyOutcome::Mismatch { attempts: 1 }
        );
        assert_eq!(
            svc.verify_at("u1", wrong, 2).await.unwrap(),
            VerifyOutcome::Mismatch { attempts: 2 }
        );

        // Without a ceiling the right code still works, and is counted too.
        assert!(svc.verify_at("u1", &code, 3).await.unwrap().is_verified());
        assert_eq!(
            svc.store().get(&challenge.id).await.unwrap().unwrap().attempts,
            3
        );
    }

    #[tokio::test]
    async fn test_attempt_ceiling_locks() {
        let svc = service(VericodeConfig {
            max_attempts: Some(2),
            ..config()
        });
        svc.issue_at("u1", &alice(), 0).await.unwrap();
        let code = delivered_code(&svc).await;
        let wrong = if code == "123456" { "654321" } else { "123456" };

        svc.verify_at("u1", wrong, 1).await.unwrap();
        svc.verify_at("u1", wrong, 2).await.unwrap();

        assert_eq!(
            svc.verify_at("u1", &code, 3).await.unwrap(),
            VerifyOutcome::Locked { attempts: 2 }
        );
    }

    #[tokio::test]
    async fn test_reissue_supersedes_previous() {
        let svc = service(config());
        let first = svc.issue_at("u1", &alice(), 0).await.unwrap();
        let first_code = delivered_code(&svc).await;

        let second = svc.issue_at("u1", &alice(), 10).await.unwrap();
        let second_code = delivered_code(&svc).await;

        assert!(svc.store().get(&first.id).await.unwrap().is_none());

        if first_code != second_code {
            assert_eq!(
                svc.verify_at("u1", &first_code, 20).await.unwrap(),
                VerifyOutcome::Mismatch { attempts: 1 }
            );
        }
        assert_eq!(
            svc.verify_at("u1", &second_code, 30).await.unwrap(),
            VerifyOutcome::Verified { id: second.id }
        );
    }

    #[tokio::test]
    async fn test_subjects_are_isolated() {
        let svc = service(config());
        svc.issue_at("u1", &alice(), 0).await.unwrap();
        let code = delivered_code(&svc).await;

        assert_eq!(
            svc.verify_at("u2", &code, 1).await.unwrap(),
            VerifyOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_rolls_back() {
        let svc = service(config());
        svc.delivery().set_failure(Some("smtp down")).await;

        let err = svc.issue_at("u1", &alice(), 0).await.unwrap_err();
        assert!(matches!(err, ChallengeError::Delivery(_)));
        assert!(svc.store().is_empty());
        assert!(svc.store().find_active("u1", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_code_length_from_config() {
        let svc = service(VericodeConfig {
            code_length: 8,
            ..config()
        });
        svc.issue_at("u1", &alice(), 0).await.unwrap();
        assert_eq!(delivered_code(&svc).await.len(), 8);
    }

    #[tokio::test]
    async fn test_purge() {
        let svc = service(config());
        svc.issue_at("u1", &alice(), 0).await.unwrap();
        svc.issue_at("u2", &alice(), 0).await.unwrap();

        assert_eq!(svc.purge_expired_at(1).await.unwrap(), 0);
        assert_eq!(svc.purge_expired_at(600_000).await.unwrap(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ChallengeService::new(
            MemoryStore::new(),
            Outbox::new(),
            VericodeConfig {
                code_length: 0,
                ..config()
            },
        );
        assert!(matches!(
            result,
            Err(ChallengeError::Config(ConfigError::Invalid { field: "code_length", .. }))
        ));
    }
}
