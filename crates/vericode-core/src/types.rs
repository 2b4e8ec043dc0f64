//! Identifier and record types shared by stores and the challenge service.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::hash::CodeHash;

/// Random identifier of one issued challenge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChallengeId(pub [u8; 16]);

impl ChallengeId {
    /// Draw a fresh random identifier.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 16] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChallengeId({})", self.to_hex())
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 16]> for ChallengeId {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

/// A persisted challenge: the hash of a code issued to a subject.
///
/// Timestamps are Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCode {
    pub id: ChallengeId,
    /// Identity the code was issued to (user id).
    pub subject: String,
    pub code_hash: CodeHash,
    pub created_at: i64,
    pub expires_at: i64,
    /// Set once, when the code is consumed.
    pub used_at: Option<i64>,
    /// Failed comparisons so far.
    pub attempts: u32,
}

impl AuthCode {
    /// A new, unused record with a fresh id.
    pub fn new(subject: impl Into<String>, code_hash: CodeHash, now: i64, ttl_ms: i64) -> Self {
        Self {
            id: ChallengeId::generate(),
            subject: subject.into(),
            code_hash,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
            used_at: None,
            attempts: 0,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Unused and not yet expired.
    pub fn is_active(&self, now: i64) -> bool {
        !self.is_used() && !self.is_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_id_hex_roundtrip() {
        let id = ChallengeId::generate();
        let hex = id.to_hex();
        assert_eq!(hex.len(), 32);
        assert_eq!(ChallengeId::from_hex(&hex).unwrap(), id);
    }

    #[test]
    fn test_challenge_id_wrong_length() {
        assert!(ChallengeId::from_hex("abcd").is_err());
        assert!(ChallengeId::from_hex("zz").is_err());
    }

    #[test]
    fn test_challenge_ids_unique() {
        assert_ne!(ChallengeId::generate(), ChallengeId::generate());
    }

    #[test]
    fn test_active_window() {
        let record = AuthCode::new("user-1", CodeHash::new("$2b$04$x"), 1_000, 600_000);

        assert_eq!(record.expires_at, 601_000);
        assert_eq!(record.attempts, 0);
        assert!(record.is_active(1_000));
        assert!(record.is_active(600_999));
        assert!(!record.is_active(601_000));
        assert!(record.is_expired(601_000));
    }

    #[test]
    fn test_used_is_inactive() {
        let mut record = AuthCode::new("user-1", CodeHash::new("$2b$04$x"), 0, 10);
        record.used_at = Some(5);
        assert!(record.is_used());
        assert!(!record.is_active(5));
    }
}
