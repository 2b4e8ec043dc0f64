//! One-way hashing of codes.
//!
//! Codes are hashed with bcrypt. The low entropy of a numeric code (10^6
//! values for the default width) means the cost factor is the only thing
//! standing between a leaked hash and the plaintext, so it is configurable
//! and embedded in every hash it produces.

use std::fmt;

use bcrypt::BcryptError;
use serde::{Deserialize, Serialize};

use crate::code::Code;
use crate::error::{CodeError, Result};

/// Cost used when none is configured.
pub const DEFAULT_COST: u32 = 10;

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Hashing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashConfig {
    /// bcrypt log2 work factor.
    pub cost: u32,
}

impl HashConfig {
    /// Create a config with the given cost.
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Check that the cost is one bcrypt will accept.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_COST..=MAX_COST).contains(&self.cost) {
            return Err(CodeError::Hashing(format!(
                "cost {} outside {}..={}",
                self.cost, MIN_COST, MAX_COST
            )));
        }
        Ok(())
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

/// A stored code hash in modular-crypt form: `$2b$<cost>$<salt><digest>`.
///
/// Opaque to callers. Values read back from storage are not validated on
/// construction; [`compare_code`] treats a malformed value as a mismatch.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeHash(String);

impl CodeHash {
    /// Wrap a hash string, typically one loaded from storage.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The encoded hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the encoded string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// The cost factor embedded in the encoding, if it parses.
    pub fn cost(&self) -> Option<u32> {
        let mut parts = self.0.split('$');
        // Leading empty segment before the first '$'.
        if parts.next() != Some("") {
            return None;
        }
        parts.next()?;
        let cost = parts.next()?;
        if cost.len() != 2 {
            return None;
        }
        cost.parse().ok()
    }
}

impl fmt::Debug for CodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cost() {
            Some(cost) => write!(f, "CodeHash(cost={})", cost),
            None => write!(f, "CodeHash(<malformed>)"),
        }
    }
}

impl From<String> for CodeHash {
    fn from(encoded: String) -> Self {
        Self(encoded)
    }
}

impl AsRef<str> for CodeHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Hash a code with a fresh random salt.
///
/// Two calls on the same code never return the same hash.
pub fn hash_code(code: &Code, config: &HashConfig) -> Result<CodeHash> {
    config.validate()?;
    bcrypt::hash(code.as_str(), config.cost)
        .map(CodeHash)
        .map_err(|e| CodeError::Hashing(e.to_string()))
}

/// Check a candidate against a stored hash.
///
/// Uses the cost and salt embedded in `stored`, and bcrypt's constant-time
/// digest comparison. A stored hash that does not parse yields `Ok(false)`;
/// only failures of the primitive itself (I/O, RNG) surface as errors.
pub fn compare_code(candidate: &str, stored: &CodeHash) -> Result<bool> {
    match bcrypt::verify(candidate, stored.as_str()) {
        Ok(matched) => Ok(matched),
        Err(
            BcryptError::InvalidHash(_)
            | BcryptError::InvalidPrefix(_)
            | BcryptError::InvalidCost(_)
            | BcryptError::CostNotAllowed(_)
            | BcryptError::InvalidSaltLen(_)
            | BcryptError::InvalidBase64(_),
        ) => {
            tracing::debug!("stored code hash is malformed; treating as mismatch");
            Ok(false)
        }
        Err(e) => Err(CodeError::Hashing(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::code::generate_code;

    const FAST: HashConfig = HashConfig::new(MIN_COST);

    #[test]
    fn test_hash_then_compare() {
        let code = Code::parse("482913").unwrap();
        let hash = hash_code(&code, &FAST).unwrap();

        assert!(compare_code("482913", &hash).unwrap());
        assert!(!compare_code("482914", &hash).unwrap());
        assert!(!compare_code("", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let code = generate_code(6).unwrap();
        let h1 = hash_code(&code, &FAST).unwrap();
        let h2 = hash_code(&code, &FAST).unwrap();

        assert_ne!(h1, h2);
        assert!(compare_code(code.as_str(), &h1).unwrap());
        assert!(compare_code(code.as_str(), &h2).unwrap());
    }

    #[test]
    fn test_encoding_embeds_cost() {
        let code = Code::parse("1234").unwrap();
        let hash = hash_code(&code, &HashConfig::new(5)).unwrap();

        assert!(hash.as_str().starts_with("$2b$05$"));
        assert_eq!(hash.as_str().len(), 60);
        assert_eq!(hash.cost(), Some(5));
    }

    #[test]
    fn test_default_cost_is_ten() {
        assert_eq!(HashConfig::default().cost, 10);
    }

    #[test]
    fn test_hash_survives_cost_change() {
        // A hash made under an old cost still verifies after the config moves on.
        let code = Code::parse("777000").unwrap();
        let old = hash_code(&code, &HashConfig::new(4)).unwrap();
        let new = hash_code(&code, &HashConfig::new(5)).unwrap();

        assert_eq!(old.cost(), Some(4));
        assert_eq!(new.cost(), Some(5));
        assert!(compare_code("777000", &old).unwrap());
        assert!(compare_code("777000", &new).unwrap());
    }

    #[test]
    fn test_invalid_cost_is_hashing_error() {
        let code = Code::parse("123456").unwrap();
        for cost in [0, 3, 32, 99] {
            let err = hash_code(&code, &HashConfig::new(cost)).unwrap_err();
            assert!(matches!(err, CodeError::Hashing(_)), "cost {}", cost);
        }
    }

    #[test]
    fn test_malformed_hash_is_mismatch() {
        let malformed = [
            "",
            "not-a-hash",
            "$2b$10$",
            "$2b$10$tooshort",
            "$9z$10$abcdefghijklmnopqrstuvabcdefghijklmnopqrstuvwxyz01234",
            "$2b$xx$abcdefghijklmnopqrstuvabcdefghijklmnopqrstuvwxyz01234",
            "$2b$99$abcdefghijklmnopqrstuvabcdefghijklmnopqrstuvwxyz01234",
            "123456",
        ];

        for m in malformed {
            let result = compare_code("123456", &CodeHash::new(m));
            assert!(matches!(result, Ok(false)), "{:?} -> {:?}", m, result);
        }
    }

    #[test]
    fn test_cost_parse() {
        assert_eq!(CodeHash::new("$2b$12$whatever").cost(), Some(12));
        assert_eq!(CodeHash::new("$2b$1$whatever").cost(), None);
        assert_eq!(CodeHash::new("2b$12$whatever").cost(), None);
        assert_eq!(CodeHash::new("").cost(), None);
    }

    #[test]
    fn test_debug_hides_digest() {
        let code = Code::parse("123456").unwrap();
        let hash = hash_code(&code, &FAST).unwrap();
        assert_eq!(format!("{:?}", hash), "CodeHash(cost=4)");
    }

    #[test]
    fn test_serde_transparent() {
        let hash = CodeHash::new("$2b$04$abc");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"$2b$04$abc\"");
        let back: CodeHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_no_early_exit_timing() {
        // Best effort: the digest is recomputed in full either way, so a
        // wrong candidate should cost about as much as the right one.
        let config = HashConfig::new(6);
        let hash = hash_code(&Code::parse("555123").unwrap(), &config).unwrap();

        let time = |candidate: &str| -> Duration {
            (0..5)
                .map(|_| {
                    let start = Instant::now();
                    let _ = compare_code(candidate, &hash).unwrap();
                    start.elapsed()
                })
                .min()
                .unwrap()
        };

        let right = time("555123");
        let wrong = time("000000");

        let (fast, slow) = if right < wrong { (right, wrong) } else { (wrong, right) };
        assert!(
            slow < fast * 10,
            "right={:?} wrong={:?}",
            right,
            wrong
        );
    }
}
