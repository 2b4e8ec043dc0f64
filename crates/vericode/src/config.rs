//! Configuration for the challenge service.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use vericode_core::{HashConfig, DEFAULT_CODE_LENGTH, MAX_CODE_LENGTH, MAX_COST, MIN_COST};

use crate::error::ConfigError;

/// Default code lifetime: 10 minutes.
pub const DEFAULT_TTL_MS: i64 = 10 * 60 * 1000;

/// Configuration for code issuance and verification.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use vericode::VericodeConfig;
///
/// let config = VericodeConfig::from_json_str(r#"{ "hashing": { "cost": 12 } }"#).unwrap();
/// assert_eq!(config.hashing.cost, 12);
/// assert_eq!(config.code_length, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VericodeConfig {
    /// Digits per code.
    pub code_length: usize,
    /// bcrypt parameters for new hashes.
    pub hashing: HashConfig,
    /// Code lifetime in milliseconds.
    pub ttl_ms: i64,
    /// Checks after which a challenge stops accepting guesses.
    /// `None` records attempts without enforcing a ceiling.
    pub max_attempts: Option<u32>,
}

impl Default for VericodeConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            hashing: HashConfig::default(),
            ttl_ms: DEFAULT_TTL_MS,
            max_attempts: None,
        }
    }
}

impl VericodeConfig {
    /// Parse from JSON and validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CODE_LENGTH).contains(&self.code_length) {
            return Err(ConfigError::Invalid {
                field: "code_length",
                reason: format!("must be in 1..={}", MAX_CODE_LENGTH),
            });
        }
        if !(MIN_COST..=MAX_COST).contains(&self.hashing.cost) {
            return Err(ConfigError::Invalid {
                field: "hashing.cost",
                reason: format!("must be in {}..={}", MIN_COST, MAX_COST),
            });
        }
        if self.ttl_ms <= 0 {
            return Err(ConfigError::Invalid {
                field: "ttl_ms",
                reason: "must be positive".into(),
            });
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_attempts",
                reason: "must be at least 1 when set".into(),
            });
        }
        Ok(())
    }

    /// Code lifetime as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms.max(0) as u64)
    }
}
