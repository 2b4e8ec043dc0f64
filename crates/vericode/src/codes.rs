//! Async front end to the core code primitives.
//!
//! bcrypt is CPU-bound on purpose (tens of milliseconds at the default
//! cost), so hashing and comparison run on tokio's blocking pool instead of
//! a runtime worker thread.

use vericode_core::{
    compare_code, generate_code, hash_code, Code, CodeHash, HashConfig, DEFAULT_CODE_LENGTH,
};

use crate::error::{ChallengeError, Result};

/// Generates, hashes and compares one-time codes.
///
/// Stateless apart from its hashing parameters; cheap to copy and safe to
/// share across tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerificationCode {
    hashing: HashConfig,
}

impl VerificationCode {
    /// Create with the given hashing parameters.
    pub fn new(hashing: HashConfig) -> Self {
        Self { hashing }
    }

    /// The hashing parameters applied to new hashes.
    pub fn hashing(&self) -> &HashConfig {
        &self.hashing
    }

    /// Generate a code of `length` digits.
    pub fn generate(&self, length: usize) -> Result<Code> {
        Ok(generate_code(length)?)
    }

    /// Generate a code of the default width (6).
    pub fn generate_default(&self) -> Result<Code> {
        self.generate(DEFAULT_CODE_LENGTH)
    }

    /// Hash a code with a fresh salt.
    pub async fn hash(&self, code: &Code) -> Result<CodeHash> {
        let code = code.clone();
        let hashing = self.hashing;

        tokio::task::spawn_blocking(move || hash_code(&code, &hashing))
            .await
            .map_err(|e| ChallengeError::TaskFailed(e.to_string()))?
            .map_err(ChallengeError::from)
    }

    /// Compare a candidate against a stored hash.
    ///
    /// Malformed stored hashes compare as `false`.
    pub async fn compare(&self, candidate: &str, stored: &CodeHash) -> Result<bool> {
        let candidate = candidate.to_owned();
        let stored = stored.clone();

        tokio::task::spawn_blocking(move || compare_code(&candidate, &stored))
            .await
            .map_err(|e| ChallengeError::TaskFailed(e.to_string()))?
            .map_err(ChallengeError::from)
    }
}
