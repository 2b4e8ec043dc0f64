//! Numeric one-time codes.
//!
//! A code of width `n` is drawn uniformly from `[10^(n-1), 10^n - 1]`, so it
//! always renders as exactly `n` decimal digits with a non-zero leading
//! digit (for `n > 1`). Generation uses the operating-system CSPRNG.

use std::fmt;

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};

use crate::error::{CodeError, Result};

/// Width used when the caller does not pick one.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Widest code whose range still fits in a `u64` (`10^19 - 1 < 2^64`).
pub const MAX_CODE_LENGTH: usize = 19;

/// A plaintext numeric code.
///
/// `Debug` is redacted and there is no `Display`, so a code cannot end up in
/// a log line by accident. Use [`Code::as_str`] at the one place the
/// plaintext is needed (hashing and delivery).
#[derive(Clone, PartialEq, Eq)]
pub struct Code(String);

impl Code {
    /// Wrap an existing digit string.
    ///
    /// Accepts 1 to [`MAX_CODE_LENGTH`] ASCII digits.
    pub fn parse(digits: impl Into<String>) -> Result<Self> {
        let digits = digits.into();
        check_length(digits.len())?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeError::InvalidArgument(
                "code must contain only ASCII digits".into(),
            ));
        }
        Ok(Self(digits))
    }

    /// The plaintext digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of digits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a code has at least one digit.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code(<{} digits>)", self.0.len())
    }
}

impl AsRef<str> for Code {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generate a code of `length` digits from the OS random source.
pub fn generate_code(length: usize) -> Result<Code> {
    generate_code_with(&mut OsRng, length)
}

/// Generate a code of `length` digits from the given cryptographic RNG.
///
/// `gen_range` samples without modulo bias.
pub fn generate_code_with<R: Rng + CryptoRng>(rng: &mut R, length: usize) -> Result<Code> {
    let (min, max) = bounds(length)?;
    let value: u64 = rng.gen_range(min..=max);
    Ok(Code(value.to_string()))
}

/// Inclusive numeric range for a code width.
fn bounds(length: usize) -> Result<(u64, u64)> {
    check_length(length)?;
    let exp = length as u32;
    let min = 10u64.pow(exp - 1);
    let max = 10u64.pow(exp) - 1;
    Ok((min, max))
}

fn check_length(length: usize) -> Result<()> {
    if length == 0 {
        return Err(CodeError::InvalidArgument(
            "code length must be at least 1".into(),
        ));
    }
    if length > MAX_CODE_LENGTH {
        return Err(CodeError::InvalidArgument(format!(
            "code length {} exceeds maximum of {}",
            length, MAX_CODE_LENGTH
        )));
    }
    Ok(())
}
