//! # Vericode Core
//!
//! Pure primitives for one-time verification codes: generation, one-way
//! hashing, and comparison.
//!
//! This crate contains no storage, no delivery, no async runtime. Every
//! function is a bounded computation over its inputs. Expiry, persistence,
//! attempt counting and delivery belong to the caller (see the `vericode`
//! and `vericode-store` crates).
//!
//! ## Key Types
//!
//! - [`Code`] - A fixed-width numeric secret, held only until it is hashed and sent
//! - [`CodeHash`] - Self-describing bcrypt encoding (algorithm, cost, salt, digest)
//! - [`HashConfig`] - The bcrypt cost factor
//! - [`AuthCode`] - The record a caller persists for one issued challenge
//!
//! ## Usage
//!
//! ```rust
//! use vericode_core::{compare_code, generate_code, hash_code, HashConfig};
//!
//! let code = generate_code(6).unwrap();
//! let hash = hash_code(&code, &HashConfig::new(4)).unwrap();
//!
//! assert!(compare_code(code.as_str(), &hash).unwrap());
//! assert!(!compare_code("not-it", &hash).unwrap());
//! ```

pub mod code;
pub mod error;
pub mod hash;
pub mod types;

pub use code::{generate_code, generate_code_with, Code, DEFAULT_CODE_LENGTH, MAX_CODE_LENGTH};
pub use error::{CodeError, Result};
pub use hash::{compare_code, hash_code, CodeHash, HashConfig, DEFAULT_COST, MAX_COST, MIN_COST};
pub use types::{AuthCode, ChallengeId};
