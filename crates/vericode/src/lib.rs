//! # Vericode
//!
//! The unified API for one-time numeric verification codes, as used for
//! email/SMS second-factor login.
//!
//! ## Overview
//!
//! - **Codes**: fixed-width numeric secrets from the OS CSPRNG
//! - **Hashes**: salted bcrypt, self-describing, cost configurable
//! - **Store**: persists hashes with expiry, attempt count and single-use flag
//! - **Delivery**: hands the plaintext code to an email/SMS channel
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vericode::{ChallengeService, Recipient, VericodeConfig, VerifyOutcome};
//! use vericode::delivery::memory::Outbox;
//! use vericode::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("codes.db").unwrap();
//!     let service = ChallengeService::new(store, Outbox::new(), VericodeConfig::default()).unwrap();
//!
//!     // After the password check succeeds:
//!     let recipient = Recipient::new("alice@example.com", "Alice");
//!     service.issue("user-42", &recipient).await.unwrap();
//!
//!     // When the user submits the code:
//!     match service.verify("user-42", "123456").await.unwrap() {
//!         VerifyOutcome::Verified { .. } => { /* log the user in */ }
//!         VerifyOutcome::Mismatch { .. } => { /* "incorrect code" */ }
//!         VerifyOutcome::Locked { .. } | VerifyOutcome::NotFound => { /* "invalid or expired" */ }
//!     }
//! }
//! ```
//!
//! Without the surrounding flow, the three primitive operations are on
//! [`VerificationCode`]:
//!
//! ```rust
//! # async fn run() {
//! use vericode::VerificationCode;
//!
//! let codes = VerificationCode::default();
//! let code = codes.generate(6).unwrap();
//! let hash = codes.hash(&code).await.unwrap();
//! assert!(codes.compare(code.as_str(), &hash).await.unwrap());
//! # }
//! ```
//!
//! ## Re-exports
//!
//! - `vericode::core` - Code, CodeHash, HashConfig, AuthCode
//! - `vericode::store` - CodeStore, SqliteStore, MemoryStore

pub mod challenge;
pub mod codes;
pub mod config;
pub mod delivery;
pub mod error;

// Re-export component crates
pub use vericode_core as core;
pub use vericode_store as store;

// Re-export main types for convenience
pub use challenge::{Challenge, ChallengeService, VerifyOutcome};
pub use codes::VerificationCode;
pub use config::VericodeConfig;
pub use delivery::{CodeDelivery, CodeMessage, Recipient};
pub use error::{ChallengeError, ConfigError, DeliveryError, Result};

// Re-export commonly used core types
pub use vericode_core::{AuthCode, ChallengeId, Code, CodeHash, HashConfig};
