//! # Vericode Store
//!
//! Storage abstraction for issued challenges. Provides a trait-based interface
//! for [`AuthCode`](vericode_core::AuthCode) persistence with SQLite and
//! in-memory implementations.
//!
//! ## Overview
//!
//! The store holds only code *hashes*, never plaintext codes. The challenge
//! service is written against the [`CodeStore`] trait; [`SqliteStore`] is the
//! persistent backend and [`MemoryStore`] is for tests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vericode_core::{AuthCode, CodeHash};
//! use vericode_store::{CodeStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("codes.db").unwrap();
//!
//!     let record = AuthCode::new("user-42", CodeHash::new("$2b$10$..."), 0, 600_000);
//!     store.insert(&record).await.unwrap();
//!
//!     let active = store.find_active("user-42", 1_000).await.unwrap();
//!     assert_eq!(active.map(|r| r.id), Some(record.id));
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Newest wins**: `find_active` returns the most recently created active record
//! - **Single use**: `mark_used` only succeeds once per record
//! - **Bounded checks**: `begin_attempt` reserves a check atomically against a ceiling
//! - **No expiry policy**: callers pass `now`; the store just compares timestamps

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{AttemptGrant, CodeStore};
