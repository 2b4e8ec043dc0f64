//! # Vericode Testkit
//!
//! Testing utilities for Vericode.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known bcrypt hashes from other implementations that must keep verifying
//! - **Generators**: Proptest strategies for codes, subjects and malformed hashes
//! - **Fixtures**: A ready challenge service over in-memory storage and delivery
//!
//! ## Golden Vectors
//!
//! ```rust
//! use vericode_testkit::vectors::verify_all_vectors;
//!
//! assert!(verify_all_vectors().is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use vericode_testkit::generators::code;
//!
//! proptest! {
//!     #[test]
//!     fn codes_are_digits(c in code()) {
//!         prop_assert!(c.as_str().bytes().all(|b| b.is_ascii_digit()));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! # async fn run() {
//! use vericode_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let (_challenge, code) = fixture.issue("user-1").await;
//! assert!(fixture.service.verify_at("user-1", code.as_str(), 1).await.unwrap().is_verified());
//! # }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{fast_config, wrong_code, TestFixture};
pub use generators::{code, code_length, distinct_codes, malformed_hash, subject};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
