//! Golden test vectors for hash compatibility.
//!
//! Hashes produced elsewhere (other bcrypt implementations, older cost
//! settings, the `$2a$` prefix) must keep verifying, since stored challenge
//! hashes outlive configuration changes.

use vericode_core::{compare_code, CodeHash};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Candidate passed to compare.
    pub candidate: &'static str,
    /// Stored hash in modular-crypt form.
    pub hash: &'static str,
    /// Expected comparison result.
    pub expected: bool,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "openwall U*U at cost 5",
            candidate: "U*U",
            hash: "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW",
            expected: true,
        },
        GoldenVector {
            name: "openwall empty key at cost 5",
            candidate: "",
            hash: "$2a$05$CCCCCCCCCCCCCCCCCCCCC.7uG0VCzI2bS7j6ymqJi9CdcdxiRTWNy",
            expected: true,
        },
        GoldenVector {
            name: "extra character rejected",
            candidate: "U*U*",
            hash: "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW",
            expected: false,
        },
        GoldenVector {
            name: "numeric candidate against empty-key hash",
            candidate: "123456",
            hash: "$2a$05$CCCCCCCCCCCCCCCCCCCCC.7uG0VCzI2bS7j6ymqJi9CdcdxiRTWNy",
            expected: false,
        },
        GoldenVector {
            name: "truncated hash",
            candidate: "U*U",
            hash: "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOe",
            expected: false,
        },
        GoldenVector {
            name: "unknown prefix",
            candidate: "U*U",
            hash: "$3a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW",
            expected: false,
        },
    ]
}

/// Check every vector. Returns the names of vectors that did not match.
pub fn verify_all_vectors() -> Vec<&'static str> {
    all_vectors()
        .into_iter()
        .filter(|v| {
            let got = compare_code(v.candidate, &CodeHash::new(v.hash));
            !matches!(got, Ok(matched) if matched == v.expected)
        })
        .map(|v| v.name)
        .collect()
}
