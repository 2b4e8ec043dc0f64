//! Proptest generators for property-based testing.

use proptest::prelude::*;

use vericode_core::Code;

/// Generate a code width in the commonly used range.
pub fn code_length() -> impl Strategy<Value = usize> {
    1usize..=10
}

/// Generate a well-formed code (non-zero leading digit, up to 10 digits).
pub fn code() -> impl Strategy<Value = Code> {
    "[1-9][0-9]{0,9}".prop_map(|s| Code::parse(s).expect("regex yields digits"))
}

/// Generate two different codes.
pub fn distinct_codes() -> impl Strategy<Value = (Code, Code)> {
    (code(), code()).prop_filter("codes must differ", |(a, b)| a != b)
}

/// Generate a subject identifier.
pub fn subject() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,31}".prop_map(String::from)
}

/// Generate a stored-hash string that cannot parse as bcrypt.
///
/// Either contains no `$` separators at all, or has a valid-looking prefix
/// and cost with a body too short to hold salt and digest.
pub fn malformed_hash() -> impl Strategy<Value = String> {
    prop_oneof![
        "[^$]{0,80}".prop_map(String::from),
        "\\$2[abxy]\\$[0-3][0-9]\\$[./A-Za-z0-9]{0,52}".prop_map(String::from),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use vericode_core::{
        compare_code, generate_code, hash_code, AuthCode, CodeHash, HashConfig, MIN_COST,
    };
    use vericode_store::{CodeStore, MemoryStore};

    const FAST: HashConfig = HashConfig::new(MIN_COST);

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn test_generate_width(length in code_length()) {
            let code = generate_code(length).unwrap();
            prop_assert_eq!(code.len(), length);
            prop_assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
            if length > 1 {
                prop_assert_ne!(code.as_str().as_bytes()[0], b'0');
            }
        }

        #[test]
        fn test_hash_twice_differs_and_both_verify(c in code()) {
            let h1 = hash_code(&c, &FAST).unwrap();
            let h2 = hash_code(&c, &FAST).unwrap();

            prop_assert_ne!(&h1, &h2);
            prop_assert!(compare_code(c.as_str(), &h1).unwrap());
            prop_assert!(compare_code(c.as_str(), &h2).unwrap());
        }

        #[test]
        fn test_distinct_codes_do_not_compare(pair in distinct_codes()) {
            let (a, b) = pair;
            let hash = hash_code(&a, &FAST).unwrap();
            prop_assert!(!compare_code(b.as_str(), &hash).unwrap());
        }

        #[test]
        fn test_active_lookup_is_per_subject(a in subject(), b in subject()) {
            prop_assume!(a != b);
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let store = MemoryStore::new();
                let record = AuthCode::new(a.clone(), CodeHash::new("$2b$04$x"), 0, 600_000);
                store.insert(&record).await.unwrap();

                let found = store.find_active(&a, 1).await.unwrap();
                prop_assert_eq!(found.map(|r| r.id), Some(record.id));
                prop_assert!(store.find_active(&b, 1).await.unwrap().is_none());

                prop_assert_eq!(store.invalidate_active(&b, 1).await.unwrap(), 0);
                prop_assert_eq!(store.invalidate_active(&a, 1).await.unwrap(), 1);
                Ok(())
            })?;
        }

        #[test]
        fn test_malformed_hash_is_false(candidate in "[0-9]{1,10}", bad in malformed_hash()) {
            let result = compare_code(&candidate, &CodeHash::new(bad));
            prop_assert!(matches!(result, Ok(false)));
        }
    }
}
