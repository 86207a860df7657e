use compvault_index::{BlindIndexBuilder, IndexKey, Normalization};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

fn builder(seed: u8) -> BlindIndexBuilder {
    BlindIndexBuilder::new(IndexKey::from_bytes(&[seed; 32]).unwrap())
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn same_key_bytes_reproduce_tokens() {
    // Stands in for a process restart: two builders from the same key bytes.
    let a = builder(9).build_index("subject", "urn:uuid:1234").unwrap();
    let b = builder(9).build_index("subject", "urn:uuid:1234").unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_keys_give_unrelated_tokens() {
    let a = builder(1).build_index("subject", "urn:uuid:1234").unwrap();
    let b = builder(2).build_index("subject", "urn:uuid:1234").unwrap();
    assert_ne!(a, b);
}

#[test]
fn token_does_not_contain_plaintext() {
    let token = builder(3).build_index("email", "alice@example.org").unwrap();
    assert!(!token.as_str().contains("alice"));
}

#[test]
fn case_sensitive_policy_distinguishes_case() {
    let strict = builder(4).with_normalization(Normalization {
        trim: true,
        case_fold: false,
    });
    assert_ne!(
        strict.build_index("code", "ABC").unwrap(),
        strict.build_index("code", "abc").unwrap()
    );
}

#[test]
fn build_all_partitions_and_skips_missing() {
    let mut source = HashMap::new();
    source.insert("identifier".to_string(), vec!["MRN-1".to_string()]);
    source.insert(
        "Observation.code".to_string(),
        vec!["loinc|1234-5".to_string(), "LOINC|1234-5".to_string(), " ".to_string()],
    );

    let b = builder(5);
    let set = b
        .build_all(
            &names(&["identifier"]),
            &names(&["Observation.code", "title"]),
            &source,
        )
        .unwrap();

    let id = set.attribute("identifier").unwrap();
    assert_eq!(id.unique_tokens, vec![b.build_index("identifier", "MRN-1").unwrap()]);
    assert!(id.non_unique_tokens.is_empty());

    // Case-folded duplicates collapse, blank values are skipped.
    let code = set.attribute("Observation.code").unwrap();
    assert_eq!(code.non_unique_tokens.len(), 1);

    assert!(set.attribute("title").is_none());
    assert_eq!(set.token_count(), 2);
}

#[test]
fn corpus_has_no_collisions() {
    let b = builder(6);
    let mut seen = HashSet::new();
    for attr in ["identifier", "subject", "author", "title", "Observation.code"] {
        for i in 0..400 {
            let token = b.build_index(attr, &format!("value-{i}")).unwrap();
            assert!(seen.insert(token), "collision for {attr}/{i}");
        }
    }
    assert_eq!(seen.len(), 2000);
}

proptest! {
    #[test]
    fn distinct_pairs_never_collide(
        n1 in "[a-z][a-z0-9.]{0,11}",
        v1 in "[a-z0-9|:-]{0,24}",
        n2 in "[a-z][a-z0-9.]{0,11}",
        v2 in "[a-z0-9|:-]{0,24}",
    ) {
        prop_assume!((n1.as_str(), v1.as_str()) != (n2.as_str(), v2.as_str()));
        let b = builder(7);
        prop_assert_ne!(b.build_index(&n1, &v1).unwrap(), b.build_index(&n2, &v2).unwrap());
    }

    #[test]
    fn repeated_calls_agree(name in "[a-zA-Z][a-zA-Z0-9]{0,11}", value in ".{0,32}") {
        let b = builder(8);
        prop_assert_eq!(
            b.build_index(&name, &value).unwrap(),
            b.build_index(&name, &value).unwrap()
        );
    }
}
