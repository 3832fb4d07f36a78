//! Canonical encoding lock tests.
//!
//! - Key order of the input never changes the bytes.
//! - Repeated encoding of one value is byte-identical.
//! - Pretty and compact forms agree on key order.
//! - Producers that insert keys in a different order still pass the hash check.

use lock_tests::fixtures::{expected_metahash, valid_descriptor, validator};
use nftlint_kernel::proof::canon::{canonical_json_bytes, canonical_json_pretty};
use serde_json::{json, Value};

fn reordered_pair() -> (Value, Value) {
    let a: Value = serde_json::from_str(
        r#"{"z":{"y":[1,{"b":2,"a":1}],"x":null},"a":"first","m":{"k2":true,"k1":false}}"#,
    )
    .unwrap();
    let b: Value = serde_json::from_str(
        r#"{"m":{"k1":false,"k2":true},"a":"first","z":{"x":null,"y":[1,{"a":1,"b":2}]}}"#,
    )
    .unwrap();
    (a, b)
}

#[test]
fn key_order_does_not_change_bytes() {
    let (a, b) = reordered_pair();
    assert_eq!(
        canonical_json_bytes(&a).unwrap(),
        canonical_json_bytes(&b).unwrap()
    );
    assert_eq!(
        canonical_json_pretty(&a).unwrap(),
        canonical_json_pretty(&b).unwrap()
    );
}

#[test]
fn compact_form_is_pinned() {
    let (a, _) = reordered_pair();
    assert_eq!(
        String::from_utf8(canonical_json_bytes(&a).unwrap()).unwrap(),
        r#"{"a":"first","m":{"k1":false,"k2":true},"z":{"x":null,"y":[1,{"a":1,"b":2}]}}"#
    );
}

#[test]
fn repeated_encoding_n10() {
    let (a, _) = reordered_pair();
    let first = canonical_json_bytes(&a).unwrap();
    for i in 1..=10 {
        assert_eq!(canonical_json_bytes(&a).unwrap(), first, "run {i} diverged");
    }
}

#[test]
fn pretty_preserves_compact_order() {
    let (a, _) = reordered_pair();
    let pretty = canonical_json_pretty(&a).unwrap();
    let reparsed: Value = serde_json::from_str(&pretty).unwrap();
    assert_eq!(
        canonical_json_bytes(&reparsed).unwrap(),
        canonical_json_bytes(&a).unwrap()
    );
    let keys: Vec<usize> = ["\"a\"", "\"m\"", "\"z\""]
        .iter()
        .map(|k| pretty.find(k).unwrap())
        .collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn reordered_metadata_passes_same_hash_check() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let (a, b) = reordered_pair();
    assert_eq!(expected_metahash(&a), expected_metahash(&b));

    // Hash declared for `a`, metadata submitted in `b`'s order.
    let mut doc = valid_descriptor(&a);
    doc["metadata"] = b;
    let verdict = v.validate(doc);
    assert!(verdict.is_valid(), "{verdict:?}");
}

#[test]
fn value_change_changes_hash() {
    let a = json!({"a": 1});
    let b = json!({"a": 2});
    assert_ne!(expected_metahash(&a), expected_metahash(&b));
}
