//! End-to-end verdict lock tests.
//!
//! - Scenarios A-D: pass, bad filehash length, metahash mismatch, lint failure.
//! - Field-order precedence: the first failing check decides the message.
//! - Hash round-trip: an independently computed metahash always verifies.
//! - Normalization idempotence: mixed-case input and its normalized form agree.
//! - Golden fixture: the linted payload is pinned by digest.

use lock_tests::fixtures::{
    expected_metahash, golden_fixture_path, provider, valid_descriptor, validator,
};
use nftlint_harness::verdict::Verdict;
use nftlint_kernel::proof::canon::canonical_json_pretty;
use nftlint_kernel::proof::digest::sha512_hex;
use serde_json::{json, Value};
use sha2::{Digest, Sha512};

fn invalid(message: &str) -> Verdict {
    Verdict::Invalid {
        message: message.to_string(),
    }
}

// --- Scenarios ---

#[test]
fn scenario_a_pass_returns_pretty_canonical_form() {
    let dir = tempfile::tempdir().unwrap();
    let doc = valid_descriptor(&json!({"b": 2, "a": 1}));

    let verdict = validator(dir.path()).validate(doc.clone());

    let expected = canonical_json_pretty(&doc).unwrap();
    assert_eq!(verdict, Verdict::Valid { linted: expected });
    let linted = verdict.linted().unwrap();
    assert!(linted.find("\"a\": 1").unwrap() < linted.find("\"b\": 2").unwrap());
    assert!(linted.starts_with("{\n  \"filehash\": "));
}

#[test]
fn scenario_b_short_filehash() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = valid_descriptor(&json!({"a": 1, "b": 2}));
    doc["filehash"] = json!("f".repeat(64));

    let verdict = validator(dir.path()).validate(doc);
    assert_eq!(verdict, invalid("invalid filehash length"));
}

#[test]
fn scenario_c_metahash_off_by_one_char() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = valid_descriptor(&json!({"a": 1, "b": 2}));
    let mut metahash = doc["metahash"].as_str().unwrap().to_string();
    let last = if metahash.ends_with('0') { "1" } else { "0" };
    metahash.replace_range(127.., last);
    doc["metahash"] = json!(metahash);

    let verdict = validator(dir.path()).validate(doc);
    assert_eq!(verdict, invalid("invalid hash of metadata"));
}

#[test]
fn scenario_d_lint_failure() {
    let dir = tempfile::tempdir().unwrap();
    let flagged = [
        json!({"description": "<script>alert(1)</script>"}),
        json!({"link": "javascript:alert(1)"}),
        json!({"html": "<img src=x onerror=alert(1)>"}),
        json!({"name": "evil\u{202e}gpj.exe"}),
        json!({"__proto__": {"polluted": true}}),
    ];
    let v = validator(dir.path());
    for metadata in flagged {
        let verdict = v.validate(valid_descriptor(&metadata));
        assert_eq!(
            verdict,
            invalid("JSON fails linting checks"),
            "metadata {metadata} was not flagged"
        );
    }
}

#[test]
fn verdict_serializes_to_wire_shape() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());

    let ok = serde_json::to_value(v.validate(valid_descriptor(&json!({"a": 1})))).unwrap();
    assert_eq!(ok["valid"], json!(true));
    assert!(ok["linted"].is_string());
    assert_eq!(ok.as_object().unwrap().len(), 2);

    let bad = serde_json::to_value(v.validate(json!({}))).unwrap();
    assert_eq!(
        bad,
        json!({"valid": false, "message": "provider key not present"})
    );
}

// --- Field-order precedence ---

#[test]
fn provider_reported_before_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let verdict = validator(dir.path()).validate(json!({
        "filehash": "x",
        "standard": 7,
    }));
    assert_eq!(verdict, invalid("provider key not present"));
}

#[test]
fn each_check_masks_the_ones_after_it() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let base = valid_descriptor(&json!({"a": 1}));

    // Break every field, then repair them in check order.
    let mut doc = json!({"filehash": "x", "standard": 2, "metahash": "y"});
    let steps = [
        ("provider", json!("not-an-address"), "metadata key not present"),
        ("metadata", base["metadata"].clone(), "invalid filehash length"),
        ("filehash", base["filehash"].clone(), "invalid standard version"),
        ("standard", json!(1), "invalid metahash length"),
        ("metahash", base["metahash"].clone(), "invalid provider QRL address"),
        ("provider", base["provider"].clone(), ""),
    ];
    assert_eq!(v.validate(doc.clone()), invalid("provider key not present"));
    for (field, value, expected) in steps {
        doc[field] = value;
        let verdict = v.validate(doc.clone());
        if expected.is_empty() {
            assert!(verdict.is_valid(), "{verdict:?}");
        } else {
            assert_eq!(verdict, invalid(expected), "after repairing {field}");
        }
    }
}

#[test]
fn missing_filehash_is_a_length_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = valid_descriptor(&json!({"a": 1}));
    doc.as_object_mut().unwrap().remove("filehash");
    let verdict = validator(dir.path()).validate(doc);
    assert_eq!(verdict, invalid("invalid filehash length"));
}

#[test]
fn standard_must_be_numeric_one() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    for standard in [json!("1"), json!(2), json!(1.5), json!(true), Value::Null] {
        let mut doc = valid_descriptor(&json!({"a": 1}));
        doc["standard"] = standard.clone();
        assert_eq!(
            v.validate(doc),
            invalid("invalid standard version"),
            "standard = {standard}"
        );
    }
    let mut doc = valid_descriptor(&json!({"a": 1}));
    doc["standard"] = json!(1.0);
    assert!(v.validate(doc).is_valid());
}

#[test]
fn non_object_input_is_internal_failure() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    for input in [json!([]), json!("descriptor"), json!(42), Value::Null] {
        assert_eq!(v.validate(input), invalid("failed to parse JSON"));
    }
}

// --- Hash round-trip ---

#[test]
fn independently_computed_metahash_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let shapes = [
        json!({}),
        json!({"a": 1, "b": 2}),
        json!({"nested": {"z": [3, 2, 1], "a": {"y": null, "x": false}}}),
        json!({"unicode": "Ł ü 日本", "emoji": "🦀"}),
        json!({"numbers": [0, -1, 1.5, 1e21, 0.000_001, 9_007_199_254_740_992_u64]}),
        json!({"\u{e000}": 1, "\u{1f600}": 2}),
    ];
    for metadata in shapes {
        let verdict = v.validate(valid_descriptor(&metadata));
        assert!(verdict.is_valid(), "metadata {metadata}: {verdict:?}");
    }
}

#[test]
fn oversized_integer_hashes_as_a_javascript_producer_prints_it() {
    let dir = tempfile::tempdir().unwrap();
    let metadata = json!({"n": u64::MAX});
    let producer_text = br#"{"n":18446744073709552000}"#;
    let mut doc = valid_descriptor(&metadata);
    doc["metahash"] = json!(hex::encode(Sha512::digest(producer_text)));
    assert_eq!(doc["metahash"], json!(expected_metahash(&metadata)));

    let verdict = validator(dir.path()).validate(doc);
    let linted = verdict.linted().expect("producer hash verifies");
    assert!(linted.contains("\"n\": 18446744073709552000"));
}

#[test]
fn uppercase_metahash_verifies_after_normalization() {
    let dir = tempfile::tempdir().unwrap();
    let metadata = json!({"a": 1});
    let mut doc = valid_descriptor(&metadata);
    doc["metahash"] = json!(expected_metahash(&metadata).to_uppercase());
    assert!(validator(dir.path()).validate(doc).is_valid());
}

// --- Normalization idempotence ---

#[test]
fn normalized_and_mixed_case_forms_agree() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let metadata = json!({"title": "x"});
    let mixed = json!({
        "provider": provider(9).to_uppercase(),
        "metadata": metadata,
        "filehash": "AbCdEf".repeat(21) + "AB",
        "metahash": expected_metahash(&metadata).to_uppercase(),
        "standard": 1,
    });

    let first = v.validate(mixed);
    let linted = first.linted().expect("mixed-case descriptor passes").to_string();
    let normalized: Value = serde_json::from_str(&linted).unwrap();
    assert_eq!(normalized["provider"], json!(provider(9)));
    assert_eq!(normalized["filehash"], json!("abcdef".repeat(21) + "ab"));

    let second = v.validate(normalized);
    assert_eq!(first, second);
}

#[test]
fn failing_verdict_is_stable_under_normalization() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let metadata = json!({"a": "<script>"});
    let mut mixed = valid_descriptor(&metadata);
    mixed["provider"] = json!(provider(3).to_uppercase());
    let mut lower = valid_descriptor(&metadata);
    lower["provider"] = json!(provider(3));
    assert_eq!(v.validate(mixed), v.validate(lower));
}

// --- Golden fixture ---

#[test]
fn golden_descriptor_linted_digest() {
    let dir = tempfile::tempdir().unwrap();
    let fixture: Value =
        serde_json::from_str(&std::fs::read_to_string(golden_fixture_path()).unwrap()).unwrap();

    let verdict = validator(dir.path()).validate(fixture["descriptor"].clone());

    let linted = verdict.linted().expect("golden descriptor is valid");
    assert!(linted.contains("\"extra\": {\n    },"));
    assert!(linted.contains("\"tags\": [\n    ]\n"));
    assert_eq!(
        sha512_hex(linted.as_bytes()),
        fixture["expected_linted_sha512"].as_str().unwrap()
    );
}
