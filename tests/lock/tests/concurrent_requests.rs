//! Concurrency lock tests: one shared validator, many threads, one scratch dir.
//!
//! Requests share nothing but the scratch namespace, so verdicts must match
//! the single-threaded ones and the directory must end up empty.

use std::sync::{Arc, Barrier};
use std::thread;

use lock_tests::fixtures::{leftover_files, valid_descriptor, validator};
use nftlint_harness::pipeline::Validator;
use nftlint_harness::verdict::Verdict;
use serde_json::{json, Value};

const THREADS: usize = 16;
const ROUNDS: usize = 20;

fn workload() -> Vec<Value> {
    let mut short = valid_descriptor(&json!({"i": 2}));
    short["filehash"] = json!("f".repeat(64));
    vec![
        valid_descriptor(&json!({"i": 0, "name": "plain"})),
        valid_descriptor(&json!({"i": 1, "html": "<script>x</script>"})),
        short,
        json!({"metadata": {}}),
    ]
}

#[test]
fn shared_validator_matches_sequential_verdicts() {
    let dir = tempfile::tempdir().unwrap();
    let v = Arc::new(validator(dir.path()));
    let docs = Arc::new(workload());
    let expected: Arc<Vec<Verdict>> =
        Arc::new(docs.iter().map(|d| v.validate(d.clone())).collect());
    assert!(expected[0].is_valid());
    assert!(!expected[1].is_valid());

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let v: Arc<Validator> = Arc::clone(&v);
            let docs = Arc::clone(&docs);
            let expected = Arc::clone(&expected);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    let i = (t + round) % docs.len();
                    let verdict = v.validate(docs[i].clone());
                    assert_eq!(verdict, expected[i], "thread {t} round {round}");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    assert_eq!(leftover_files(dir.path()), 0);
}

#[test]
fn validator_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Validator>();
}
