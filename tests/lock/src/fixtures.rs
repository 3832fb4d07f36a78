//! Descriptor builders and fixture loading.
//!
//! Metahashes here are computed with `sha2` directly over the compact
//! canonical form, not through the kernel's digest helper, so the lock tests
//! check the kernel against an independent computation.

use std::path::{Path, PathBuf};

use nftlint_harness::config::ValidatorConfig;
use nftlint_harness::pipeline::Validator;
use nftlint_kernel::descriptor::address::derive_hex_address;
use nftlint_kernel::proof::canon::canonical_json_bytes;
use serde_json::{json, Value};
use sha2::{Digest, Sha512};

/// SHAKE-128, XMSS height 12.
pub const PROVIDER_DESCRIPTOR: [u8; 3] = [0x01, 0x06, 0x00];

/// # Panics
///
/// Panics if the crate is not two levels below the workspace root.
#[must_use]
pub fn workspace_root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
}

#[must_use]
pub fn golden_fixture_path() -> PathBuf {
    workspace_root().join("tests/fixtures/descriptor_golden.json")
}

/// A valid provider address for the given public key seed.
#[must_use]
pub fn provider(seed: u8) -> String {
    derive_hex_address(PROVIDER_DESCRIPTOR, &[seed; 64])
}

/// Lowercase hex SHA-512 of the compact canonical form of `metadata`.
///
/// # Panics
///
/// Panics if `metadata` contains a non-finite number.
#[must_use]
pub fn expected_metahash(metadata: &Value) -> String {
    let bytes = canonical_json_bytes(metadata).expect("finite metadata");
    hex::encode(Sha512::digest(&bytes))
}

/// A descriptor that passes every stage with the built-in rule set.
#[must_use]
pub fn valid_descriptor(metadata: &Value) -> Value {
    json!({
        "provider": provider(3),
        "metadata": metadata,
        "filehash": "f".repeat(128),
        "metahash": expected_metahash(metadata),
        "standard": 1,
    })
}

/// Validator with default rules writing into `scratch`.
///
/// # Panics
///
/// Panics if the default rule set fails to compile.
#[must_use]
pub fn validator(scratch: &Path) -> Validator {
    Validator::from_config(&ValidatorConfig {
        scratch_dir: scratch.to_path_buf(),
        ..ValidatorConfig::default()
    })
    .expect("default rule set compiles")
}

/// Number of entries left in `dir` (0 if it was never created).
#[must_use]
pub fn leftover_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map_or(0, Iterator::count)
}
