//! Shared helpers for nftlint benchmark suites.

use nftlint_kernel::descriptor::address::derive_hex_address;
use nftlint_kernel::proof::digest::metadata_digest;
use serde_json::{json, Map, Value};

/// Metadata with `attributes` trait entries, shaped like a typical NFT.
#[must_use]
pub fn synthetic_metadata(attributes: usize) -> Value {
    let traits: Vec<Value> = (0..attributes)
        .map(|i| {
            json!({
                "value": format!("value-{i}"),
                "trait_type": format!("trait-{i}"),
                "rarity": f64::from(u32::try_from(i % 7).unwrap_or(0)) / 7.0,
            })
        })
        .collect();
    let mut extra = Map::new();
    for i in (0..attributes).rev() {
        extra.insert(format!("k{i:04}"), json!(i));
    }
    json!({
        "name": "Benchmark piece",
        "description": "Synthetic metadata for benchmarking",
        "image": "ipfs://bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi",
        "attributes": traits,
        "extra": extra,
    })
}

/// A descriptor that passes every stage with the built-in rule set.
///
/// # Panics
///
/// Panics if `metadata` cannot be canonicalized. Benchmark setup failures are fatal.
#[must_use]
pub fn valid_descriptor(metadata: &Value) -> Value {
    json!({
        "provider": derive_hex_address([0x01, 0x06, 0x00], &[42u8; 64]),
        "metadata": metadata,
        "filehash": "f".repeat(128),
        "metahash": metadata_digest(metadata).expect("finite metadata"),
        "standard": 1,
    })
}

/// Attribute counts used by size-parameterized groups.
pub const SIZES: &[usize] = &[1, 16, 256];
