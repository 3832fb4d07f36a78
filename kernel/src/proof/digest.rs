//! Metadata digest: SHA-512 over the compact canonical encoding.
//!
//! This binds a descriptor's declared `metahash` to its `metadata` content.
//! It is the only integrity check the pipeline performs; `filehash` is
//! length-checked by the structural validator and never recomputed.

use sha2::{Digest, Sha512};

use super::canon::{canonical_json_bytes, CanonError};
use crate::reject::Rejection;

/// Length of a hex-encoded SHA-512 digest.
pub const DIGEST_HEX_LEN: usize = 128;

/// Lowercase hex SHA-512 of `data`.
#[must_use]
pub fn sha512_hex(data: &[u8]) -> String {
    hex::encode(Sha512::digest(data))
}

/// `hex(sha512(canonical_compact(metadata)))`.
///
/// # Errors
///
/// Returns [`CanonError`] if `metadata` cannot be canonicalized.
pub fn metadata_digest(metadata: &serde_json::Value) -> Result<String, CanonError> {
    let bytes = canonical_json_bytes(metadata)?;
    Ok(sha512_hex(&bytes))
}

/// Recompute the metadata digest and compare it to the declared `metahash`.
///
/// `declared` must already be normalized to lowercase; the structural
/// validator does that before this stage runs.
///
/// # Errors
///
/// - [`Rejection::integrity_mismatch`] when the digests differ
/// - [`Rejection::internal_failure`] when `metadata` cannot be canonicalized
pub fn verify_metahash(metadata: &serde_json::Value, declared: &str) -> Result<(), Rejection> {
    let computed = metadata_digest(metadata).map_err(|_| Rejection::internal_failure())?;
    if computed == declared {
        Ok(())
    } else {
        Err(Rejection::integrity_mismatch())
    }
}
