//! Proof module: canonical encoding and the metadata digest.
//!
//! Depends on `reject` only. `descriptor` depends on `proof`, never the reverse.

pub mod canon;
pub mod digest;
