//! nftlint kernel: the pure, I/O-free core of descriptor validation.
//!
//! # API Surface
//!
//! - [`proof::canon`]: canonical JSON encoding (compact for hashing, pretty
//!   for output and the on-disk lint input)
//! - [`proof::digest`]: SHA-512 metadata digest and `metahash` verification
//! - [`descriptor::validate_structure`]: ordered field checks plus
//!   normalization of a raw descriptor
//! - [`descriptor::address`]: hex-form QRL address validation
//!
//! # Module Dependency Direction
//!
//! `reject` ← `proof` ← `descriptor`
//!
//! One-way only. No cycles. Nothing here touches the filesystem; the
//! sandboxed lint stage lives in `nftlint-harness`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod descriptor;
pub mod proof;
pub mod reject;
