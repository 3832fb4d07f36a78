//! nftlint harness: the validation pipeline around the kernel.
//!
//! The harness owns everything that touches the outside world: the scratch
//! directory, the rule engine and the orchestration that turns a parsed
//! document into a [`verdict::Verdict`]. Structural checks, canonical
//! encoding and hashing are delegated to `nftlint-kernel`.
//!
//! Entry point: [`pipeline::Validator::validate`].

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod pipeline;
pub mod rules;
pub mod sandbox;
pub mod scratch;
pub mod verdict;
