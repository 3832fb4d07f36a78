//! Sandbox lint stage: materialize the descriptor on disk and lint it.
//!
//! # Steps
//!
//! ```text
//! canonical_json_pretty(descriptor) → ScratchDir::create_file()
//!   → RuleEngine::lint_file() → ScratchFile dropped (file removed)
//! ```
//!
//! The scratch file is held by a guard for the whole stage, so it is removed
//! before this function returns no matter which branch is taken.

use nftlint_kernel::descriptor::NormalizedDescriptor;
use nftlint_kernel::proof::canon::canonical_json_pretty;
use nftlint_kernel::reject::Rejection;

use crate::rules::{format_findings, RuleEngine};
use crate::scratch::ScratchDir;

/// Lint the pretty canonical form of `descriptor` from a scratch file.
///
/// Returns the pretty canonical text (the `linted` payload) when the rule
/// engine reports nothing.
///
/// # Errors
///
/// - [`Rejection::policy_violation`] if there is at least one finding
/// - [`Rejection::internal_failure`] on canonicalization, scratch I/O or
///   rule-engine failure
pub fn lint_in_sandbox(
    descriptor: &NormalizedDescriptor,
    scratch: &ScratchDir,
    engine: &dyn RuleEngine,
) -> Result<String, Rejection> {
    let content = canonical_json_pretty(descriptor.as_value()).map_err(|e| {
        tracing::error!(error = %e, "descriptor canonicalization failed");
        Rejection::internal_failure()
    })?;

    let file = scratch.create_file(content.as_bytes()).map_err(|e| {
        tracing::error!(error = %e, "scratch write failed");
        Rejection::internal_failure()
    })?;

    let findings = engine.lint_file(file.path()).map_err(|e| {
        tracing::error!(scratch = file.token(), error = %e, "rule engine failed");
        Rejection::internal_failure()
    })?;

    if !findings.is_empty() {
        tracing::warn!(
            scratch = file.token(),
            count = findings.len(),
            findings = %format_findings(&findings),
            "descriptor fails linting checks"
        );
        return Err(Rejection::policy_violation());
    }

    tracing::debug!(scratch = file.token(), "descriptor passed linting");
    Ok(content)
}
