//! Pipeline orchestrator: the single entry point from parsed JSON to verdict.
//!
//! # Pipeline
//!
//! ```text
//! Structural: validate_structure()      (kernel, no I/O)
//!   → HashCheck: verify_metahash()      (kernel, no I/O)
//!   → Sandboxed: lint_in_sandbox()      (scratch file + rule engine)
//!   → Done(valid)
//! ```
//!
//! Any stage may end the run with `Done(invalid, reason)`. Nothing is retried.
//! Each call is independent; the only state shared between concurrent calls
//! is the scratch directory's namespace.
//!
//! The orchestrator contains panics: a panic in any stage (including a
//! caller-supplied address validator or rule engine) becomes an
//! `InternalFailure` verdict, and the scratch guard still removes its file
//! while unwinding.

use std::panic::{catch_unwind, AssertUnwindSafe};

use nftlint_kernel::descriptor::address::{AddressValidator, QrlHexAddress};
use nftlint_kernel::descriptor::validate_structure;
use nftlint_kernel::proof::digest::verify_metahash;
use nftlint_kernel::reject::Rejection;

use crate::config::{ConfigError, ValidatorConfig};
use crate::rules::{RuleEngine, RuleSet};
use crate::sandbox::lint_in_sandbox;
use crate::scratch::ScratchDir;
use crate::verdict::Verdict;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Structural,
    HashCheck,
    Sandboxed,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::HashCheck => "hash_check",
            Self::Sandboxed => "sandboxed",
        }
    }
}

/// Injected collaborators for a [`Validator`].
pub struct ValidatorDeps {
    pub addresses: Box<dyn AddressValidator>,
    pub engine: Box<dyn RuleEngine>,
    pub scratch: ScratchDir,
}

/// Stateless descriptor validator. Share it behind an `Arc` across tasks.
pub struct Validator {
    deps: ValidatorDeps,
}

impl Validator {
    #[must_use]
    pub fn new(deps: ValidatorDeps) -> Self {
        Self { deps }
    }

    /// Build the default stack: QRL hex addresses plus the configured rule set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the rule set does not compile.
    pub fn from_config(config: &ValidatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(ValidatorDeps {
            addresses: Box::new(QrlHexAddress),
            engine: Box::new(RuleSet::from_config(&config.rules)?),
            scratch: ScratchDir::new(&config.scratch_dir),
        }))
    }

    /// Where the sandbox stage writes its lint input.
    #[must_use]
    pub fn scratch(&self) -> &ScratchDir {
        &self.deps.scratch
    }

    /// Validate a parsed descriptor and produce the public verdict.
    ///
    /// Never panics and never returns internal error detail; the specific
    /// rejection kind is logged instead.
    pub fn validate(&self, input: serde_json::Value) -> Verdict {
        let result = match catch_unwind(AssertUnwindSafe(|| self.run(input))) {
            Ok(result) => result,
            Err(payload) => {
                tracing::error!(panic = panic_message(&*payload), "validation panicked");
                Err(Rejection::internal_failure())
            }
        };
        match &result {
            Ok(_) => tracing::info!("descriptor accepted"),
            Err(rejection) => tracing::info!(
                kind = %rejection.kind(),
                reason = rejection.message(),
                "descriptor rejected"
            ),
        }
        Verdict::from(result)
    }

    /// Run the stages and return the typed result.
    ///
    /// Unlike [`Validator::validate`], panics propagate.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] of the first failing stage.
    pub fn run(&self, input: serde_json::Value) -> Result<String, Rejection> {
        let descriptor = staged(Stage::Structural, || {
            validate_structure(input, self.deps.addresses.as_ref())
        })?;
        staged(Stage::HashCheck, || {
            verify_metahash(descriptor.metadata(), descriptor.metahash())
        })?;
        staged(Stage::Sandboxed, || {
            lint_in_sandbox(&descriptor, &self.deps.scratch, self.deps.engine.as_ref())
        })
    }
}

fn staged<T>(stage: Stage, f: impl FnOnce() -> Result<T, Rejection>) -> Result<T, Rejection> {
    tracing::debug!(stage = stage.as_str(), "enter stage");
    let result = f();
    if let Err(rejection) = &result {
        tracing::debug!(stage = stage.as_str(), kind = %rejection.kind(), "stage failed");
    }
    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
