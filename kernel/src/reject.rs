//! Rejection taxonomy shared by every pipeline stage.
//!
//! A [`Rejection`] carries a machine-readable [`RejectKind`] for logs and a
//! fixed public message for the verdict. Internal detail (I/O errors, panic
//! payloads) never goes into the message.

use std::borrow::Cow;
use std::fmt;

/// Public message used for every [`RejectKind::InternalFailure`].
pub const INTERNAL_FAILURE_MESSAGE: &str = "failed to parse JSON";

/// Why a descriptor was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectKind {
    /// `provider` or `metadata` absent.
    MissingField,
    /// `filehash` or `metahash` has the wrong length (or is absent).
    InvalidLength,
    /// `standard` is not 1.
    InvalidVersion,
    /// `provider` is not a valid hex-form QRL address.
    InvalidAddress,
    /// `metahash` does not match the digest of `metadata`.
    IntegrityMismatch,
    /// The rule engine reported one or more findings.
    PolicyViolation,
    /// I/O error, rule-engine error, caught panic or malformed input.
    InternalFailure,
}

impl RejectKind {
    /// Stable snake-case label, used as a structured log field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidLength => "invalid_length",
            Self::InvalidVersion => "invalid_version",
            Self::InvalidAddress => "invalid_address",
            Self::IntegrityMismatch => "integrity_mismatch",
            Self::PolicyViolation => "policy_violation",
            Self::InternalFailure => "internal_failure",
        }
    }
}

impl fmt::Display for RejectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal pipeline failure: kind plus the exact caller-visible message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Rejection {
    kind: RejectKind,
    message: Cow<'static, str>,
}

impl Rejection {
    #[must_use]
    pub fn missing_field(field: Field) -> Self {
        Self {
            kind: RejectKind::MissingField,
            message: Cow::Owned(format!("{} key not present", field.key())),
        }
    }

    #[must_use]
    pub fn invalid_length(field: Field) -> Self {
        Self {
            kind: RejectKind::InvalidLength,
            message: Cow::Owned(format!("invalid {} length", field.key())),
        }
    }

    #[must_use]
    pub fn invalid_version() -> Self {
        Self {
            kind: RejectKind::InvalidVersion,
            message: Cow::Borrowed("invalid standard version"),
        }
    }

    #[must_use]
    pub fn invalid_address() -> Self {
        Self {
            kind: RejectKind::InvalidAddress,
            message: Cow::Borrowed("invalid provider QRL address"),
        }
    }

    #[must_use]
    pub fn integrity_mismatch() -> Self {
        Self {
            kind: RejectKind::IntegrityMismatch,
            message: Cow::Borrowed("invalid hash of metadata"),
        }
    }

    #[must_use]
    pub fn policy_violation() -> Self {
        Self {
            kind: RejectKind::PolicyViolation,
            message: Cow::Borrowed("JSON fails linting checks"),
        }
    }

    #[must_use]
    pub fn internal_failure() -> Self {
        Self {
            kind: RejectKind::InternalFailure,
            message: Cow::Borrowed(INTERNAL_FAILURE_MESSAGE),
        }
    }

    #[must_use]
    pub fn kind(&self) -> RejectKind {
        self.kind
    }

    /// The caller-visible message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Required descriptor keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Provider,
    Metadata,
    Filehash,
    Metahash,
    Standard,
}

impl Field {
    /// The JSON key name.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Metadata => "metadata",
            Self::Filehash => "filehash",
            Self::Metahash => "metahash",
            Self::Standard => "standard",
        }
    }
}
