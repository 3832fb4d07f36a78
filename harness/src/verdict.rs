//! Pipeline output.
//!
//! Serializes to exactly one of:
//!
//! ```text
//! {"valid": true,  "linted":  "<canonical pretty JSON>"}
//! {"valid": false, "message": "<reason>"}
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};

use nftlint_kernel::reject::Rejection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid { linted: String },
    Invalid { message: String },
}

impl Verdict {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// The rejection message, if invalid.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid { message } => Some(message),
        }
    }

    /// The linted payload, if valid.
    #[must_use]
    pub fn linted(&self) -> Option<&str> {
        match self {
            Self::Valid { linted } => Some(linted),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<Result<String, Rejection>> for Verdict {
    fn from(result: Result<String, Rejection>) -> Self {
        match result {
            Ok(linted) => Self::Valid { linted },
            Err(rejection) => Self::Invalid {
                message: rejection.message().to_string(),
            },
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            Self::Valid { linted } => {
                map.serialize_entry("valid", &true)?;
                map.serialize_entry("linted", linted)?;
            }
            Self::Invalid { message } => {
                map.serialize_entry("valid", &false)?;
                map.serialize_entry("message", message)?;
            }
        }
        map.end()
    }
}
