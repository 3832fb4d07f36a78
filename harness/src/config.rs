//! Validator configuration: scratch location and rule-set settings.
//!
//! Configuration is a JSON file shaped like an `.eslintrc.json`:
//!
//! ```json
//! {
//!   "scratch_dir": "./tmp",
//!   "rules": {
//!     "rules": { "max-line-length": "warn", "no-invisible-characters": "off" },
//!     "max_line_length": 2048,
//!     "patterns": [
//!       { "id": "no-iframes", "pattern": "(?i)<iframe", "message": "Iframes are not allowed." }
//!     ]
//!   }
//! }
//! ```
//!
//! Every field is optional. `NFTLINT_SCRATCH_DIR` overrides `scratch_dir`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::rules::Severity;

/// Default scratch directory, relative to the working directory.
pub const DEFAULT_SCRATCH_DIR: &str = "./tmp";

/// Default `max-line-length` limit, in characters.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// Environment variable overriding [`ValidatorConfig::scratch_dir`].
pub const SCRATCH_DIR_ENV: &str = "NFTLINT_SCRATCH_DIR";

/// Configuration error (load, parse, or rule compilation).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {path}: {detail}")]
    Parse { path: String, detail: String },
    #[error("unknown rule: {id}")]
    UnknownRule { id: String },
    #[error("duplicate rule id: {id}")]
    DuplicateRule { id: String },
    #[error("invalid pattern for rule {id}: {detail}")]
    InvalidPattern { id: String, detail: String },
}

/// A user-defined regex rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRuleConfig {
    pub id: String,
    pub pattern: String,
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

/// Rule-set settings consumed by [`crate::rules::RuleSet::from_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSetConfig {
    /// Severity overrides for built-in rules, keyed by rule id.
    pub rules: BTreeMap<String, Severity>,
    pub max_line_length: usize,
    pub patterns: Vec<PatternRuleConfig>,
}

impl Default for RuleSetConfig {
    fn default() -> Self {
        Self {
            rules: BTreeMap::new(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            patterns: Vec::new(),
        }
    }
}

/// Top-level validator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub scratch_dir: PathBuf,
    pub rules: RuleSetConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            rules: RuleSetConfig::default(),
        }
    }
}

impl ValidatorConfig {
    /// Load from a JSON file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_json(&raw).map_err(|detail| ConfigError::Parse {
            path: path.display().to_string(),
            detail,
        })?;
        config.apply_env();
        Ok(config)
    }

    /// Defaults plus environment overrides; no file involved.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    }

    fn apply_env(&mut self) {
        if let Some(dir) = std::env::var_os(SCRATCH_DIR_ENV).filter(|v| !v.is_empty()) {
            self.scratch_dir = PathBuf::from(dir);
        }
    }
}
