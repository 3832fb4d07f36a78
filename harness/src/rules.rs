//! Content rule engine: static checks over the text of a serialized descriptor.
//!
//! The pipeline talks to a [`RuleEngine`] only. [`RuleSet`] is the default
//! implementation: a table of built-in rules plus any custom regex rules from
//! [`RuleSetConfig`], each with a configurable [`Severity`].
//!
//! Rules run line by line over the file content. Every match yields one
//! [`Finding`] with a 1-based line and column.

use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, RuleSetConfig};

/// Rule severity, as written in a rule-set config (`"off" | "warn" | "error"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Off,
    Warn,
    #[default]
    Error,
}

/// One rule-engine report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    pub message: String,
}

/// Rule engine failure (distinct from findings).
#[derive(Debug, thiserror::Error)]
pub enum RuleEngineError {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A pluggable static checker over a file's textual content.
pub trait RuleEngine: Send + Sync {
    /// Lint already-loaded text.
    ///
    /// # Errors
    ///
    /// Implementations return [`RuleEngineError`] when they cannot run.
    fn lint_text(&self, content: &str) -> Result<Vec<Finding>, RuleEngineError>;

    /// Lint the file at `path`. The default reads it as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`RuleEngineError::Read`] if the file cannot be read.
    fn lint_file(&self, path: &Path) -> Result<Vec<Finding>, RuleEngineError> {
        let content = std::fs::read_to_string(path).map_err(|source| RuleEngineError::Read {
            path: path.display().to_string(),
            source,
        })?;
        self.lint_text(&content)
    }
}

#[derive(Debug, Clone, Copy)]
enum BuiltinKind {
    Pattern(&'static str),
    Chars(fn(char) -> bool),
    MaxLineLength,
}

#[derive(Debug, Clone, Copy)]
struct BuiltinRule {
    id: &'static str,
    message: &'static str,
    kind: BuiltinKind,
}

/// Built-in rules. All default to [`Severity::Error`].
///
/// Patterns with a capture group report the group's position instead of the
/// whole match.
const BUILTIN_RULES: &[BuiltinRule] = &[
    BuiltinRule {
        id: "no-script-tags",
        message: "Script tags are not allowed.",
        kind: BuiltinKind::Pattern(r"(?i)<\s*/?\s*script\b"),
    },
    BuiltinRule {
        id: "no-javascript-urls",
        message: "Script URLs are not allowed.",
        kind: BuiltinKind::Pattern(r"(?i)\b(?:java|vb)script\s*:|\bdata\s*:\s*text/html"),
    },
    BuiltinRule {
        id: "no-event-handlers",
        message: "HTML event handler attributes are not allowed.",
        kind: BuiltinKind::Pattern(
            r"(?i)\bon(?:abort|animation[a-z]*|blur|change|click|contextmenu|dblclick|error|focus[a-z]*|input|key(?:down|press|up)|load|mouse[a-z]+|pointer[a-z]+|reset|resize|scroll|select|submit|toggle|transition[a-z]*|unload|wheel)\s*=",
        ),
    },
    BuiltinRule {
        id: "no-bidi-characters",
        message: "Bidirectional control characters are not allowed.",
        kind: BuiltinKind::Chars(is_bidi_control),
    },
    BuiltinRule {
        id: "no-invisible-characters",
        message: "Invisible formatting characters are not allowed.",
        kind: BuiltinKind::Chars(is_invisible),
    },
    BuiltinRule {
        id: "no-prototype-keys",
        message: "Prototype-polluting keys are not allowed.",
        kind: BuiltinKind::Pattern(r#"^\s*("(?:__proto__|constructor)")\s*:"#),
    },
    BuiltinRule {
        id: "no-escaped-control-characters",
        message: "Escaped control characters are not allowed.",
        kind: BuiltinKind::Pattern(r"\\u00[01][0-9a-fA-F]"),
    },
    BuiltinRule {
        id: "max-line-length",
        message: "Line exceeds the maximum allowed length.",
        kind: BuiltinKind::MaxLineLength,
    },
];

fn is_bidi_control(c: char) -> bool {
    matches!(c, '\u{202a}'..='\u{202e}' | '\u{2066}'..='\u{2069}')
}

fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200b}'..='\u{200f}' | '\u{2060}' | '\u{feff}')
}

/// Ids of every built-in rule, in evaluation order.
#[must_use]
pub fn builtin_rule_ids() -> Vec<&'static str> {
    BUILTIN_RULES.iter().map(|r| r.id).collect()
}

#[derive(Debug)]
enum Matcher {
    Regex(Regex),
    Chars(fn(char) -> bool),
    MaxLineLength(usize),
}

#[derive(Debug)]
struct CompiledRule {
    id: String,
    severity: Severity,
    message: String,
    matcher: Matcher,
}

/// The default [`RuleEngine`]: built-in rules plus configured patterns.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Build a rule set with every built-in rule at its default severity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] only if a built-in pattern fails to compile.
    pub fn recommended() -> Result<Self, ConfigError> {
        Self::from_config(&RuleSetConfig::default())
    }

    /// Compile a rule set from configuration.
    ///
    /// Rules set to [`Severity::Off`] are dropped.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownRule`] if `rules` names a rule that does not exist
    /// - [`ConfigError::DuplicateRule`] if a custom pattern reuses an id
    /// - [`ConfigError::InvalidPattern`] if a regex fails to compile
    pub fn from_config(config: &RuleSetConfig) -> Result<Self, ConfigError> {
        let known: BTreeSet<&str> = BUILTIN_RULES.iter().map(|r| r.id).collect();
        if let Some(unknown) = config.rules.keys().find(|id| !known.contains(id.as_str())) {
            return Err(ConfigError::UnknownRule { id: unknown.clone() });
        }

        let mut rules = Vec::with_capacity(BUILTIN_RULES.len() + config.patterns.len());
        for builtin in BUILTIN_RULES {
            let severity = config.rules.get(builtin.id).copied().unwrap_or_default();
            if severity == Severity::Off {
                continue;
            }
            let matcher = match builtin.kind {
                BuiltinKind::Pattern(p) => Matcher::Regex(compile(builtin.id, p)?),
                BuiltinKind::Chars(f) => Matcher::Chars(f),
                BuiltinKind::MaxLineLength => Matcher::MaxLineLength(config.max_line_length),
            };
            rules.push(CompiledRule {
                id: builtin.id.to_string(),
                severity,
                message: builtin.message.to_string(),
                matcher,
            });
        }

        let mut custom_ids = BTreeSet::new();
        for pattern in &config.patterns {
            if known.contains(pattern.id.as_str()) || !custom_ids.insert(pattern.id.as_str()) {
                return Err(ConfigError::DuplicateRule {
                    id: pattern.id.clone(),
                });
            }
            if pattern.severity == Severity::Off {
                continue;
            }
            rules.push(CompiledRule {
                id: pattern.id.clone(),
                severity: pattern.severity,
                message: pattern.message.clone(),
                matcher: Matcher::Regex(compile(&pattern.id, &pattern.pattern)?),
            });
        }

        Ok(Self { rules })
    }

    /// Ids of the active (non-`off`) rules.
    #[must_use]
    pub fn active_rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id.as_str()).collect()
    }
}

fn compile(id: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        id: id.to_string(),
        detail: e.to_string(),
    })
}

impl RuleEngine for RuleSet {
    fn lint_text(&self, content: &str) -> Result<Vec<Finding>, RuleEngineError> {
        let mut findings = Vec::new();
        for (index, line) in content.lines().enumerate() {
            for rule in &self.rules {
                for column in rule.matcher.columns(line) {
                    findings.push(Finding {
                        rule_id: rule.id.clone(),
                        severity: rule.severity,
                        line: index + 1,
                        column,
                        message: rule.message.clone(),
                    });
                }
            }
        }
        Ok(findings)
    }
}

impl Matcher {
    /// 1-based character columns where this matcher fires on `line`.
    fn columns(&self, line: &str) -> Vec<usize> {
        match self {
            Self::Regex(re) => re
                .captures_iter(line)
                .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
                .map(|m| char_column(line, m.start()))
                .collect(),
            Self::Chars(pred) => line
                .chars()
                .enumerate()
                .filter(|(_, c)| pred(*c))
                .map(|(i, _)| i + 1)
                .collect(),
            Self::MaxLineLength(max) => {
                if line.chars().count() > *max {
                    vec![max + 1]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

fn char_column(line: &str, byte_offset: usize) -> usize {
    line[..byte_offset].chars().count() + 1
}

/// Render findings as `L<line>:<col> <message>` entries for logs.
///
/// A trailing `.` on each message is dropped.
#[must_use]
pub fn format_findings(findings: &[Finding]) -> String {
    findings
        .iter()
        .map(|f| {
            let message = f.message.strip_suffix('.').unwrap_or(&f.message);
            format!("L{}:{} {message}", f.line, f.column)
        })
        .collect::<Vec<_>>()
        .join("; ")
}
