//! # Severity Taxonomy & Failure Types
//!
//! Defines the three-level [`Severity`] ordering, the [`Violation`] type
//! raised by rule checks, and [`EngineError`] for failures that abort
//! processing (unreadable files, malformed XML, bad rule configuration).
//!
//! ## Failure Taxonomy
//!
//! - **Fatal**: [`EngineError::Io`] / [`EngineError::Parse`] — the schema or
//!   feed cannot be loaded; the run terminates.
//! - **Configuration**: [`EngineError::UnknownOption`] — an option names an
//!   attribute the rule does not declare; only that rule's registration is
//!   aborted.
//! - **Validation**: a [`Violation`] at one of three severities, always
//!   captured at the dispatch boundary and recorded in the aggregate counts.
//!
//! Every violation carries an explicit severity tag plus a message and an
//! optional log of line-attributed entries; no class-hierarchy introspection
//! is needed to classify it.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// The severity of a validation failure.
///
/// Strictly ordered: `Info < Warning < Error`. Every violation belongs to
/// exactly one severity, determined by the failure raised, not by rule
/// identity — the same rule may raise different severities under different
/// conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Advisory; the feed is usable as-is.
    Info,
    /// Best practice not followed; consumers may degrade.
    Warning,
    /// The feed violates a hard requirement.
    Error,
}

impl Severity {
    /// All severities, least to most severe.
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warning, Severity::Error];

    /// Human-readable name used in report lines.
    pub fn description(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }

    /// Index into per-severity arrays. `Info` is 0, `Error` is 2.
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Info => 0,
            Self::Warning => 1,
            Self::Error => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "invalid severity \"{other}\"; options are error, warning, or info"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorLogEntry & Violation
// ---------------------------------------------------------------------------

/// A single line-attributed message inside a violation's error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLogEntry {
    /// Source line in the feed file, when known.
    pub line: Option<u32>,
    /// What went wrong at that line.
    pub message: String,
}

impl ErrorLogEntry {
    /// Create a log entry.
    pub fn new(line: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A validation failure raised by a rule check.
///
/// Carries zero, one, or many [`ErrorLogEntry`] items. A violation with an
/// empty log counts as one occurrence and its own message is the sole text
/// reported; otherwise each log entry counts as one occurrence.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct Violation {
    severity: Severity,
    message: String,
    error_log: Vec<ErrorLogEntry>,
}

impl Violation {
    /// Create a violation at the given severity with an empty log.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            error_log: Vec::new(),
        }
    }

    /// Create an `Info` violation.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Create a `Warning` violation.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create an `Error` violation.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Attach a log of line-attributed entries.
    pub fn with_log(mut self, log: Vec<ErrorLogEntry>) -> Self {
        self.error_log = log;
        self
    }

    /// The severity tag.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The top-level message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The attached log entries.
    pub fn error_log(&self) -> &[ErrorLogEntry] {
        &self.error_log
    }

    /// How many occurrences this violation contributes to the aggregate
    /// counts: the number of log entries, or one if the log is empty.
    pub fn occurrence_count(&self) -> usize {
        self.error_log.len().max(1)
    }
}

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Failures that abort processing rather than degrade to a logged count.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A feed or schema file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A feed or schema file could not be parsed as XML.
    #[error("XML file could not be parsed: {path}: {source}")]
    Parse {
        path: String,
        source: roxmltree::Error,
    },

    /// A rule option names an attribute the rule does not declare.
    #[error("rule {rule} has no option named \"{option}\"")]
    UnknownOption { rule: String, option: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_strictly_ordered() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("Error".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!(" warning ".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("INFO".parse::<Severity>().unwrap(), Severity::Info);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn violation_without_log_counts_once() {
        let v = Violation::error("boom");
        assert_eq!(v.occurrence_count(), 1);
        assert_eq!(v.to_string(), "boom");
    }

    #[test]
    fn violation_with_log_counts_entries() {
        let v = Violation::warning("dates invalid").with_log(vec![
            ErrorLogEntry::new(Some(3), "start in past"),
            ErrorLogEntry::new(None, "end before start"),
        ]);
        assert_eq!(v.occurrence_count(), 2);
        assert_eq!(v.severity(), Severity::Warning);
    }

    #[test]
    fn unknown_option_names_rule_and_option() {
        let e = EngineError::UnknownOption {
            rule: "GpUnitOcdId".into(),
            option: "no_such".into(),
        };
        let text = e.to_string();
        assert!(text.contains("GpUnitOcdId"));
        assert!(text.contains("no_such"));
    }
}
