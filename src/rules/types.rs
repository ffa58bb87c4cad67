//! Type definitions for the heuristic rule system.
//!
//! This module defines the core types used throughout the rule engine:
//! - [`Severity`] - Finding severity levels (Info, Warning, Error)
//! - [`RuleCategory`] - Rule categories
//! - [`RuleInfo`] - Static rule metadata
//! - [`Finding`] - A single diagnostic produced by a rule

use serde::Serialize;

/// Severity level of a finding.
///
/// Ordered from lowest to highest severity for sorting purposes.
/// Exit codes are determined by the highest severity finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    /// Informational suggestion, does not affect exit code
    Info,
    /// Warning that may indicate a problem (exit code 1)
    Warning,
    /// Critical issue that must be addressed (exit code 2)
    Error
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR")
        }
    }
}

/// Parse severity string to enum.
///
/// # Arguments
///
/// * `s` - Severity name from configuration, case-insensitive (`info`,
///   `warning` or `warn`, `error`)
///
/// # Returns
///
/// `None` for unknown names.
///
/// # Example
///
/// ```
/// use sql_advisor::rules::{Severity, parse_severity};
///
/// assert_eq!(parse_severity("WARN"), Some(Severity::Warning));
/// assert_eq!(parse_severity("fatal"), None);
/// ```
pub fn parse_severity(s: &str) -> Option<Severity> {
    match s.to_lowercase().as_str() {
        "error" => Some(Severity::Error),
        "warning" | "warn" => Some(Severity::Warning),
        "info" => Some(Severity::Info),
        _ => None
    }
}

/// Category of a rule for grouping and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleCategory {
    /// Rules that detect potential performance issues
    Performance,
    /// Rules that enforce coding style and best practices
    Style,
    /// Rules that identify dangerous operations
    Security,
    /// Rules that catch statements returning something other than intended
    Correctness
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Performance => write!(f, "Performance"),
            Self::Style => write!(f, "Style"),
            Self::Security => write!(f, "Security"),
            Self::Correctness => write!(f, "Correctness")
        }
    }
}

/// Metadata about a rule for identification and configuration.
#[derive(Debug, Clone, Serialize)]
pub struct RuleInfo {
    /// Unique rule identifier (e.g., "COL.001")
    pub id:       &'static str,
    /// One-line description of the anti-pattern
    pub summary:  &'static str,
    /// Default severity level
    pub severity: Severity,
    /// Rule category
    pub category: RuleCategory,
    /// Statement the rule reports on
    pub case:     &'static str
}

/// A single diagnostic produced by a rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    /// Identifier of the rule that produced the finding
    pub rule_id:  &'static str,
    pub summary:  &'static str,
    /// Human-readable explanation with a suggested fix
    pub message:  String,
    pub severity: Severity,
    pub category: RuleCategory,
    /// Offending clause, column or fragment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail:   Option<String>,
    /// Byte offset of the offending token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>
}

impl Finding {
    /// Finding carrying the rule's own metadata.
    ///
    /// # Arguments
    ///
    /// * `info` - Metadata of the reporting rule; id, summary, severity and
    ///   category are copied from it
    /// * `message` - Explanation shown to the user
    pub fn new(info: &RuleInfo, message: impl Into<String>) -> Self {
        Self {
            rule_id:  info.id,
            summary:  info.summary,
            message:  message.into(),
            severity: info.severity,
            category: info.category,
            detail:   None,
            position: None
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}
