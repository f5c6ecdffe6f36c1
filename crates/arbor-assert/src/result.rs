//! # Validation Results
//!
//! Defines `Finding`, one reported validation outcome with severity and
//! location, and `ValidationResult`, the accumulating collection results
//! are merged into.
//!
//! Merging is associative and commutative over the multiset of reported
//! items — pass counters add and findings accumulate; ordering exists for
//! display only. Validation failures are first-class outcomes, never
//! errors: a result with error-severity findings is an unsuccessful
//! validation, not a failed call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a reported finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueSeverity {
    /// Informational note; never affects success.
    Information,
    /// Suspicious but tolerated; never affects success.
    Warning,
    /// Validation failure; the result is unsuccessful.
    Error,
}

/// A single reported validation outcome.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Finding {
    /// Severity of the finding.
    pub severity: IssueSeverity,
    /// Human-readable description of what failed.
    pub message: String,
    /// Short path or location of the node the finding is about.
    pub location: Option<String>,
}

impl Finding {
    /// An error-severity finding.
    pub fn error(message: impl Into<String>, location: Option<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            message: message.into(),
            location,
        }
    }

    /// A warning-severity finding.
    pub fn warning(message: impl Into<String>, location: Option<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            message: message.into(),
            location,
        }
    }

    /// An information-severity finding.
    pub fn information(message: impl Into<String>, location: Option<String>) -> Self {
        Self {
            severity: IssueSeverity::Information,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            IssueSeverity::Information => "info",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Error => "error",
        };
        match &self.location {
            Some(location) => write!(f, "  {location}: {severity}: {}", self.message),
            None => write!(f, "  (root): {severity}: {}", self.message),
        }
    }
}

/// Accumulating, mergeable collection of validation outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    passes: usize,
    findings: Vec<Finding>,
}

impl ValidationResult {
    /// An empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// A result with a single pass marker.
    pub fn pass() -> Self {
        Self {
            passes: 1,
            findings: Vec::new(),
        }
    }

    /// A result with a single finding.
    pub fn fail(finding: Finding) -> Self {
        Self {
            passes: 0,
            findings: vec![finding],
        }
    }

    /// Record one more pass marker.
    pub fn mark_pass(&mut self) {
        self.passes += 1;
    }

    /// Record a finding.
    pub fn record(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Merge another result into this one.
    pub fn absorb(&mut self, other: ValidationResult) {
        self.passes += other.passes;
        self.findings.extend(other.findings);
    }

    /// Merge two results, consuming both.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.absorb(other);
        self
    }

    /// Whether the validation succeeded: no error-severity findings.
    pub fn is_success(&self) -> bool {
        self.findings
            .iter()
            .all(|f| f.severity != IssueSeverity::Error)
    }

    /// Number of recorded pass markers.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// All recorded findings, in report order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Consumes self and returns the recorded findings.
    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }

    /// The outcome multiset, sorted for order-insensitive comparison.
    pub fn outcome_multiset(&self) -> (usize, Vec<Finding>) {
        let mut findings = self.findings.clone();
        findings.sort();
        (self.passes, findings)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.findings.is_empty() {
            return write!(f, "valid ({} passed)", self.passes);
        }
        for (i, finding) in self.findings.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{finding}")?;
        }
        Ok(())
    }
}
