//! # Structural Diagnostics Channel
//!
//! Defines `Diagnostic`, the structured report for a type-checking problem
//! found while projecting a source tree, and `DiagnosticSink`, the single
//! pluggable notification point diagnostics are delivered through.
//!
//! A host chooses uniformly what the channel means: escalate (treat every
//! error-severity diagnostic as fatal) or record (collect diagnostics and
//! keep going). The projection engine's error-mode policy builds on this
//! channel; the channel itself carries no policy.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Severity of a structural diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Recoverable problem; projection continues.
    Warning,
    /// Type-checking failure; fatality depends on the active policy.
    Error,
}

/// A structured type-checking diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity of the problem.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Source location the problem was observed at, when known.
    pub location: Option<String>,
}

impl Diagnostic {
    /// A warning-severity diagnostic.
    pub fn warning(message: impl Into<String>, location: Option<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            location,
        }
    }

    /// An error-severity diagnostic.
    pub fn error(message: impl Into<String>, location: Option<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type checking the data: {}", self.message)?;
        if let Some(location) = &self.location {
            write!(f, " (at {location})")?;
        }
        Ok(())
    }
}

/// The pluggable notification point diagnostics are delivered through.
pub type DiagnosticSink = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

/// A sink that records every diagnostic into a shared vector.
///
/// Returns the sink together with the handle the recorded diagnostics can
/// be read from. This is the record-as-warning host strategy; tests use it
/// to assert on emitted diagnostics.
pub fn collecting_sink() -> (DiagnosticSink, Arc<Mutex<Vec<Diagnostic>>>) {
    let collected: Arc<Mutex<Vec<Diagnostic>>> = Arc::new(Mutex::new(Vec::new()));
    let handle = Arc::clone(&collected);
    let sink: DiagnosticSink = Arc::new(move |diagnostic: &Diagnostic| {
        collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic.clone());
    });
    (sink, handle)
}
