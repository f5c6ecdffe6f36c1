//! # Error-Mode Policy
//!
//! Defines `ErrorMode`, the policy governing how structural type problems
//! behave during projection, and `OverlaySettings`, the construction-time
//! bundle carrying the policy and the diagnostic sink.
//!
//! The policy applies uniformly across the projection engine:
//!
//! | Policy | Missing/ambiguous type | Unknown element | Untyped subtree |
//! |---|---|---|---|
//! | `Strict` | fatal | fatal | fatal |
//! | `Lenient` | diagnostic, node untyped | diagnostic, element dropped | no children |
//! | `Passthrough` | diagnostic, node untyped | diagnostic, element kept untyped | children untyped, no rule evaluation |

use std::fmt;

use arbor_model::DiagnosticSink;
use serde::{Deserialize, Serialize};

/// How structural type problems behave during projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorMode {
    /// Every structural diagnostic escalates to a fatal error.
    Strict,
    /// Diagnostics are recorded; elements that cannot be typed are
    /// dropped from enumeration.
    #[default]
    Lenient,
    /// Diagnostics are recorded; elements that cannot be typed are kept,
    /// untyped, and no further structural rules run for them.
    Passthrough,
}

/// Construction-time settings for a projection.
#[derive(Clone, Default)]
pub struct OverlaySettings {
    /// The active error-mode policy.
    pub error_mode: ErrorMode,
    /// Where structural diagnostics are delivered. With no sink installed
    /// diagnostics are silently discarded under the non-strict policies.
    pub sink: Option<DiagnosticSink>,
}

impl OverlaySettings {
    /// Settings with the given policy and no sink.
    pub fn new(error_mode: ErrorMode) -> Self {
        Self {
            error_mode,
            sink: None,
        }
    }

    /// Install a diagnostic sink.
    pub fn with_sink(mut self, sink: DiagnosticSink) -> Self {
        self.sink = Some(sink);
        self
    }
}

impl fmt::Debug for OverlaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlaySettings")
            .field("error_mode", &self.error_mode)
            .field("sink", &self.sink.as_ref().map(|_| "installed"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_model::collecting_sink;

    #[test]
    fn test_default_mode_is_lenient() {
        assert_eq!(ErrorMode::default(), ErrorMode::Lenient);
        assert_eq!(OverlaySettings::default().error_mode, ErrorMode::Lenient);
    }

    #[test]
    fn test_with_sink_installs() {
        let (sink, _) = collecting_sink();
        let settings = OverlaySettings::new(ErrorMode::Strict).with_sink(sink);
        assert!(settings.sink.is_some());
        assert_eq!(settings.error_mode, ErrorMode::Strict);
    }

    #[test]
    fn test_error_mode_serde() {
        let json = serde_json::to_string(&ErrorMode::Passthrough).unwrap();
        let back: ErrorMode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorMode::Passthrough);
    }
}
