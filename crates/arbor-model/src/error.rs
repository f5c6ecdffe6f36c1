//! # Model Errors
//!
//! Error types for the foundational model crate. Literal conversion is the
//! only fallible operation defined here; the rest of the crate is interface
//! surface and infallible builders.

use thiserror::Error;

/// Error converting a raw text literal into a typed primitive value.
///
/// Literal errors are recoverable by contract: callers degrade to the
/// unconverted raw text and report a diagnostic instead of failing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    /// The literal does not parse as the declared primitive kind.
    #[error("literal '{text}' cannot be interpreted as a {kind}: {reason}")]
    Malformed {
        /// The raw literal as it appeared in the source tree.
        text: String,
        /// Name of the primitive kind the literal was declared as.
        kind: String,
        /// Parser-provided rejection detail.
        reason: String,
    },
}
