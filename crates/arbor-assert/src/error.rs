//! # Assertion Errors
//!
//! Configuration errors in assertion construction and serialization.
//! Expected rule failures are never errors — they are collected into the
//! validation result.

use thiserror::Error;

/// Fatal configuration error in the assertion engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssertionError {
    /// A reference assertion was rendered as configuration, but neither
    /// an external URI nor a target identifier is available.
    #[error("cannot render as configuration: reference points at a schema without an identifier")]
    MissingIdentifier,
}
