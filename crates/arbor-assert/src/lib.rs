//! # arbor-assert — Assertion & Validation Engine
//!
//! Evaluates a graph of composable assertions against sequences of typed
//! nodes produced by `arbor-overlay`, collecting every outcome into one
//! mergeable result.
//!
//! ## Evaluation Model
//!
//! - **Composable.** A [`Schema`] groups member assertions and merges
//!   their results; members can be direct predicates, tracing constructs,
//!   or references to other schemas.
//! - **Lazy dereferencing.** A [`ReferenceAssertion`] never touches its
//!   target at construction. The first validation resolves it exactly
//!   once — also under concurrent first use — and caches it, so cyclic
//!   schema graphs are well-formed inert structures. Termination during
//!   evaluation is enforced by the context's evaluation guard, which
//!   skips a repeated identical (schema, input) pair.
//! - **Failures are outcomes.** Expected rule failures land in the
//!   [`ValidationResult`]; nothing is raised for them. Fatal signaling is
//!   reserved for configuration errors in assertion construction and
//!   serialization.
//!
//! ## Concurrency
//!
//! Assertions are `Send + Sync`; independent validations over disjoint
//! node sequences may run concurrently. A cancellation flag, when
//! installed, is checked at each evaluation step and leaves
//! already-merged outcomes valid.
//!
//! ## Crate Policy
//!
//! - Depends on `arbor-model` and `arbor-overlay` internally.
//! - No `unsafe` code, no `panic!()` or `.unwrap()` outside tests.

pub mod assertion;
pub mod context;
pub mod deferred;
pub mod error;
pub mod reference;
pub mod result;

pub use assertion::{Assertion, Fixed, Predicate, Schema, Trace};
pub use context::{TraceSink, ValidationContext};
pub use deferred::Deferred;
pub use error::AssertionError;
pub use reference::ReferenceAssertion;
pub use result::{Finding, IssueSeverity, ValidationResult};

use arbor_overlay::TypedNode;

/// Validate a node sequence against an assertion.
///
/// Thin entry point over [`Assertion::validate`] for hosts that hold the
/// assertion behind a trait object.
pub fn validate(
    assertion: &dyn Assertion,
    input: &[TypedNode],
    ctx: &ValidationContext,
) -> ValidationResult {
    assertion.validate(input, ctx)
}
