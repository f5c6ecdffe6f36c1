//! # arbor-overlay — Typed Projection Engine
//!
//! Overlays structural type information onto a generic, untyped source
//! tree. Each node of the projected tree wraps one source node together
//! with its resolved concrete instance type, the element definition it
//! occupies, and a sibling-unique short path.
//!
//! ## Projection Model
//!
//! - **Demand-driven.** Children are projected only when the tree is
//!   walked; nothing is expanded eagerly, so arbitrarily large or
//!   streaming source trees stay cheap.
//! - **Polymorphism resolution.** Choice elements (name-suffix typed),
//!   contained self-describing entities, and type-attribute logical
//!   models are resolved per node by a fixed-priority decision table.
//! - **Policy-driven diagnostics.** Structural problems flow through the
//!   diagnostic sink; the [`ErrorMode`] policy decides between fatal
//!   escalation, dropping, and untyped passthrough.
//! - **Extension hooks.** Hosts attach [`StructuralRule`] annotations to
//!   the root source node for cross-sibling checks with carried state.
//!
//! ## Crate Policy
//!
//! - Depends only on `arbor-model` internally.
//! - Projected nodes are immutable and `Send + Sync`; the shared catalog
//!   handle must support concurrent lookups.
//! - No `unsafe` code, no `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod node;
pub mod policy;
pub mod rules;

mod resolve;

pub use error::OverlayError;
pub use node::{Children, TypedNode};
pub use policy::{ErrorMode, OverlaySettings};
pub use rules::{RuleState, StructuralRule};
