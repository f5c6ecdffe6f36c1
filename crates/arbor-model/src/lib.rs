//! # arbor-model — Foundational Interfaces for the Arbor Stack
//!
//! This crate is the bedrock of the Arbor stack. It defines the external
//! contracts the typed projection engine consumes — the untyped source
//! tree and the type catalog — together with the primitive value model
//! and the structural diagnostics channel. Every other crate in the
//! workspace depends on `arbor-model`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Interfaces, not parsers.** `SourceNode` describes an
//!    already-parsed document tree; no document syntax is consumed
//!    anywhere in this workspace. `TreeNode` is an in-memory reference
//!    implementation, not a parser.
//!
//! 2. **Read-only collaborators.** Source trees and type catalogs are
//!    owned by the caller and never mutated by the core. Catalog lookups
//!    must be safe under concurrent use.
//!
//! 3. **Closed primitive table.** `PrimitiveKind::of` is the single
//!    decision table from type names to primitive kinds. Conversion
//!    failures are recoverable by contract — callers degrade to raw text.
//!
//! 4. **One notification channel.** Structural diagnostics flow through
//!    `DiagnosticSink` so a host can choose escalate-to-fatal or
//!    collect-as-warning uniformly.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `arbor-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Public model types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize` where the data is serializable.

pub mod catalog;
pub mod diagnostic;
pub mod error;
pub mod primitive;
pub mod source;

// Re-export primary types for ergonomic imports.
pub use catalog::{
    ElementDefinition, MemoryCatalog, Representation, TypeCatalog, TypeDefinition, TypeRef,
};
pub use diagnostic::{collecting_sink, Diagnostic, DiagnosticSink, Severity};
pub use error::LiteralError;
pub use primitive::{parse_literal, PrimitiveKind, Value};
pub use source::{
    annotations_of, name_matches, Annotation, RichTextFragment, SourceChildren, SourceNode,
    SourceRef, TreeNode,
};
