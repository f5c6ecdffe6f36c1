//! # Reference Assertions
//!
//! `ReferenceAssertion` points at another assertion graph by URI without
//! touching it at construction time. The target is dereferenced on first
//! validation (or explicit [`resolve`](ReferenceAssertion::resolve)) and
//! cached, so self- and mutually-referential schema graphs exist as
//! inert, well-formed structures. Resolving a reference only pulls in its
//! own target — anything that target references stays unresolved until it
//! is itself first needed.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use arbor_overlay::TypedNode;

use crate::assertion::{Assertion, Schema};
use crate::context::ValidationContext;
use crate::deferred::Deferred;
use crate::error::AssertionError;
use crate::result::ValidationResult;

/// A lazily dereferenced pointer to another assertion graph.
#[derive(Debug)]
pub struct ReferenceAssertion {
    target: Deferred<Arc<Schema>>,
    uri: Option<String>,
}

impl ReferenceAssertion {
    /// A reference that will dereference through `resolver` on first use.
    pub fn new<F>(resolver: F) -> Self
    where
        F: FnOnce() -> Arc<Schema> + Send + 'static,
    {
        Self {
            target: Deferred::new(resolver),
            uri: None,
        }
    }

    /// A reference to an already-resolved schema.
    pub fn direct(schema: Arc<Schema>) -> Self {
        Self {
            target: Deferred::resolved(schema),
            uri: None,
        }
    }

    /// Attach the URI the reference was written with. Takes precedence
    /// over the resolved target's identifier when rendering.
    pub fn with_uri(mut self, uri: &str) -> Self {
        self.uri = Some(uri.to_owned());
        self
    }

    /// Dereference the target, resolving it on first call and returning
    /// the cached schema afterwards.
    pub fn resolve(&self) -> Arc<Schema> {
        if !self.target.is_resolved() {
            debug!(uri = ?self.uri, "dereferencing schema reference");
        }
        self.target.get()
    }

    /// The identifier this reference renders as: the externally supplied
    /// URI when present, otherwise the resolved target's identifier.
    /// Forces resolution in the latter case.
    pub fn referenced_uri(&self) -> Option<String> {
        self.uri
            .clone()
            .or_else(|| self.resolve().id().map(str::to_owned))
    }
}

impl Assertion for ReferenceAssertion {
    fn validate(&self, input: &[TypedNode], ctx: &ValidationContext) -> ValidationResult {
        if ctx.is_cancelled() {
            return ValidationResult::new();
        }
        self.resolve().validate(input, ctx)
    }

    fn to_json(&self) -> Result<serde_json::Value, AssertionError> {
        let uri = self
            .referenced_uri()
            .ok_or(AssertionError::MissingIdentifier)?;
        Ok(json!({ "$ref": uri }))
    }
}
