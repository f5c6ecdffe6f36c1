//! # Composable Assertions
//!
//! Defines the `Assertion` trait — a named, side-effect-free rule
//! evaluated against a sequence of typed nodes — together with the
//! composite `Schema` and the direct assertion kinds `Predicate`,
//! `Trace` and `Fixed`.
//!
//! Composite evaluation merges member results. Expected rule failures
//! are collected into the result, never raised; the only fatal path in
//! this crate is a configuration error during serialization.

use std::fmt;
use std::sync::Arc;

use serde_json::json;
use tracing::trace;

use arbor_overlay::TypedNode;

use crate::context::ValidationContext;
use crate::error::AssertionError;
use crate::result::{Finding, IssueSeverity, ValidationResult};

/// A named, side-effect-free validation rule.
pub trait Assertion: Send + Sync {
    /// Evaluate the rule against a sequence of typed nodes, merging all
    /// outcomes into one result.
    fn validate(&self, input: &[TypedNode], ctx: &ValidationContext) -> ValidationResult;

    /// Render the rule as structured configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::MissingIdentifier`] when a dereferenced
    /// rule has no identifier to render.
    fn to_json(&self) -> Result<serde_json::Value, AssertionError>;
}

/// A composite assertion: a named group of member assertions whose
/// results merge into one.
pub struct Schema {
    id: Option<String>,
    members: Vec<Arc<dyn Assertion>>,
}

impl Schema {
    /// An anonymous schema.
    pub fn new(members: Vec<Arc<dyn Assertion>>) -> Self {
        Self { id: None, members }
    }

    /// A schema identified by a URI.
    pub fn with_id(id: &str, members: Vec<Arc<dyn Assertion>>) -> Self {
        Self {
            id: Some(id.to_owned()),
            members,
        }
    }

    /// The schema's identifier, when it has one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Number of member assertions.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the schema has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Assertion for Schema {
    fn validate(&self, input: &[TypedNode], ctx: &ValidationContext) -> ValidationResult {
        // The guard keeps cyclic schema graphs terminating: a repeated
        // identical (schema, input) pair contributes nothing further.
        if !ctx.enter(self as *const Self as usize, input) {
            trace!(id = ?self.id, "skipping repeated evaluation");
            return ValidationResult::new();
        }

        let mut merged = ValidationResult::new();
        for member in &self.members {
            if ctx.is_cancelled() {
                break;
            }
            merged.absorb(member.validate(input, ctx));
        }
        merged
    }

    fn to_json(&self) -> Result<serde_json::Value, AssertionError> {
        let members = self
            .members
            .iter()
            .map(|m| m.to_json())
            .collect::<Result<Vec<_>, _>>()?;
        let mut rendered = serde_json::Map::new();
        if let Some(id) = &self.id {
            rendered.insert("id".to_owned(), json!(id));
        }
        rendered.insert("assertions".to_owned(), json!(members));
        Ok(serde_json::Value::Object(rendered))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.id)
            .field("members", &self.members.len())
            .finish()
    }
}

/// A direct predicate assertion: a named test over the input sequence
/// yielding a pass marker or one finding.
pub struct Predicate {
    name: String,
    message: String,
    severity: IssueSeverity,
    test: Box<dyn Fn(&[TypedNode]) -> bool + Send + Sync>,
}

impl Predicate {
    /// An error-severity predicate.
    pub fn new<F>(name: &str, message: &str, test: F) -> Self
    where
        F: Fn(&[TypedNode]) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.to_owned(),
            message: message.to_owned(),
            severity: IssueSeverity::Error,
            test: Box::new(test),
        }
    }

    /// Override the severity reported on failure.
    pub fn with_severity(mut self, severity: IssueSeverity) -> Self {
        self.severity = severity;
        self
    }
}

impl Assertion for Predicate {
    fn validate(&self, input: &[TypedNode], ctx: &ValidationContext) -> ValidationResult {
        if ctx.is_cancelled() {
            return ValidationResult::new();
        }
        if (self.test)(input) {
            ValidationResult::pass()
        } else {
            let location = input.first().map(|n| n.short_path().to_owned());
            ValidationResult::fail(Finding {
                severity: self.severity,
                message: self.message.clone(),
                location,
            })
        }
    }

    fn to_json(&self) -> Result<serde_json::Value, AssertionError> {
        Ok(json!({ "predicate": self.name }))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .finish()
    }
}

/// A tracing construct: reports the matched input sequence to the
/// context's trace sink and always passes.
#[derive(Debug, Clone)]
pub struct Trace {
    label: String,
}

impl Trace {
    /// A trace with the given label.
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_owned(),
        }
    }
}

impl Assertion for Trace {
    fn validate(&self, input: &[TypedNode], ctx: &ValidationContext) -> ValidationResult {
        ctx.trace(&self.label, input);
        ValidationResult::pass()
    }

    fn to_json(&self) -> Result<serde_json::Value, AssertionError> {
        Ok(json!({ "trace": self.label }))
    }
}

/// A constant-outcome assertion, for composition and tests.
#[derive(Debug, Clone)]
pub struct Fixed {
    outcome: Option<Finding>,
}

impl Fixed {
    /// Always passes.
    pub fn success() -> Self {
        Self { outcome: None }
    }

    /// Always reports the given finding.
    pub fn failure(message: &str, severity: IssueSeverity) -> Self {
        Self {
            outcome: Some(Finding {
                severity,
                message: message.to_owned(),
                location: None,
            }),
        }
    }
}

impl Assertion for Fixed {
    fn validate(&self, _input: &[TypedNode], _ctx: &ValidationContext) -> ValidationResult {
        match &self.outcome {
            None => ValidationResult::pass(),
            Some(finding) => ValidationResult::fail(finding.clone()),
        }
    }

    fn to_json(&self) -> Result<serde_json::Value, AssertionError> {
        Ok(json!({ "fixed": self.outcome.is_none() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_outcomes() {
        let ctx = ValidationContext::new();
        assert!(Fixed::success().validate(&[], &ctx).is_success());
        let failed = Fixed::failure("always wrong", IssueSeverity::Error).validate(&[], &ctx);
        assert!(!failed.is_success());
        assert_eq!(failed.findings().len(), 1);
    }

    #[test]
    fn test_predicate_over_empty_input() {
        let ctx = ValidationContext::new();
        let nonempty = Predicate::new("nonempty", "expected at least one node", |input| {
            !input.is_empty()
        });
        let result = nonempty.validate(&[], &ctx);
        assert!(!result.is_success());
        assert_eq!(result.findings()[0].location, None);
    }

    #[test]
    fn test_schema_merges_members() {
        let ctx = ValidationContext::new();
        let schema = Schema::new(vec![
            Arc::new(Fixed::success()),
            Arc::new(Fixed::failure("bad", IssueSeverity::Error)),
            Arc::new(Fixed::failure("meh", IssueSeverity::Warning)),
        ]);
        let result = schema.validate(&[], &ctx);
        assert_eq!(result.passes(), 1);
        assert_eq!(result.findings().len(), 2);
        assert!(!result.is_success());
    }

    #[test]
    fn test_schema_guard_skips_second_identical_evaluation() {
        let ctx = ValidationContext::new();
        let schema = Schema::new(vec![Arc::new(Fixed::success())]);
        assert_eq!(schema.validate(&[], &ctx).passes(), 1);
        assert_eq!(schema.validate(&[], &ctx).passes(), 0);
    }

    #[test]
    fn test_schema_to_json() {
        let schema = Schema::with_id(
            "http://example.org/schema/record",
            vec![Arc::new(Trace::new("entry")), Arc::new(Fixed::success())],
        );
        let rendered = schema.to_json().unwrap();
        assert_eq!(rendered["id"], "http://example.org/schema/record");
        assert_eq!(rendered["assertions"][0]["trace"], "entry");
        assert_eq!(rendered["assertions"][1]["fixed"], true);
    }
}
