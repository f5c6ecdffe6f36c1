//! # Structural Extension Hooks
//!
//! Defines `StructuralRule`, a named cross-sibling callback hosts attach
//! as annotations on the root source node. During child enumeration every
//! registered rule is invoked with each candidate child, the current node,
//! and the rule's private state carried forward from its previous
//! invocation in the same sibling sequence.
//!
//! Rules never suppress or alter the yielded children; they exist for
//! side-effecting cross-sibling structural checks such as slice ordering.
//! State is threaded as an explicit fold over the sibling sequence — one
//! accumulator slot per rule, scoped to a single enumeration and never
//! shared across concurrent enumerations. Returning `None` clears the
//! carried state.

use std::any::Any;
use std::fmt;

use crate::node::TypedNode;

/// Rule-private state carried across one sibling enumeration.
pub type RuleState = Box<dyn Any + Send>;

type RuleCheck =
    dyn Fn(&TypedNode, &TypedNode, Option<RuleState>) -> Option<RuleState> + Send + Sync;

/// A named cross-sibling structural check.
pub struct StructuralRule {
    name: String,
    check: Box<RuleCheck>,
}

impl StructuralRule {
    /// A rule with a name and a check callback.
    ///
    /// The callback receives the candidate child about to be yielded, the
    /// node whose children are being enumerated, and the state it returned
    /// from its previous invocation in this sibling sequence.
    pub fn new<F>(name: &str, check: F) -> Self
    where
        F: Fn(&TypedNode, &TypedNode, Option<RuleState>) -> Option<RuleState>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.to_owned(),
            check: Box::new(check),
        }
    }

    /// The rule's name, for diagnostics emitted by the rule itself.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn run(
        &self,
        child: &TypedNode,
        current: &TypedNode,
        state: Option<RuleState>,
    ) -> Option<RuleState> {
        (self.check)(child, current, state)
    }
}

impl fmt::Debug for StructuralRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralRule")
            .field("name", &self.name)
            .finish()
    }
}
