//! # Projection Errors
//!
//! Fatal errors raised by the typed projection engine. Configuration
//! errors are fatal regardless of policy; `Typing` wraps a structural
//! diagnostic escalated to fatal under the strict policy.

use arbor_model::Diagnostic;
use thiserror::Error;

/// Fatal error during projection.
#[derive(Error, Debug)]
pub enum OverlayError {
    /// No explicit root type was given and the source carries no
    /// intrinsic type indicator.
    #[error("cannot determine the type of the root element at '{location}', please supply a type argument")]
    MissingRootType {
        /// Location of the root source node.
        location: String,
    },

    /// The root type name is not known to the catalog.
    #[error("cannot locate type information for type '{type_name}'")]
    UnknownRootType {
        /// The unresolvable type name.
        type_name: String,
    },

    /// The resolved root type is abstract. Always fatal, under every policy.
    #[error("the type of a node must be a concrete type, '{type_name}' is abstract")]
    AbstractRootType {
        /// Name of the abstract type.
        type_name: String,
    },

    /// A structural diagnostic escalated to fatal under the strict policy.
    #[error("{0}")]
    Typing(Diagnostic),
}
