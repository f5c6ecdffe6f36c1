//! # Validation Context
//!
//! Per-run state threaded through every assertion evaluation: the
//! optional trace sink, the optional cancellation flag, and the
//! evaluation guard that keeps cyclic schema graphs terminating.
//!
//! ## Evaluation Guard
//!
//! A schema graph may reference itself, directly or transitively. Cached
//! lazy dereferencing makes such a graph a well-formed inert structure;
//! termination during evaluation comes from the guard: an identical
//! (schema identity, node-sequence fingerprint) pair is never evaluated
//! twice within one context, so a cycle contributes nothing on its
//! second visit instead of recursing forever.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arbor_overlay::TypedNode;

/// Sink invoked with (label, matched node sequence) by tracing constructs.
pub type TraceSink = Arc<dyn Fn(&str, &[TypedNode]) + Send + Sync>;

/// Context for one validation run.
#[derive(Default)]
pub struct ValidationContext {
    trace: Option<TraceSink>,
    cancelled: Option<Arc<AtomicBool>>,
    visited: Mutex<HashSet<(usize, String)>>,
}

impl ValidationContext {
    /// A context with no trace sink and no cancellation signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a trace sink.
    pub fn with_trace(mut self, sink: TraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Install a cancellation flag, checked at each assertion-evaluation
    /// step. Outcomes already merged stay valid; evaluation simply stops
    /// contributing further ones.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(flag);
        self
    }

    /// Whether the run has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    /// Invoke the trace sink, if one is installed.
    pub(crate) fn trace(&self, label: &str, input: &[TypedNode]) {
        if let Some(sink) = &self.trace {
            sink(label, input);
        }
    }

    /// Register an (assertion identity, input) pair. Returns `false` when
    /// the identical pair was already evaluated in this context.
    pub(crate) fn enter(&self, identity: usize, input: &[TypedNode]) -> bool {
        let key = (identity, fingerprint(input));
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key)
    }
}

impl fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("trace", &self.trace.as_ref().map(|_| "installed"))
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Order-sensitive fingerprint of an input sequence, built from the
/// nodes' source locations.
fn fingerprint(input: &[TypedNode]) -> String {
    let mut key = String::new();
    for node in input {
        key.push_str(node.location());
        key.push('|');
    }
    key
}
