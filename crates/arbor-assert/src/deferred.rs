//! # Deferred Values
//!
//! `Deferred<T>` is an explicit two-state machine for a value that is
//! either still `Pending` behind its resolver or already `Resolved` and
//! cached. Construction never runs the resolver; the first call to
//! [`Deferred::get`] runs it exactly once and publishes the result, and
//! racing first callers serialize on the internal lock so all of them
//! observe the same cached value.
//!
//! This is the representation reference assertions use to point into a
//! possibly-cyclic schema graph without eagerly expanding it.

use std::fmt;
use std::sync::Mutex;

enum State<T> {
    /// The resolver has not run yet.
    Pending(Box<dyn FnOnce() -> T + Send>),
    /// The resolver is running on the current thread. Observable only if
    /// a previous resolution panicked.
    Resolving,
    /// The resolver has run; the value is cached.
    Resolved(T),
}

/// A lazily resolved, cached value.
pub struct Deferred<T> {
    state: Mutex<State<T>>,
}

impl<T: Clone> Deferred<T> {
    /// A deferred value that will run `resolver` on first access.
    pub fn new<F>(resolver: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            state: Mutex::new(State::Pending(Box::new(resolver))),
        }
    }

    /// A deferred value that is already resolved.
    pub fn resolved(value: T) -> Self {
        Self {
            state: Mutex::new(State::Resolved(value)),
        }
    }

    /// Whether the value has been resolved yet.
    pub fn is_resolved(&self) -> bool {
        matches!(
            *self.state.lock().expect("deferred state lock poisoned"),
            State::Resolved(_)
        )
    }

    /// Resolve the value, running the resolver at most once.
    pub fn get(&self) -> T {
        let mut state = self.state.lock().expect("deferred state lock poisoned");

        if let State::Pending(_) = *state {
            if let State::Pending(resolve) = std::mem::replace(&mut *state, State::Resolving) {
                *state = State::Resolved(resolve());
            }
        }

        match &*state {
            State::Resolved(value) => value.clone(),
            _ => unreachable!("resolver is installed at construction"),
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state.lock() {
            Ok(guard) => match &*guard {
                State::Pending(_) => "pending",
                State::Resolving => "resolving",
                State::Resolved(_) => "resolved",
            },
            Err(_) => "poisoned",
        };
        f.debug_struct("Deferred").field("state", &state).finish()
    }
}
