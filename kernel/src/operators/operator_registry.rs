//! `OperatorRegistry`: primitive task name → state-transition function.
//!
//! An operator receives its own clone of the current state (the search clones
//! before every application) and either returns the successor state or a typed
//! [`ApplyFailure`]. Registration has map semantics: registering a name twice
//! replaces the earlier operator.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// ApplyFailure
// ---------------------------------------------------------------------------

/// Typed failure for operator application. Always recovered by backtracking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyFailure {
    /// The operator's preconditions do not hold in this state.
    #[error("precondition not met: {detail}")]
    PreconditionNotMet { detail: String },
    /// The task's arguments do not match what the operator expects.
    #[error("argument mismatch: {detail}")]
    ArgumentMismatch { detail: String },
}

impl ApplyFailure {
    /// Shorthand for [`ApplyFailure::PreconditionNotMet`].
    #[must_use]
    pub fn precondition(detail: impl Into<String>) -> Self {
        Self::PreconditionNotMet {
            detail: detail.into(),
        }
    }

    /// Shorthand for [`ApplyFailure::ArgumentMismatch`].
    #[must_use]
    pub fn arguments(detail: impl Into<String>) -> Self {
        Self::ArgumentMismatch {
            detail: detail.into(),
        }
    }
}

/// Result type for a single operator application.
pub type ApplyResult<S> = Result<S, ApplyFailure>;

/// Handler signature: owned state clone + task arguments → successor state.
type OperatorHandler<S, A> = dyn Fn(S, &[A]) -> ApplyResult<S> + Send + Sync;

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

/// A named primitive action.
pub struct Operator<S, A> {
    name: String,
    handler: Arc<OperatorHandler<S, A>>,
}

impl<S, A> Operator<S, A> {
    /// Wrap a transition function under the task name it resolves.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(S, &[A]) -> ApplyResult<S> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
        }
    }

    /// The primitive task name this operator handles.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the operator to an owned state.
    ///
    /// # Errors
    ///
    /// Returns the handler's [`ApplyFailure`] when the operator does not apply.
    pub fn apply(&self, state: S, args: &[A]) -> ApplyResult<S> {
        (self.handler)(state, args)
    }
}

impl<S, A> Clone for Operator<S, A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<S, A> fmt::Debug for Operator<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator").field("name", &self.name).finish()
    }
}

// ---------------------------------------------------------------------------
// OperatorRegistry
// ---------------------------------------------------------------------------

/// Operators keyed by task name.
///
/// `BTreeMap` for deterministic iteration order when listing names.
pub struct OperatorRegistry<S, A> {
    entries: BTreeMap<String, Operator<S, A>>,
}

impl<S, A> OperatorRegistry<S, A> {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register an operator. Last registration for a name wins; the replaced
    /// operator is returned.
    pub fn register(&mut self, operator: Operator<S, A>) -> Option<Operator<S, A>> {
        self.entries.insert(operator.name.clone(), operator)
    }

    /// Look up the operator for a task name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Operator<S, A>> {
        self.entries.get(name)
    }

    /// Whether `name` is a registered operator.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered operators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S, A> Default for OperatorRegistry<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> Clone for OperatorRegistry<S, A> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<S, A> fmt::Debug for OperatorRegistry<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
