//! `MethodRegistry`: compound task name → ordered decomposition candidates.
//!
//! Methods accumulate: registering under an existing name appends, and the
//! search tries candidates strictly in registration order. A method borrows the
//! state immutably, so a decomposition cannot mutate the branch it runs in.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::carrier::task::Task;

/// Why a method produced no decomposition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MethodFailure {
    /// The method's applicability conditions do not hold.
    #[error("method not applicable: {detail}")]
    NotApplicable { detail: String },
    /// The task's arguments do not match what the method expects.
    #[error("argument mismatch: {detail}")]
    ArgumentMismatch { detail: String },
}

impl MethodFailure {
    #[must_use]
    pub fn not_applicable(detail: impl Into<String>) -> Self {
        Self::NotApplicable {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn arguments(detail: impl Into<String>) -> Self {
        Self::ArgumentMismatch {
            detail: detail.into(),
        }
    }
}

/// `Ok(vec![])` is a successful empty decomposition (the task is already
/// achieved), not a failure.
pub type Decomposition<A> = Result<Vec<Task<A>>, MethodFailure>;

type MethodHandler<S, A> = dyn Fn(&S, &[A]) -> Decomposition<A> + Send + Sync;

/// A named decomposition function.
pub struct Method<S, A> {
    name: String,
    handler: Arc<MethodHandler<S, A>>,
}

impl<S, A> Method<S, A> {
    /// `name` identifies the method in traces; it need not match the task name.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&S, &[A]) -> Decomposition<A> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the method for a decomposition of a task with `args` in `state`.
    ///
    /// # Errors
    ///
    /// Returns the handler's [`MethodFailure`] when the method does not apply.
    pub fn decompose(&self, state: &S, args: &[A]) -> Decomposition<A> {
        (self.handler)(state, args)
    }
}

impl<S, A> Clone for Method<S, A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<S, A> fmt::Debug for Method<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method").field("name", &self.name).finish()
    }
}

/// Ordered method lists keyed by compound task name.
pub struct MethodRegistry<S, A> {
    entries: BTreeMap<String, Vec<Method<S, A>>>,
}

impl<S, A> MethodRegistry<S, A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Append `method` to the candidate list for `task_name`.
    pub fn register(&mut self, task_name: impl Into<String>, method: Method<S, A>) {
        self.entries.entry(task_name.into()).or_default().push(method);
    }

    /// Candidates for `task_name` in registration order.
    #[must_use]
    pub fn resolve(&self, task_name: &str) -> Option<&[Method<S, A>]> {
        self.entries.get(task_name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, task_name: &str) -> bool {
        self.entries.contains_key(task_name)
    }

    /// Compound task names in sorted order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of compound task names (not methods).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S, A> Default for MethodRegistry<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> Clone for MethodRegistry<S, A> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<S, A> fmt::Debug for MethodRegistry<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (task, methods) in &self.entries {
            let names: Vec<&str> = methods.iter().map(Method::name).collect();
            map.entry(task, &names);
        }
        map.finish()
    }
}
