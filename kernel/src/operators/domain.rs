//! `Domain`: the operator and method registries for one planning problem.
//!
//! The domain is populated before search and read-only afterwards. Declaration
//! rejects a name that is already registered in the *other* registry, so every
//! task name resolves to exactly one of [`Resolution::Primitive`],
//! [`Resolution::Compound`] or [`Resolution::Unknown`].

use std::fmt;

use crate::operators::method_registry::{Method, MethodRegistry};
use crate::operators::operator_registry::{Operator, OperatorRegistry};

/// Declaration-time domain errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// The name is already registered as the other kind of task.
    #[error("task name {name:?} is already registered as {existing}")]
    AmbiguousTaskName { name: String, existing: TaskKind },
}

/// Which registry a task name lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Primitive,
    Compound,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primitive => "an operator",
            Self::Compound => "a method",
        })
    }
}

/// Result of looking up a task name.
#[derive(Debug)]
pub enum Resolution<'d, S, A> {
    Primitive(&'d Operator<S, A>),
    /// Candidate methods in registration order.
    Compound(&'d [Method<S, A>]),
    Unknown,
}

/// Named pair of registries.
pub struct Domain<S, A> {
    name: String,
    operators: OperatorRegistry<S, A>,
    methods: MethodRegistry<S, A>,
}

impl<S, A> Domain<S, A> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operators: OperatorRegistry::new(),
            methods: MethodRegistry::new(),
        }
    }

    /// Domain identifier, recorded in traces and reports.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bulk-register operators. Re-declaring an operator name replaces it.
    ///
    /// # Errors
    ///
    /// [`DomainError::AmbiguousTaskName`] if an operator name already has
    /// methods. Nothing is registered in that case.
    pub fn declare_operators<I>(&mut self, operators: I) -> Result<&mut Self, DomainError>
    where
        I: IntoIterator<Item = Operator<S, A>>,
    {
        let operators: Vec<_> = operators.into_iter().collect();
        if let Some(op) = operators.iter().find(|op| self.methods.contains(op.name())) {
            return Err(DomainError::AmbiguousTaskName {
                name: op.name().to_string(),
                existing: TaskKind::Compound,
            });
        }
        for op in operators {
            self.operators.register(op);
        }
        Ok(self)
    }

    /// Bulk-append methods for `task_name`, preserving iteration order.
    ///
    /// # Errors
    ///
    /// [`DomainError::AmbiguousTaskName`] if `task_name` is an operator.
    pub fn declare_methods<I>(
        &mut self,
        task_name: &str,
        methods: I,
    ) -> Result<&mut Self, DomainError>
    where
        I: IntoIterator<Item = Method<S, A>>,
    {
        if self.operators.contains(task_name) {
            return Err(DomainError::AmbiguousTaskName {
                name: task_name.to_string(),
                existing: TaskKind::Primitive,
            });
        }
        for method in methods {
            self.methods.register(task_name, method);
        }
        Ok(self)
    }

    /// Classify a task name.
    #[must_use]
    pub fn resolve(&self, task_name: &str) -> Resolution<'_, S, A> {
        if let Some(op) = self.operators.resolve(task_name) {
            return Resolution::Primitive(op);
        }
        match self.methods.resolve(task_name) {
            Some(methods) => Resolution::Compound(methods),
            None => Resolution::Unknown,
        }
    }

    #[must_use]
    pub fn operators(&self) -> &OperatorRegistry<S, A> {
        &self.operators
    }

    #[must_use]
    pub fn methods(&self) -> &MethodRegistry<S, A> {
        &self.methods
    }
}

impl<S, A> Clone for Domain<S, A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            operators: self.operators.clone(),
            methods: self.methods.clone(),
        }
    }
}

impl<S, A> fmt::Debug for Domain<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("name", &self.name)
            .field("operators", &self.operators)
            .field("methods", &self.methods)
            .finish()
    }
}
