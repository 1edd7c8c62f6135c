//! `Task`: the symbolic instruction the planner decomposes or applies.
//!
//! A task is a name plus an ordered argument list. Whether it is primitive or
//! compound is not stored on the task; it is decided by registry lookup at
//! resolution time (see [`crate::operators::domain::Resolution`]).

use std::fmt;

/// An immutable `(name, args)` pair.
///
/// `A` is the domain's argument type. The engine never inspects arguments; it
/// only hands them to operators and methods and renders them for the trace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task<A> {
    name: String,
    args: Vec<A>,
}

impl<A> Task<A> {
    /// Build a task from a name and its ordered arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<A>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Task with no arguments.
    #[must_use]
    pub fn nullary(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// The task name used for registry dispatch.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered arguments.
    #[must_use]
    pub fn args(&self) -> &[A] {
        &self.args
    }

    /// Split into owned parts.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<A>) {
        (self.name, self.args)
    }
}

impl<A: fmt::Display> Task<A> {
    /// Render the arguments with their `Display` form, in order.
    #[must_use]
    pub fn rendered_args(&self) -> Vec<String> {
        self.args.iter().map(ToString::to_string).collect()
    }

    /// Space-separated `name arg0 arg1 ...` line, the form an external
    /// executor consumes one step at a time.
    #[must_use]
    pub fn step_line(&self) -> String {
        let mut line = self.name.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string());
        }
        line
    }
}

/// Renders as `name(arg0, arg1)`.
impl<A: fmt::Display> fmt::Display for Task<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}
