//! World contract: the minimal trait a planning world must implement.
//!
//! Worlds provide a domain (operators and methods), a start state, the
//! initial task list and a goal predicate. Worlds may NOT plan, replay, hash
//! or write reports; those are planner and runner concerns.

use std::fmt;

use htn_kernel::carrier::state::PlanningState;
use htn_kernel::carrier::task::Task;
use htn_kernel::operators::domain::{Domain, DomainError};

/// Typed failure for world construction and domain assembly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// Operators/methods could not be declared.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// A problem description names a block that does not exist.
    #[error("No such block: {name}")]
    UnknownBlock { name: String },
    /// A problem description is malformed in some other way.
    #[error("invalid problem: {detail}")]
    InvalidProblem { detail: String },
}

/// The contract a world must implement to be run by the harness runner.
pub trait HtnWorld {
    type State: PlanningState;
    type Arg: Clone + fmt::Display;

    /// Unique world identifier (e.g., `"baxter_swap"`).
    fn world_id(&self) -> &str;

    /// Assemble the world's operators and methods.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Domain`] if declarations collide.
    fn domain(&self) -> Result<Domain<Self::State, Self::Arg>, WorldError>;

    fn start_state(&self) -> Self::State;

    /// Task list handed to the planner, usually one compound goal task.
    fn initial_tasks(&self) -> Vec<Task<Self::Arg>>;

    /// Whether `state` satisfies the world's goal.
    fn goal_satisfied(&self, state: &Self::State) -> bool;
}
