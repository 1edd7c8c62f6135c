//! Typed planner errors.
//!
//! `PlannerError` represents pre-flight failures only: nothing was searched.
//! `PlanFailure` is the runtime outcome of a search that found no plan; it
//! always comes with a complete trace when produced by
//! [`crate::search::Planner::run_traced`].

/// Pre-flight failure. Returned before any search step is taken.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlannerError {
    #[error("invalid planner policy: {detail}")]
    InvalidPolicy { detail: String },
}

/// No plan exists within the depth bound.
///
/// No partial plan is ever attached. `depth_bound_reached` is a hint only: a
/// plan may or may not exist deeper.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("plan cannot be formulated ({frames_visited} frames visited)")]
pub struct PlanFailure {
    /// Task names that resolved to neither an operator nor a method, sorted
    /// and deduplicated.
    pub unresolved_task_names: Vec<String>,
    /// Some branch was cut by the depth bound.
    pub depth_bound_reached: bool,
    pub frames_visited: u64,
}

impl PlanFailure {
    /// True when the search hit task names the domain does not define.
    #[must_use]
    pub fn is_missing_domain_knowledge(&self) -> bool {
        !self.unresolved_task_names.is_empty()
    }
}
