//! The state contract the planner is generic over.
//!
//! A planning state is a plain domain value with value semantics: `clone()` is
//! a deep copy, so an operator working on its clone can never leak writes into
//! a sibling search branch. Equality lets domains and tests compare states
//! (e.g. a replayed final state against an expected one).

use std::fmt;

/// A domain state threaded through the search.
///
/// Implementors are ordinary records (maps of entity to attribute). The engine
/// only clones them, hands them to operators/methods, and reads the name for
/// diagnostics.
pub trait PlanningState: Clone + PartialEq + fmt::Debug {
    /// Diagnostic name (e.g. `"start"`). Not semantically load-bearing.
    fn name(&self) -> &str;
}
