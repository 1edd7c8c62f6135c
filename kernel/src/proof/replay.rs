//! `replay()`: re-apply a plan's primitive steps from the start state.
//!
//! Replay is the soundness check for a plan: every step must name an operator
//! in the domain and that operator must accept the state produced by the
//! previous step. The final state is returned so callers can test the goal.

use crate::carrier::task::Task;
use crate::operators::domain::{Domain, Resolution};
use crate::operators::operator_registry::ApplyFailure;

/// Why a plan could not be replayed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    /// Step `index` does not name an operator.
    #[error("step {index} ({name}) is not a primitive task")]
    NotPrimitive { index: usize, name: String },
    /// Step `index` was rejected by its operator.
    #[error("step {index} ({name}) rejected: {failure}")]
    StepRejected {
        index: usize,
        name: String,
        failure: ApplyFailure,
    },
}

/// Apply `steps` in order to a clone of `start`.
///
/// # Errors
///
/// Returns [`ReplayError`] at the first step that is not primitive or whose
/// operator rejects the state.
pub fn replay<'a, S, A, I>(domain: &Domain<S, A>, start: &S, steps: I) -> Result<S, ReplayError>
where
    S: Clone,
    A: 'a,
    I: IntoIterator<Item = &'a Task<A>>,
{
    let mut state = start.clone();
    for (index, step) in steps.into_iter().enumerate() {
        let Resolution::Primitive(op) = domain.resolve(step.name()) else {
            return Err(ReplayError::NotPrimitive {
                index,
                name: step.name().to_string(),
            });
        };
        state = op
            .apply(state, step.args())
            .map_err(|failure| ReplayError::StepRejected {
                index,
                name: step.name().to_string(),
                failure,
            })?;
    }
    Ok(state)
}
