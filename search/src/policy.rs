//! Planner policy: the depth bound and decision recording switch.

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Default recursion bound.
pub const DEFAULT_MAX_DEPTH: u32 = 50;

/// Largest accepted `max_depth`. The search recurses once per frame, so the
/// bound doubles as a stack-depth cap.
pub const MAX_DEPTH_CEILING: u32 = 1024;

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerPolicy {
    /// A frame entered with `depth > max_depth` fails immediately.
    pub max_depth: u32,
    /// Record one `DecisionEventV1` per decision. When false only the trace
    /// counters are kept.
    pub record_decisions: bool,
}

impl PlannerPolicy {
    /// Policy with a custom depth bound and default recording.
    #[must_use]
    pub fn with_max_depth(max_depth: u32) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Reject policies the planner cannot honor.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidPolicy`] if `max_depth` is zero or above
    /// [`MAX_DEPTH_CEILING`].
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.max_depth == 0 {
            return Err(PlannerError::InvalidPolicy {
                detail: "max_depth must be at least 1".into(),
            });
        }
        if self.max_depth > MAX_DEPTH_CEILING {
            return Err(PlannerError::InvalidPolicy {
                detail: format!(
                    "max_depth {} exceeds ceiling {MAX_DEPTH_CEILING}",
                    self.max_depth
                ),
            });
        }
        Ok(())
    }
}

impl Default for PlannerPolicy {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            record_decisions: true,
        }
    }
}
