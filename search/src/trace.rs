//! `PlanTraceV1`: decision audit log for one planner run.
//!
//! The normative decision surface is the ordered list of `DecisionEventV1`
//! entries: every operator application attempt, every method attempt, every
//! backtrack, unresolved name and depth cut, in the order the search made
//! them. Metadata carries aggregate counters and the termination reason.
//!
//! Serialization is `serde_json` over structs with fixed field order, so equal
//! traces produce equal bytes and equal digests.

use std::fmt;

use serde::{Deserialize, Serialize};

use htn_kernel::carrier::task::Task;
use htn_kernel::proof::hash::{canonical_hash, ContentHash};
use htn_kernel::proof::hash_domain::HashDomain;

/// The complete decision trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTraceV1 {
    /// Ordered decision events. Empty when decision recording is disabled.
    pub events: Vec<DecisionEventV1>,
    pub metadata: TraceMetadataV1,
}

/// One decision taken while processing the head task of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionEventV1 {
    /// Total order of events within the run.
    pub order: u64,
    pub depth: u32,
    /// The head task. `None` only for a depth cut on an empty task list.
    pub task: Option<TaskRecordV1>,
    pub decision: DecisionV1,
}

/// A task rendered with its arguments' `Display` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecordV1 {
    pub name: String,
    pub args: Vec<String>,
}

impl TaskRecordV1 {
    #[must_use]
    pub fn from_task<A: fmt::Display>(task: &Task<A>) -> Self {
        Self {
            name: task.name().to_string(),
            args: task.rendered_args(),
        }
    }
}

/// What happened to the head task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionV1 {
    /// Operator accepted the state clone; the step was appended to the plan.
    OperatorApplied,
    /// Operator rejected the state clone.
    OperatorRejected { detail: String },
    /// Method produced `subtask_count` replacement tasks.
    MethodDecomposed { method: String, subtask_count: u64 },
    /// Method declined to decompose.
    MethodInapplicable { method: String, detail: String },
    /// The branch opened by the preceding applied operator or decomposed
    /// method failed and was undone.
    Backtracked,
    /// Name is neither an operator nor a method.
    Unresolved,
    /// Frame entered beyond `max_depth`.
    DepthBoundReached,
}

/// Aggregate counters and bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMetadataV1 {
    // Bindings
    pub domain_id: String,
    pub start_state_name: String,
    pub max_depth: u32,

    // Counters
    pub frames_visited: u64,
    pub max_depth_reached: u32,
    pub operator_applications: u64,
    pub method_expansions: u64,
    pub backtracks: u64,
    pub depth_bound_hits: u64,
    /// Sorted, deduplicated.
    pub unresolved_task_names: Vec<String>,
    pub termination_reason: TerminationReasonV1,
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerminationReasonV1 {
    /// The pending task list emptied.
    PlanFound { step_count: u64 },
    /// Every alternative failed.
    SearchExhausted { depth_bound_reached: bool },
}

// ---------------------------------------------------------------------------
// JSON serialization
// ---------------------------------------------------------------------------

impl PlanTraceV1 {
    /// Serialize the trace to compact JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse a trace from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the bytes are not a valid trace.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Content hash of the JSON bytes under [`HashDomain::PlanTrace`].
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn digest(&self) -> Result<ContentHash, serde_json::Error> {
        Ok(canonical_hash(HashDomain::PlanTrace, &self.to_json_bytes()?))
    }

    /// Events for one depth, in order.
    pub fn events_at_depth(&self, depth: u32) -> impl Iterator<Item = &DecisionEventV1> {
        self.events.iter().filter(move |e| e.depth == depth)
    }
}
