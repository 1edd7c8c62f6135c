//! Harness runner: plan a world, verify the plan, assemble the report.
//!
//! Pipeline: `world.domain()` → `Planner::run_traced` → `replay` → goal check
//! → `build_report`. The runner owns orchestration only; search lives in
//! `htn_search`, replay and hashing in `htn_kernel`.

use tracing::{info, warn};

use htn_kernel::proof::replay::{replay, ReplayError};
use htn_search::error::{PlanFailure, PlannerError};
use htn_search::plan::Plan;
use htn_search::policy::PlannerPolicy;
use htn_search::search::Planner;
use htn_search::trace::PlanTraceV1;

use crate::contract::{HtnWorld, WorldError};
use crate::report::{
    build_report, PlanReportV1, ReportBuildError, RunOutcomeV1, VerificationV1, PLAN_ARTIFACT,
    TRACE_ARTIFACT, VERIFICATION_ARTIFACT, VERIFICATION_SCHEMA_VERSION,
};

/// Everything one world run produced.
#[derive(Debug, Clone)]
pub struct WorldRun<A> {
    pub world_id: String,
    pub result: Result<Plan<A>, PlanFailure>,
    pub trace: PlanTraceV1,
    pub verification: VerificationV1,
    pub report: PlanReportV1,
}

/// Runner failure. "No plan exists" is NOT a runner failure; it is reported
/// in [`WorldRun::result`].
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    /// The planner returned a plan that does not replay.
    #[error("plan failed replay: {0}")]
    Replay(#[from] ReplayError),
    /// The plan replays but does not reach the goal.
    #[error("plan for {world_id} replays but does not satisfy the goal")]
    GoalNotSatisfied { world_id: String },
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Report(#[from] ReportBuildError),
}

/// Plan `world` under `policy` and package the result.
///
/// # Errors
///
/// Returns [`RunError`] if the domain or policy is rejected, or if a found
/// plan fails replay or the goal check.
pub fn run_world<W: HtnWorld>(
    world: &W,
    policy: &PlannerPolicy,
) -> Result<WorldRun<W::Arg>, RunError> {
    let world_id = world.world_id().to_string();
    let planner = Planner::new(world.domain()?, policy.clone())?;
    let start = world.start_state();
    let outcome = planner.run_traced(&start, world.initial_tasks());

    let trace_bytes = outcome.trace.to_json_bytes()?;
    let trace_digest = outcome.trace.digest()?;

    let (outcome_record, plan_bytes, plan_digest) = match &outcome.result {
        Ok(plan) => {
            let end = replay(planner.domain(), &start, plan.steps())?;
            if !world.goal_satisfied(&end) {
                return Err(RunError::GoalNotSatisfied { world_id });
            }
            let record = plan.to_record();
            info!(world = %world_id, steps = plan.len(), "plan found and verified");
            (
                RunOutcomeV1::PlanFound {
                    step_count: plan.len() as u64,
                },
                Some(record.to_json_bytes()?),
                Some(record.digest()?.as_str().to_string()),
            )
        }
        Err(failure) => {
            warn!(
                world = %world_id,
                unresolved = ?failure.unresolved_task_names,
                depth_bound_reached = failure.depth_bound_reached,
                "no plan"
            );
            (
                RunOutcomeV1::NoPlan {
                    unresolved_task_names: failure.unresolved_task_names.clone(),
                    depth_bound_reached: failure.depth_bound_reached,
                },
                None,
                None,
            )
        }
    };

    let found = plan_digest.is_some();
    let verification = VerificationV1 {
        schema_version: VERIFICATION_SCHEMA_VERSION.to_string(),
        world_id: world_id.clone(),
        outcome: outcome_record,
        trace_digest: trace_digest.as_str().to_string(),
        plan_digest,
        replay_verified: found,
        goal_satisfied: found,
    };

    let mut artifacts = vec![
        (TRACE_ARTIFACT.to_string(), trace_bytes),
        (
            VERIFICATION_ARTIFACT.to_string(),
            serde_json::to_vec(&verification)?,
        ),
    ];
    if let Some(bytes) = plan_bytes {
        artifacts.push((PLAN_ARTIFACT.to_string(), bytes));
    }
    let report = build_report(artifacts)?;

    Ok(WorldRun {
        world_id,
        result: outcome.result,
        trace: outcome.trace,
        verification,
        report,
    })
}
