//! Planner entry point and the recursive decomposition loop.
//!
//! `seek(state, tasks, plan, depth)` processes the head of the pending task
//! list:
//!
//! 1. `depth > max_depth` fails the frame.
//! 2. An empty task list is success.
//! 3. A primitive head is applied to a clone of the state; the step is pushed
//!    onto the plan and popped again if the rest of the list fails.
//! 4. A compound head tries its methods in registration order against the
//!    shared (un-cloned) state; each decomposition is prepended to the rest of
//!    the list. The first branch that succeeds wins.
//! 5. An unknown head fails the frame and its name is recorded.
//!
//! Failure is a `false` propagated up the recursion, never a panic.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, trace};

use htn_kernel::carrier::state::PlanningState;
use htn_kernel::carrier::task::Task;
use htn_kernel::operators::domain::{Domain, Resolution};

use crate::error::{PlanFailure, PlannerError};
use crate::plan::Plan;
use crate::policy::PlannerPolicy;
use crate::trace::{
    DecisionEventV1, DecisionV1, PlanTraceV1, TaskRecordV1, TerminationReasonV1, TraceMetadataV1,
};

/// Result of a traced planner run.
///
/// Always contains a complete `PlanTraceV1` regardless of outcome.
#[derive(Debug, Clone)]
pub struct PlanningOutcome<A> {
    pub result: Result<Plan<A>, PlanFailure>,
    pub trace: PlanTraceV1,
}

impl<A> PlanningOutcome<A> {
    #[must_use]
    pub fn is_plan_found(&self) -> bool {
        self.result.is_ok()
    }
}

/// HTN planner over one domain.
///
/// The domain is read-only for the planner's lifetime, so `run` takes `&self`
/// and a planner can be shared across threads when `S` and `A` allow it.
#[derive(Debug, Clone)]
pub struct Planner<S, A> {
    domain: Domain<S, A>,
    policy: PlannerPolicy,
}

impl<S, A> Planner<S, A>
where
    S: PlanningState,
    A: Clone + fmt::Display,
{
    /// Bind a domain to a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidPolicy`] if the policy is rejected by
    /// [`PlannerPolicy::validate`].
    pub fn new(domain: Domain<S, A>, policy: PlannerPolicy) -> Result<Self, PlannerError> {
        policy.validate()?;
        Ok(Self { domain, policy })
    }

    #[must_use]
    pub fn domain(&self) -> &Domain<S, A> {
        &self.domain
    }

    #[must_use]
    pub fn policy(&self) -> &PlannerPolicy {
        &self.policy
    }

    /// Plan `initial_tasks` from `start`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanFailure`] when every alternative is exhausted.
    pub fn run(&self, start: &S, initial_tasks: Vec<Task<A>>) -> Result<Plan<A>, PlanFailure> {
        self.run_traced(start, initial_tasks).result
    }

    /// Plan `initial_tasks` from `start` and return the decision trace.
    #[must_use]
    pub fn run_traced(&self, start: &S, initial_tasks: Vec<Task<A>>) -> PlanningOutcome<A> {
        let mut run = SearchRun::new(&self.domain, &self.policy);
        let mut steps = Vec::new();
        let found = run.seek(start, &initial_tasks, &mut steps, 0);

        let termination_reason = if found {
            TerminationReasonV1::PlanFound {
                step_count: steps.len() as u64,
            }
        } else {
            TerminationReasonV1::SearchExhausted {
                depth_bound_reached: run.depth_bound_hits > 0,
            }
        };

        debug!(
            domain = self.domain.name(),
            start = start.name(),
            found,
            steps = steps.len(),
            frames = run.frames_visited,
            backtracks = run.backtracks,
            "planner run finished"
        );

        let unresolved_task_names: Vec<String> = run.unresolved.iter().cloned().collect();
        let result = if found {
            Ok(Plan::from_steps(steps))
        } else {
            Err(PlanFailure {
                unresolved_task_names: unresolved_task_names.clone(),
                depth_bound_reached: run.depth_bound_hits > 0,
                frames_visited: run.frames_visited,
            })
        };

        let trace = PlanTraceV1 {
            metadata: TraceMetadataV1 {
                domain_id: self.domain.name().to_string(),
                start_state_name: start.name().to_string(),
                max_depth: self.policy.max_depth,
                frames_visited: run.frames_visited,
                max_depth_reached: run.max_depth_reached,
                operator_applications: run.operator_applications,
                method_expansions: run.method_expansions,
                backtracks: run.backtracks,
                depth_bound_hits: run.depth_bound_hits,
                unresolved_task_names,
                termination_reason,
            },
            events: run.events,
        };

        PlanningOutcome { result, trace }
    }
}

// ---------------------------------------------------------------------------
// Search run
// ---------------------------------------------------------------------------

/// Mutable bookkeeping for one `run_traced` call.
struct SearchRun<'d, S, A> {
    domain: &'d Domain<S, A>,
    policy: &'d PlannerPolicy,
    events: Vec<DecisionEventV1>,
    next_order: u64,
    frames_visited: u64,
    max_depth_reached: u32,
    operator_applications: u64,
    method_expansions: u64,
    backtracks: u64,
    depth_bound_hits: u64,
    unresolved: BTreeSet<String>,
}

impl<'d, S, A> SearchRun<'d, S, A>
where
    S: PlanningState,
    A: Clone + fmt::Display,
{
    fn new(domain: &'d Domain<S, A>, policy: &'d PlannerPolicy) -> Self {
        Self {
            domain,
            policy,
            events: Vec::new(),
            next_order: 0,
            frames_visited: 0,
            max_depth_reached: 0,
            operator_applications: 0,
            method_expansions: 0,
            backtracks: 0,
            depth_bound_hits: 0,
            unresolved: BTreeSet::new(),
        }
    }

    fn seek(&mut self, state: &S, tasks: &[Task<A>], plan: &mut Vec<Task<A>>, depth: u32) -> bool {
        self.frames_visited += 1;
        self.max_depth_reached = self.max_depth_reached.max(depth);

        if depth > self.policy.max_depth {
            self.depth_bound_hits += 1;
            self.record(depth, tasks.first(), DecisionV1::DepthBoundReached);
            return false;
        }

        let Some((head, rest)) = tasks.split_first() else {
            return true;
        };

        match self.domain.resolve(head.name()) {
            Resolution::Primitive(op) => match op.apply(state.clone(), head.args()) {
                Ok(next) => {
                    self.operator_applications += 1;
                    self.record(depth, Some(head), DecisionV1::OperatorApplied);
                    plan.push(head.clone());
                    if self.seek(&next, rest, plan, depth + 1) {
                        return true;
                    }
                    plan.pop();
                    self.backtracks += 1;
                    self.record(depth, Some(head), DecisionV1::Backtracked);
                    false
                }
                Err(failure) => {
                    self.record(
                        depth,
                        Some(head),
                        DecisionV1::OperatorRejected {
                            detail: failure.to_string(),
                        },
                    );
                    false
                }
            },
            Resolution::Compound(methods) => {
                for method in methods {
                    match method.decompose(state, head.args()) {
                        Ok(subtasks) => {
                            self.method_expansions += 1;
                            self.record(
                                depth,
                                Some(head),
                                DecisionV1::MethodDecomposed {
                                    method: method.name().to_string(),
                                    subtask_count: subtasks.len() as u64,
                                },
                            );
                            let mut pending = subtasks;
                            pending.extend_from_slice(rest);
                            if self.seek(state, &pending, plan, depth + 1) {
                                return true;
                            }
                            self.backtracks += 1;
                            self.record(depth, Some(head), DecisionV1::Backtracked);
                        }
                        Err(failure) => {
                            self.record(
                                depth,
                                Some(head),
                                DecisionV1::MethodInapplicable {
                                    method: method.name().to_string(),
                                    detail: failure.to_string(),
                                },
                            );
                        }
                    }
                }
                false
            }
            Resolution::Unknown => {
                self.unresolved.insert(head.name().to_string());
                self.record(depth, Some(head), DecisionV1::Unresolved);
                false
            }
        }
    }

    fn record(&mut self, depth: u32, task: Option<&Task<A>>, decision: DecisionV1) {
        trace!(
            order = self.next_order,
            depth,
            task = task.map_or("", Task::name),
            ?decision,
            "decision"
        );
        if self.policy.record_decisions {
            self.events.push(DecisionEventV1 {
                order: self.next_order,
                depth,
                task: task.map(TaskRecordV1::from_task),
                decision,
            });
        }
        self.next_order += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
