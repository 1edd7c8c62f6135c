//! Planner property lock tests on the travel fixture domain.
//!
//! Proves:
//! 1. Repeated runs return identical plans and identical trace bytes
//! 2. Every returned plan replays from the start state
//! 3. A failed method's partial expansion never leaks into the plan
//! 4. Self-recursive methods fail within the depth bound instead of hanging
//! 5. Unknown task names fail the run without a partial plan
//! 6. Methods called twice on the same state return the same decomposition

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use htn_kernel::carrier::task::Task;
use htn_kernel::operators::method_registry::Method;
use htn_kernel::proof::replay::replay;
use htn_search::policy::PlannerPolicy;
use htn_search::search::Planner;
use htn_search::trace::{DecisionV1, TerminationReasonV1};
use lock_tests::{travel_domain, travel_domain_counting, travel_start, travel_task, TravelState};

fn planner() -> Planner<TravelState, String> {
    Planner::new(travel_domain(), PlannerPolicy::default()).unwrap()
}

fn names(tasks: &[Task<String>]) -> Vec<&str> {
    tasks.iter().map(Task::name).collect()
}

// ---------------------------------------------------------------------------
// 1. Determinism: N=10
// ---------------------------------------------------------------------------

#[test]
fn plan_and_trace_deterministic_n10() {
    let p = planner();
    let first = p.run_traced(&travel_start(0), travel_task("home", "shop"));
    let first_bytes = first.trace.to_json_bytes().unwrap();
    for i in 1..10 {
        let other = p.run_traced(&travel_start(0), travel_task("home", "shop"));
        assert_eq!(first.result, other.result, "plan differed on run {i}");
        assert_eq!(
            first_bytes,
            other.trace.to_json_bytes().unwrap(),
            "trace bytes differed on run {i}"
        );
    }
}

#[test]
fn fresh_planners_agree_n10() {
    let first = planner()
        .run(&travel_start(20), travel_task("home", "park"))
        .unwrap();
    for i in 1..10 {
        let other = planner()
            .run(&travel_start(20), travel_task("home", "park"))
            .unwrap();
        assert_eq!(first, other, "plan differed on fresh planner {i}");
    }
}

#[test]
fn failures_deterministic_n10() {
    let p = planner();
    let first = p.run(&travel_start(0), travel_task("home", "park")).unwrap_err();
    for i in 1..10 {
        let other = p.run(&travel_start(0), travel_task("home", "park")).unwrap_err();
        assert_eq!(first, other, "failure differed on run {i}");
    }
}

// ---------------------------------------------------------------------------
// 2. Soundness
// ---------------------------------------------------------------------------

#[test]
fn returned_plans_replay() {
    let p = planner();
    for (cash, to) in [(0, "shop"), (10, "shop"), (20, "park")] {
        let start = travel_start(cash);
        let plan = p.run(&start, travel_task("home", to)).unwrap();
        let end = replay(p.domain(), &start, plan.steps()).unwrap();
        assert_eq!(end.at, to, "cash={cash} to={to}");
        assert_eq!(end.owe, 0);
    }
}

#[test]
fn replay_consumes_exactly_the_returned_arguments() {
    let p = planner();
    let plan = p
        .run(&travel_start(20), travel_task("home", "park"))
        .unwrap();
    assert_eq!(
        plan.steps(),
        &[
            Task::new("call_taxi", vec!["home".to_string()]),
            Task::new("ride_taxi", vec!["home".to_string(), "park".to_string()]),
            Task::nullary("pay_driver"),
        ]
    );
    // Swapping the ride's arguments must not replay.
    let mut tampered = plan.steps().to_vec();
    tampered[1] = Task::new("ride_taxi", vec!["park".to_string(), "home".to_string()]);
    assert!(replay(p.domain(), &travel_start(20), &tampered).is_err());
}

// ---------------------------------------------------------------------------
// 3. Backtracking
// ---------------------------------------------------------------------------

#[test]
fn second_method_plan_has_no_first_method_steps() {
    let outcome = planner().run_traced(&travel_start(0), travel_task("home", "shop"));
    let plan = outcome.result.unwrap();
    assert_eq!(names(plan.steps()), vec!["walk"]);

    // Two applied taxi steps are undone, then the taxi expansion itself.
    let backtracks = outcome
        .trace
        .events
        .iter()
        .filter(|e| e.decision == DecisionV1::Backtracked)
        .count();
    assert_eq!(backtracks, 3);
    assert_eq!(outcome.trace.metadata.backtracks, 3);
}

#[test]
fn first_method_wins_when_it_succeeds() {
    let plan = planner()
        .run(&travel_start(10), travel_task("home", "shop"))
        .unwrap();
    assert_eq!(names(plan.steps()), vec!["call_taxi", "ride_taxi", "pay_driver"]);
}

#[test]
fn exhaustion_returns_failure_without_partial_plan() {
    let outcome = planner().run_traced(&travel_start(0), travel_task("home", "park"));
    let failure = outcome.result.unwrap_err();
    assert!(!failure.depth_bound_reached);
    assert!(!failure.is_missing_domain_knowledge());
    assert_eq!(
        outcome.trace.metadata.termination_reason,
        TerminationReasonV1::SearchExhausted {
            depth_bound_reached: false
        }
    );
}

// ---------------------------------------------------------------------------
// 4. Depth bound
// ---------------------------------------------------------------------------

#[test]
fn self_recursive_method_fails_within_bound() {
    let calls = Arc::new(AtomicU64::new(0));
    let mut domain = travel_domain();
    let counted = Arc::clone(&calls);
    domain
        .declare_methods(
            "wander",
            [Method::new("wander_again", move |_: &TravelState, _: &[String]| {
                counted.fetch_add(1, Ordering::Relaxed);
                Ok(vec![Task::nullary("wander")])
            })],
        )
        .unwrap();

    for max_depth in [1, 7, 50, 300] {
        calls.store(0, Ordering::Relaxed);
        let p = Planner::new(domain.clone(), PlannerPolicy::with_max_depth(max_depth)).unwrap();
        let outcome = p.run_traced(&travel_start(0), vec![Task::nullary("wander")]);

        let failure = outcome.result.unwrap_err();
        assert!(failure.depth_bound_reached, "max_depth={max_depth}");
        // Depths 0..=max_depth each expand once; depth max_depth+1 is cut.
        assert_eq!(calls.load(Ordering::Relaxed), u64::from(max_depth) + 1);
        assert_eq!(
            outcome.trace.metadata.max_depth_reached,
            max_depth + 1,
            "max_depth={max_depth}"
        );
    }
}

// ---------------------------------------------------------------------------
// 5. Unknown task
// ---------------------------------------------------------------------------

#[test]
fn unknown_task_after_valid_steps_yields_no_plan() {
    let mut tasks = travel_task("home", "shop");
    tasks.push(Task::nullary("teleport"));
    let outcome = planner().run_traced(&travel_start(10), tasks);

    let failure = outcome.result.unwrap_err();
    assert_eq!(failure.unresolved_task_names, vec!["teleport".to_string()]);
    assert!(failure.is_missing_domain_knowledge());
    assert!(outcome
        .trace
        .events
        .iter()
        .any(|e| e.decision == DecisionV1::Unresolved));
}

// ---------------------------------------------------------------------------
// 6. Method non-mutation
// ---------------------------------------------------------------------------

#[test]
fn method_decomposition_is_repeatable() {
    let domain = travel_domain();
    let state = travel_start(3);
    let args = vec!["home".to_string(), "shop".to_string()];
    for method in domain.methods().resolve("travel").unwrap() {
        let first = method.decompose(&state, &args);
        let second = method.decompose(&state, &args);
        assert_eq!(first, second, "method {} is not repeatable", method.name());
    }
    assert_eq!(state, travel_start(3));
}

#[test]
fn start_state_is_untouched_by_search() {
    let calls = Arc::new(AtomicU64::new(0));
    let p = Planner::new(travel_domain_counting(&calls), PlannerPolicy::default()).unwrap();
    let start = travel_start(0);
    let snapshot = start.clone();
    p.run(&start, travel_task("home", "shop")).unwrap();
    assert_eq!(start, snapshot);
    // Both strategies were consulted once.
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}
