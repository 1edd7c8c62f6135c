//! End-to-end lock tests on the built-in worlds.
//!
//! These run the full harness pipeline (plan → replay → goal check → report)
//! and pin the exact plans, so any change to method ordering or operator
//! preconditions shows up here first.

use std::collections::BTreeMap;

use htn_harness::contract::{HtnWorld, WorldError};
use htn_harness::runner::run_world;
use htn_harness::worlds::baxter_swap::{BaxterSwapWorld, Location};
use htn_harness::worlds::blocks_world::{BlocksWorld, OnRelation, Place};
use htn_kernel::carrier::task::Task;
use htn_kernel::proof::replay::replay;
use htn_search::policy::PlannerPolicy;
use htn_search::search::Planner;

fn plan_lines<W: HtnWorld>(world: &W) -> Vec<String> {
    let run = run_world(world, &PlannerPolicy::default()).unwrap();
    run.result
        .unwrap()
        .steps()
        .iter()
        .map(Task::step_line)
        .collect()
}

// ---------------------------------------------------------------------------
// Baxter swap
// ---------------------------------------------------------------------------

#[test]
fn baxter_swap_plan_is_exactly_eight_steps() {
    assert_eq!(
        plan_lines(&BaxterSwapWorld::swap_problem()),
        vec![
            "pickup blue left",
            "place blue center left",
            "pickup green right",
            "place green center right",
            "pickup blue right",
            "place blue t2 right",
            "pickup green left",
            "place green t1 left",
        ]
    );
}

#[test]
fn baxter_swap_replay_reaches_goal_with_empty_hands() {
    let world = BaxterSwapWorld::swap_problem();
    let planner = Planner::new(world.domain().unwrap(), PlannerPolicy::default()).unwrap();
    let start = world.start_state();
    let plan = planner.run(&start, world.initial_tasks()).unwrap();

    let end = replay(planner.domain(), &start, plan.steps()).unwrap();
    assert_eq!(end.pos, world.goal().pos);
    assert!(end.hands_empty());
    assert!(world.goal_satisfied(&end));
    assert!(!world.goal_satisfied(&start));
}

#[test]
fn baxter_already_solved_needs_no_steps() {
    let pos = BTreeMap::from([
        ("red".to_string(), Location::Center),
        ("blue".to_string(), Location::T1),
    ]);
    let world = BaxterSwapWorld::new(pos.clone(), pos).unwrap();
    assert!(plan_lines(&world).is_empty());
}

#[test]
fn baxter_rejects_goal_for_unknown_block() {
    let err = BaxterSwapWorld::new(
        BTreeMap::from([("red".to_string(), Location::Center)]),
        BTreeMap::from([("mauve".to_string(), Location::T1)]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        WorldError::UnknownBlock {
            name: "mauve".into()
        }
    );
}

// ---------------------------------------------------------------------------
// Blocks world
// ---------------------------------------------------------------------------

#[test]
fn blocks_stacking_plan() {
    assert_eq!(
        plan_lines(&BlocksWorld::stacking_problem()),
        vec!["pickup b", "stack b c", "pickup a", "stack a b"]
    );
}

#[test]
fn blocks_tower_inversion_from_relations() {
    let world = BlocksWorld::from_on_relations(
        &[
            OnRelation::new("a", "b"),
            OnRelation::new("b", "c"),
            OnRelation::new("c", "table"),
        ],
        &[
            OnRelation::new("c", "b"),
            OnRelation::new("b", "a"),
            OnRelation::new("a", "table"),
        ],
    )
    .unwrap();
    assert_eq!(
        plan_lines(&world),
        vec![
            "unstack a b",
            "putdown a",
            "unstack b c",
            "stack b a",
            "pickup c",
            "stack c b",
        ]
    );
}

#[test]
fn blocks_replay_matches_goal_positions() {
    let world = BlocksWorld::stacking_problem();
    let planner = Planner::new(world.domain().unwrap(), PlannerPolicy::default()).unwrap();
    let start = world.start_state();
    let plan = planner.run(&start, world.initial_tasks()).unwrap();
    let end = replay(planner.domain(), &start, plan.steps()).unwrap();

    assert_eq!(end.pos.get("a"), Some(&Place::On("b".into())));
    assert_eq!(end.pos.get("b"), Some(&Place::On("c".into())));
    assert_eq!(end.pos.get("c"), Some(&Place::Table));
    assert_eq!(end.holding, None);
}

#[test]
fn blocks_unknown_block_message() {
    let err = BlocksWorld::from_on_relations(
        &[OnRelation::new("a", "table")],
        &[OnRelation::new("a", "z")],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "No such block: z");
}
