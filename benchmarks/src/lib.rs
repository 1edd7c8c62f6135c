//! Shared helpers for HTN benchmark suites.

use htn_harness::worlds::blocks_world::{BlocksWorld, OnRelation};
use htn_search::policy::{PlannerPolicy, MAX_DEPTH_CEILING};

fn block(i: usize) -> String {
    format!("b{i}")
}

/// A tower `b0` on `b1` on ... on `b{height-1}` on the table, to be rebuilt
/// upside down.
///
/// # Panics
///
/// Panics if `height` is zero or the generated facts are rejected; benchmark
/// setup failures are fatal.
#[must_use]
pub fn inverted_tower(height: usize) -> BlocksWorld {
    assert!(height > 0, "tower needs at least one block");
    let start: Vec<OnRelation> = (0..height)
        .map(|i| {
            let below = if i + 1 == height {
                "table".to_string()
            } else {
                block(i + 1)
            };
            OnRelation::new(block(i), below)
        })
        .collect();
    let goal: Vec<OnRelation> = (0..height)
        .map(|i| {
            let below = if i == 0 {
                "table".to_string()
            } else {
                block(i - 1)
            };
            OnRelation::new(block(i), below)
        })
        .collect();
    BlocksWorld::from_on_relations(&start, &goal).expect("tower facts are valid")
}

/// Policy with the deepest allowed bound, for towers whose plans outgrow the
/// default.
#[must_use]
pub fn deep_policy() -> PlannerPolicy {
    PlannerPolicy::with_max_depth(MAX_DEPTH_CEILING)
}
