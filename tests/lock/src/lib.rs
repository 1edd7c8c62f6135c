//! Shared fixtures for the HTN lock tests.
//!
//! `travel` is a small domain with two strategies for one compound task, so
//! lock tests can exercise method ordering and backtracking without pulling in
//! a full harness world.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use htn_kernel::carrier::state::PlanningState;
use htn_kernel::carrier::task::Task;
use htn_kernel::operators::domain::Domain;
use htn_kernel::operators::method_registry::{Method, MethodFailure};
use htn_kernel::operators::operator_registry::{ApplyFailure, Operator};

/// Where the traveller is and what they can spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelState {
    pub name: String,
    pub at: String,
    pub cash: u32,
    pub owe: u32,
    pub taxi_at: Option<String>,
}

impl PlanningState for TravelState {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Start at `home` with `cash`.
#[must_use]
pub fn travel_start(cash: u32) -> TravelState {
    TravelState {
        name: "start".into(),
        at: "home".into(),
        cash,
        owe: 0,
        taxi_at: None,
    }
}

/// Distance in blocks between the two known places.
#[must_use]
pub fn distance(from: &str, to: &str) -> u32 {
    match (from, to) {
        ("home", "park") | ("park", "home") => 8,
        ("home", "shop") | ("shop", "home") => 1,
        _ => 0,
    }
}

fn fare(dist: u32) -> u32 {
    3 + dist / 2
}

fn pair(args: &[String]) -> Result<(&str, &str), ApplyFailure> {
    match args {
        [a, b] => Ok((a.as_str(), b.as_str())),
        _ => Err(ApplyFailure::arguments("expected (from, to)")),
    }
}

fn operators() -> Vec<Operator<TravelState, String>> {
    vec![
        Operator::new("walk", |mut s: TravelState, args: &[String]| {
            let (from, to) = pair(args)?;
            if s.at != from {
                return Err(ApplyFailure::precondition(format!("not at {from}")));
            }
            s.at = to.to_string();
            Ok(s)
        }),
        Operator::new("call_taxi", |mut s: TravelState, args: &[String]| {
            let [at] = args else {
                return Err(ApplyFailure::arguments("expected (at)"));
            };
            s.taxi_at = Some(at.clone());
            Ok(s)
        }),
        Operator::new("ride_taxi", |mut s: TravelState, args: &[String]| {
            let (from, to) = pair(args)?;
            if s.taxi_at.as_deref() != Some(from) || s.at != from {
                return Err(ApplyFailure::precondition("no taxi here"));
            }
            s.at = to.to_string();
            s.taxi_at = Some(to.to_string());
            s.owe = fare(distance(from, to));
            Ok(s)
        }),
        Operator::new("pay_driver", |mut s: TravelState, _: &[String]| {
            if s.cash < s.owe {
                return Err(ApplyFailure::precondition(format!(
                    "cash {} < fare {}",
                    s.cash, s.owe
                )));
            }
            s.cash -= s.owe;
            s.owe = 0;
            Ok(s)
        }),
    ]
}

fn route(args: &[String]) -> Result<(String, String), MethodFailure> {
    match args {
        [a, b] => Ok((a.clone(), b.clone())),
        _ => Err(MethodFailure::arguments("expected (from, to)")),
    }
}

/// Taxi first, walk second. The taxi branch applies two steps before it can
/// fail on payment, so a poor traveller exercises backtracking.
#[must_use]
pub fn travel_domain() -> Domain<TravelState, String> {
    travel_domain_counting(&Arc::new(AtomicU64::new(0)))
}

/// [`travel_domain`] with every method invocation counted in `calls`.
///
/// # Panics
///
/// Panics if the fixed declarations collide, which is a fixture bug.
#[must_use]
pub fn travel_domain_counting(calls: &Arc<AtomicU64>) -> Domain<TravelState, String> {
    let by_taxi_calls = Arc::clone(calls);
    let by_foot_calls = Arc::clone(calls);
    let mut domain = Domain::new("travel");
    domain
        .declare_operators(operators())
        .expect("operators");
    domain
        .declare_methods(
            "travel",
            [
                Method::new("travel_by_taxi", move |_: &TravelState, args: &[String]| {
                    by_taxi_calls.fetch_add(1, Ordering::Relaxed);
                    let (from, to) = route(args)?;
                    Ok(vec![
                        Task::new("call_taxi", vec![from.clone()]),
                        Task::new("ride_taxi", vec![from, to]),
                        Task::nullary("pay_driver"),
                    ])
                }),
                Method::new("travel_by_foot", move |_: &TravelState, args: &[String]| {
                    by_foot_calls.fetch_add(1, Ordering::Relaxed);
                    let (from, to) = route(args)?;
                    if distance(&from, &to) > 2 {
                        return Err(MethodFailure::not_applicable("too far to walk"));
                    }
                    Ok(vec![Task::new("walk", vec![from, to])])
                }),
            ],
        )
        .expect("methods");
    domain
}

/// `travel(from, to)` as a one-task list.
#[must_use]
pub fn travel_task(from: &str, to: &str) -> Vec<Task<String>> {
    vec![Task::new("travel", vec![from.to_string(), to.to_string()])]
}
