//! HTN Kernel: the domain-independent core of the planner.
//!
//! # API Surface
//!
//! - [`carrier::task::Task`] and [`carrier::state::PlanningState`] -- what the
//!   search manipulates
//! - [`operators::domain::Domain`] -- operator and method registries, resolved
//!   by task name
//! - [`proof::replay::replay`] -- re-apply a plan from its start state
//!
//! # Module Dependency Direction
//!
//! `carrier` ← `operators` ← `proof`
//!
//! One-way only. No cycles. The search loop itself lives in `htn_search`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod carrier;
pub mod operators;
pub mod proof;
