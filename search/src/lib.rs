//! HTN Search: depth-first task decomposition with chronological backtracking.
//!
//! This crate provides the planner for the HTN engine. It depends only on
//! `htn_kernel`; it does NOT depend on `htn_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! htn_kernel  ←  htn_search  ←  htn_harness
//! (registries)   (planner,      (worlds, runner,
//!                 trace)         reports, CLI)
//! ```
//!
//! # Key types
//!
//! - [`search::Planner`] -- the backtracking search over a [`htn_kernel::operators::domain::Domain`]
//! - [`plan::Plan`] -- the ordered primitive steps of the first plan found
//! - [`trace::PlanTraceV1`] -- decision audit log (one event per operator/method attempt)
//! - [`policy::PlannerPolicy`] -- depth bound and trace recording configuration
//! - [`error::PlanFailure`] -- explicit failure value when no plan exists

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod plan;
pub mod policy;
pub mod search;
pub mod trace;
