//! Carrier module: the values the planner moves around (tasks and states).
//!
//! Depends on nothing internal.

pub mod state;
pub mod task;
