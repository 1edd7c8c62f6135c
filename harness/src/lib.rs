//! HTN Harness: world-level orchestration for the planner.
//!
//! The harness runs a world through the planning pipeline
//! (`domain` → `run_traced` → `replay` → goal check) and packages the result
//! as a content-addressed report that can be written to and verified from
//! disk.
//!
//! The harness does NOT implement search or hashing; it delegates to
//! `htn_search` and `htn_kernel`. Worlds provide domain data only; the
//! harness owns orchestration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod problem;
pub mod report;
pub mod report_dir;
pub mod runner;
pub mod worlds;
