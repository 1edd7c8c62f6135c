//! Operators module: operator and method registries plus the `Domain` that
//! owns them.
//!
//! Depends on `carrier`. Does not import from `proof`.

pub mod domain;
pub mod method_registry;
pub mod operator_registry;
