//! Proof module: content hashing and plan replay.
//!
//! Depends on `carrier` and `operators`. Nothing depends on `proof` within the kernel.

pub mod hash;
pub mod hash_domain;
pub mod replay;
