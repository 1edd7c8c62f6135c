//! Planning worlds.
//!
//! - [`baxter_swap`]: two-handed robot swapping blocks between slots
//! - [`blocks_world`]: classic single-hand block stacking

pub mod baxter_swap;
pub mod blocks_world;
