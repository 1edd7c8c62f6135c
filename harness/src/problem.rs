//! JSON problem files.
//!
//! ```json
//! {"world": "baxter_swap",
//!  "start": {"red": "center", "blue": "t1", "green": "t2"},
//!  "goal":  {"red": "center", "blue": "t2", "green": "t1"}}
//!
//! {"world": "blocks_world",
//!  "start": [{"block": "a", "on": "table"}, {"block": "b", "on": "table"}],
//!  "goal":  [{"block": "a", "on": "b"}]}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contract::WorldError;
use crate::worlds::baxter_swap::{BaxterSwapWorld, Location};
use crate::worlds::blocks_world::{BlocksWorld, OnRelation};

#[derive(Debug, thiserror::Error)]
pub enum ProblemError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid problem file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    World(#[from] WorldError),
}

/// A problem description, tagged by world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "world", rename_all = "snake_case")]
pub enum ProblemFileV1 {
    BaxterSwap {
        start: BTreeMap<String, Location>,
        goal: BTreeMap<String, Location>,
    },
    BlocksWorld {
        start: Vec<OnRelation>,
        goal: Vec<OnRelation>,
    },
}

/// A problem turned into a runnable world.
#[derive(Debug, Clone)]
pub enum LoadedProblem {
    BaxterSwap(BaxterSwapWorld),
    BlocksWorld(BlocksWorld),
}

impl ProblemFileV1 {
    /// # Errors
    ///
    /// Returns [`ProblemError::Parse`] if the bytes are not a problem file.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ProblemError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// # Errors
    ///
    /// Returns [`ProblemError::Io`] or [`ProblemError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ProblemError> {
        let bytes = std::fs::read(path).map_err(|source| ProblemError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&bytes)
    }

    /// Validate the facts and build the world.
    ///
    /// # Errors
    ///
    /// Returns the world constructor's [`WorldError`].
    pub fn into_world(self) -> Result<LoadedProblem, ProblemError> {
        Ok(match self {
            Self::BaxterSwap { start, goal } => {
                LoadedProblem::BaxterSwap(BaxterSwapWorld::new(start, goal)?)
            }
            Self::BlocksWorld { start, goal } => {
                LoadedProblem::BlocksWorld(BlocksWorld::from_on_relations(&start, &goal)?)
            }
        })
    }
}
