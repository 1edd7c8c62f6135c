//! `BlocksWorld`: classic single-hand block stacking.
//!
//! State variables:
//! - `pos[b]`: the table, the hand, or the block `b` sits on
//! - `clear[b]`: nothing sits on `b` and `b` is not held
//! - `holding`: the block in the hand, if any
//!
//! `move_blocks` classifies every block by [`status`] and moves the first
//! block that can go straight to its final place. When none can, it parks a
//! waiting block on the table and tries again.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use htn_kernel::carrier::state::PlanningState;
use htn_kernel::carrier::task::Task;
use htn_kernel::operators::domain::Domain;
use htn_kernel::operators::method_registry::{Decomposition, Method, MethodFailure};
use htn_kernel::operators::operator_registry::{ApplyFailure, ApplyResult, Operator};

use crate::contract::{HtnWorld, WorldError};

pub const BLOCKS_WORLD_ID: &str = "blocks_world";

const TABLE: &str = "table";

/// Where a block is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Place {
    Table,
    Hand,
    On(String),
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => f.write_str(TABLE),
            Self::Hand => f.write_str("hand"),
            Self::On(block) => f.write_str(block),
        }
    }
}

/// `on(block, support)` fact; `support` is a block name or `"table"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnRelation {
    pub block: String,
    pub on: String,
}

impl OnRelation {
    #[must_use]
    pub fn new(block: impl Into<String>, on: impl Into<String>) -> Self {
        Self {
            block: block.into(),
            on: on.into(),
        }
    }
}

/// Final support per block. Blocks not listed may end anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocksGoal {
    pub pos: BTreeMap<String, Place>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlocksArg {
    Block(String),
    Table,
    Goal(Arc<BlocksGoal>),
}

impl fmt::Display for BlocksArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block(name) => f.write_str(name),
            Self::Table => f.write_str(TABLE),
            Self::Goal(_) => f.write_str("goal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocksState {
    name: String,
    pub pos: BTreeMap<String, Place>,
    pub clear: BTreeMap<String, bool>,
    pub holding: Option<String>,
}

impl BlocksState {
    /// Derive `clear` from `pos`; the hand starts empty.
    #[must_use]
    pub fn new(name: impl Into<String>, pos: BTreeMap<String, Place>) -> Self {
        let clear = pos
            .keys()
            .map(|b| {
                let covered = pos.values().any(|p| *p == Place::On(b.clone()));
                (b.clone(), !covered)
            })
            .collect();
        Self {
            name: name.into(),
            pos,
            clear,
            holding: None,
        }
    }

    fn is_clear(&self, block: &str) -> bool {
        self.clear.get(block).copied().unwrap_or(false)
    }

    fn set_clear(&mut self, block: &str, value: bool) {
        if let Some(flag) = self.clear.get_mut(block) {
            *flag = value;
        }
    }
}

impl PlanningState for BlocksState {
    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

fn pickup(mut state: BlocksState, args: &[BlocksArg]) -> ApplyResult<BlocksState> {
    let [BlocksArg::Block(b)] = args else {
        return Err(ApplyFailure::arguments("pickup expects (block)"));
    };
    if state.pos.get(b) != Some(&Place::Table) || !state.is_clear(b) || state.holding.is_some() {
        return Err(ApplyFailure::precondition(format!(
            "{b} is not a clear block on the table with the hand empty"
        )));
    }
    state.pos.insert(b.clone(), Place::Hand);
    state.set_clear(b, false);
    state.holding = Some(b.clone());
    Ok(state)
}

fn unstack(mut state: BlocksState, args: &[BlocksArg]) -> ApplyResult<BlocksState> {
    let [BlocksArg::Block(b), BlocksArg::Block(c)] = args else {
        return Err(ApplyFailure::arguments("unstack expects (block, block)"));
    };
    if state.pos.get(b) != Some(&Place::On(c.clone()))
        || !state.is_clear(b)
        || state.holding.is_some()
    {
        return Err(ApplyFailure::precondition(format!(
            "{b} is not a clear block on {c} with the hand empty"
        )));
    }
    state.pos.insert(b.clone(), Place::Hand);
    state.set_clear(b, false);
    state.holding = Some(b.clone());
    state.set_clear(c, true);
    Ok(state)
}

fn putdown(mut state: BlocksState, args: &[BlocksArg]) -> ApplyResult<BlocksState> {
    let [BlocksArg::Block(b)] = args else {
        return Err(ApplyFailure::arguments("putdown expects (block)"));
    };
    if state.pos.get(b) != Some(&Place::Hand) {
        return Err(ApplyFailure::precondition(format!("{b} is not held")));
    }
    state.pos.insert(b.clone(), Place::Table);
    state.set_clear(b, true);
    state.holding = None;
    Ok(state)
}

fn stack(mut state: BlocksState, args: &[BlocksArg]) -> ApplyResult<BlocksState> {
    let [BlocksArg::Block(b), BlocksArg::Block(c)] = args else {
        return Err(ApplyFailure::arguments("stack expects (block, block)"));
    };
    if state.pos.get(b) != Some(&Place::Hand) || !state.is_clear(c) {
        return Err(ApplyFailure::precondition(format!(
            "{b} is not held or {c} is not clear"
        )));
    }
    state.pos.insert(b.clone(), Place::On(c.clone()));
    state.set_clear(b, true);
    state.holding = None;
    state.set_clear(c, false);
    Ok(state)
}

// ---------------------------------------------------------------------------
// Status classification
// ---------------------------------------------------------------------------

/// What `move_blocks` should do with a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    /// The block and everything under it are in their final places.
    Done,
    /// Something sits on the block.
    Inaccessible,
    MoveToTable,
    MoveToBlock,
    /// Its destination is not ready yet.
    Waiting,
}

/// True if `block` and every block below it will never need to move again.
fn is_done(state: &BlocksState, goal: &BlocksGoal, block: &str) -> bool {
    let mut current = block.to_string();
    // Support chains are acyclic; the bound guards malformed states.
    for _ in 0..=state.pos.len() {
        let here = state.pos.get(&current);
        if let Some(target) = goal.pos.get(&current) {
            if here != Some(target) {
                return false;
            }
        }
        match here {
            Some(Place::On(below)) => current.clone_from(below),
            Some(Place::Table) => return true,
            Some(Place::Hand) | None => return false,
        }
    }
    false
}

#[must_use]
pub fn status(state: &BlocksState, goal: &BlocksGoal, block: &str) -> BlockStatus {
    if is_done(state, goal, block) {
        return BlockStatus::Done;
    }
    if !state.is_clear(block) {
        return BlockStatus::Inaccessible;
    }
    match goal.pos.get(block) {
        None | Some(Place::Table) => BlockStatus::MoveToTable,
        Some(Place::On(target)) if is_done(state, goal, target) && state.is_clear(target) => {
            BlockStatus::MoveToBlock
        }
        Some(_) => BlockStatus::Waiting,
    }
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

fn move_one_task(block: &str, dest: BlocksArg, goal: &Arc<BlocksGoal>) -> Vec<Task<BlocksArg>> {
    vec![
        Task::new("move_one", vec![BlocksArg::Block(block.to_string()), dest]),
        Task::new("move_blocks", vec![BlocksArg::Goal(Arc::clone(goal))]),
    ]
}

fn move_blocks(state: &BlocksState, args: &[BlocksArg]) -> Decomposition<BlocksArg> {
    let [BlocksArg::Goal(goal)] = args else {
        return Err(MethodFailure::arguments("move_blocks expects (goal)"));
    };

    for block in state.clear.keys() {
        match status(state, goal, block) {
            BlockStatus::MoveToTable => {
                return Ok(move_one_task(block, BlocksArg::Table, goal));
            }
            BlockStatus::MoveToBlock => {
                if let Some(Place::On(target)) = goal.pos.get(block) {
                    return Ok(move_one_task(
                        block,
                        BlocksArg::Block(target.clone()),
                        goal,
                    ));
                }
            }
            _ => {}
        }
    }

    // No block can reach its final place: park a waiting block on the table.
    let parked = state.clear.keys().find(|b| {
        status(state, goal, b) == BlockStatus::Waiting && state.pos.get(*b) != Some(&Place::Table)
    });
    if let Some(block) = parked {
        return Ok(move_one_task(block, BlocksArg::Table, goal));
    }

    if state
        .clear
        .keys()
        .all(|b| status(state, goal, b) == BlockStatus::Done)
    {
        Ok(vec![])
    } else {
        Err(MethodFailure::not_applicable("no block can be moved"))
    }
}

fn move_one(_: &BlocksState, args: &[BlocksArg]) -> Decomposition<BlocksArg> {
    let [block @ BlocksArg::Block(_), dest @ (BlocksArg::Block(_) | BlocksArg::Table)] = args else {
        return Err(MethodFailure::arguments("move_one expects (block, dest)"));
    };
    Ok(vec![
        Task::new("get", vec![block.clone()]),
        Task::new("put", vec![block.clone(), dest.clone()]),
    ])
}

fn get(state: &BlocksState, args: &[BlocksArg]) -> Decomposition<BlocksArg> {
    let [BlocksArg::Block(b)] = args else {
        return Err(MethodFailure::arguments("get expects (block)"));
    };
    if !state.is_clear(b) {
        return Err(MethodFailure::not_applicable(format!("{b} is not clear")));
    }
    match state.pos.get(b) {
        Some(Place::Table) => Ok(vec![Task::new("pickup", args.to_vec())]),
        Some(Place::On(c)) => Ok(vec![Task::new(
            "unstack",
            vec![BlocksArg::Block(b.clone()), BlocksArg::Block(c.clone())],
        )]),
        Some(Place::Hand) | None => Err(MethodFailure::not_applicable(format!(
            "{b} cannot be picked up"
        ))),
    }
}

fn put(state: &BlocksState, args: &[BlocksArg]) -> Decomposition<BlocksArg> {
    let [BlocksArg::Block(b), dest] = args else {
        return Err(MethodFailure::arguments("put expects (block, dest)"));
    };
    if state.holding.as_deref() != Some(b.as_str()) {
        return Err(MethodFailure::not_applicable(format!("{b} is not held")));
    }
    match dest {
        BlocksArg::Table => Ok(vec![Task::new("putdown", vec![BlocksArg::Block(b.clone())])]),
        BlocksArg::Block(_) => Ok(vec![Task::new("stack", args.to_vec())]),
        BlocksArg::Goal(_) => Err(MethodFailure::arguments("put destination is a goal")),
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BlocksWorld {
    start: BlocksState,
    goal: Arc<BlocksGoal>,
}

impl BlocksWorld {
    /// Build a problem from `on(x, y)` facts.
    ///
    /// The start facts define the blocks. Goal facts override the start
    /// position of the blocks they name; every other block keeps its start
    /// position as its goal.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownBlock`] for the first goal or support name that is
    /// not a start block; [`WorldError::InvalidProblem`] for a block placed on
    /// itself, listed twice, supporting two blocks, or resting on a chain that
    /// loops back to it.
    pub fn from_on_relations(
        start: &[OnRelation],
        goal: &[OnRelation],
    ) -> Result<Self, WorldError> {
        let start_pos = Self::positions(start, None)?;
        let mut goal_pos = start_pos.clone();
        for (block, place) in Self::positions(goal, Some(&start_pos))? {
            goal_pos.insert(block, place);
        }
        Self::check_acyclic(&start_pos)?;
        Self::check_acyclic(&goal_pos)?;
        Ok(Self {
            start: BlocksState::new("Start state", start_pos),
            goal: Arc::new(BlocksGoal { pos: goal_pos }),
        })
    }

    fn positions(
        facts: &[OnRelation],
        known: Option<&BTreeMap<String, Place>>,
    ) -> Result<BTreeMap<String, Place>, WorldError> {
        let is_known = |name: &str, own: &BTreeMap<String, Place>| match known {
            Some(k) => k.contains_key(name),
            None => own.contains_key(name) || facts.iter().any(|f| f.block == name),
        };

        let mut pos = BTreeMap::new();
        for fact in facts {
            if !is_known(fact.block.as_str(), &pos) {
                return Err(WorldError::UnknownBlock {
                    name: fact.block.clone(),
                });
            }
            let place = if fact.on == TABLE {
                Place::Table
            } else if fact.on == fact.block {
                return Err(WorldError::InvalidProblem {
                    detail: format!("{} cannot be on itself", fact.block),
                });
            } else if is_known(fact.on.as_str(), &pos) {
                Place::On(fact.on.clone())
            } else {
                return Err(WorldError::UnknownBlock {
                    name: fact.on.clone(),
                });
            };
            if pos.insert(fact.block.clone(), place).is_some() {
                return Err(WorldError::InvalidProblem {
                    detail: format!("{} is listed twice", fact.block),
                });
            }
        }

        for support in pos.values() {
            if let Place::On(below) = support {
                if pos.values().filter(|p| *p == support).count() > 1 {
                    return Err(WorldError::InvalidProblem {
                        detail: format!("more than one block on {below}"),
                    });
                }
            }
        }
        Ok(pos)
    }

    /// Every support chain must end on the table.
    fn check_acyclic(pos: &BTreeMap<String, Place>) -> Result<(), WorldError> {
        for start in pos.keys() {
            let mut current = start;
            for _ in 0..pos.len() {
                match pos.get(current) {
                    Some(Place::On(below)) => current = below,
                    _ => break,
                }
                if current == start {
                    return Err(WorldError::InvalidProblem {
                        detail: format!("support cycle through {start}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// `a`, `b`, `c` on the table; build the tower `a` on `b` on `c`.
    #[must_use]
    pub fn stacking_problem() -> Self {
        let start: BTreeMap<String, Place> = ["a", "b", "c"]
            .into_iter()
            .map(|b| (b.to_string(), Place::Table))
            .collect();
        let mut goal = start.clone();
        goal.insert("a".into(), Place::On("b".into()));
        goal.insert("b".into(), Place::On("c".into()));
        Self {
            start: BlocksState::new("Start state", start),
            goal: Arc::new(BlocksGoal { pos: goal }),
        }
    }

    #[must_use]
    pub fn goal(&self) -> &BlocksGoal {
        &self.goal
    }
}

impl HtnWorld for BlocksWorld {
    type State = BlocksState;
    type Arg = BlocksArg;

    fn world_id(&self) -> &str {
        BLOCKS_WORLD_ID
    }

    fn domain(&self) -> Result<Domain<BlocksState, BlocksArg>, WorldError> {
        let mut domain = Domain::new(BLOCKS_WORLD_ID);
        domain
            .declare_operators([
                Operator::new("pickup", pickup),
                Operator::new("unstack", unstack),
                Operator::new("putdown", putdown),
                Operator::new("stack", stack),
            ])?
            .declare_methods("put", [Method::new("put_held_block", put)])?
            .declare_methods("get", [Method::new("get_clear_block", get)])?
            .declare_methods("move_one", [Method::new("get_then_put", move_one)])?
            .declare_methods("move_blocks", [Method::new("move_by_status", move_blocks)])?;
        Ok(domain)
    }

    fn start_state(&self) -> BlocksState {
        self.start.clone()
    }

    fn initial_tasks(&self) -> Vec<Task<BlocksArg>> {
        vec![Task::new(
            "move_blocks",
            vec![BlocksArg::Goal(Arc::clone(&self.goal))],
        )]
    }

    fn goal_satisfied(&self, state: &BlocksState) -> bool {
        state.holding.is_none()
            && self
                .goal
                .pos
                .iter()
                .all(|(block, target)| state.pos.get(block) == Some(target))
    }
}
