//! `BaxterSwap`: a two-handed robot rearranging blocks between three spots.
//!
//! Locations are `center` (reachable by both hands) and the slots `t1`
//! (left hand only) and `t2` (right hand only). A slot accepts a block only
//! after the block that started there has been picked up ("vacated").
//!
//! Operators: `pickup(block, hand)`, `place(block, dest, hand)`.
//! Methods: `move_blocks(goal)`, `move_one(block, dest, hand)`,
//! `get(block, hand)`, `put(block, dest, hand)`.
//!
//! The default problem swaps the slot blocks: red stays at center, blue moves
//! `t1 → t2`, green moves `t2 → t1`. Both slot blocks have to be parked at
//! center first, giving an 8-step plan.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use htn_kernel::carrier::state::PlanningState;
use htn_kernel::carrier::task::Task;
use htn_kernel::operators::domain::Domain;
use htn_kernel::operators::method_registry::{Decomposition, Method, MethodFailure};
use htn_kernel::operators::operator_registry::{ApplyFailure, ApplyResult, Operator};

use crate::contract::{HtnWorld, WorldError};

pub const BAXTER_SWAP_ID: &str = "baxter_swap";

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    /// The slot this hand serves.
    #[must_use]
    pub fn slot(self) -> Location {
        match self {
            Self::Left => Location::T1,
            Self::Right => Location::T2,
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Center,
    T1,
    T2,
    /// In a gripper.
    Held(Hand),
}

impl Location {
    #[must_use]
    pub fn is_slot(self) -> bool {
        matches!(self, Self::T1 | Self::T2)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Center => f.write_str("center"),
            Self::T1 => f.write_str("t1"),
            Self::T2 => f.write_str("t2"),
            Self::Held(hand) => write!(f, "{hand}"),
        }
    }
}

/// Target position per block. Blocks not listed are unconstrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaxterGoal {
    pub pos: BTreeMap<String, Location>,
}

/// Task argument vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaxterArg {
    Block(String),
    Location(Location),
    Hand(Hand),
    Goal(Arc<BaxterGoal>),
}

impl fmt::Display for BaxterArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block(name) => f.write_str(name),
            Self::Location(loc) => write!(f, "{loc}"),
            Self::Hand(hand) => write!(f, "{hand}"),
            Self::Goal(_) => f.write_str("goal"),
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaxterState {
    name: String,
    pub pos: BTreeMap<String, Location>,
    pub holding_left: Option<String>,
    pub holding_right: Option<String>,
    /// Slots whose original block has been picked up and not yet replaced.
    pub vacated: BTreeSet<Location>,
}

impl BaxterState {
    /// Both hands empty, no slot vacated.
    #[must_use]
    pub fn new(name: impl Into<String>, pos: BTreeMap<String, Location>) -> Self {
        Self {
            name: name.into(),
            pos,
            holding_left: None,
            holding_right: None,
            vacated: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn holding(&self, hand: Hand) -> Option<&str> {
        match hand {
            Hand::Left => self.holding_left.as_deref(),
            Hand::Right => self.holding_right.as_deref(),
        }
    }

    fn holding_mut(&mut self, hand: Hand) -> &mut Option<String> {
        match hand {
            Hand::Left => &mut self.holding_left,
            Hand::Right => &mut self.holding_right,
        }
    }

    #[must_use]
    pub fn hands_empty(&self) -> bool {
        self.holding_left.is_none() && self.holding_right.is_none()
    }
}

impl PlanningState for BaxterState {
    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

fn pickup(mut state: BaxterState, args: &[BaxterArg]) -> ApplyResult<BaxterState> {
    let [BaxterArg::Block(block), BaxterArg::Hand(hand)] = args else {
        return Err(ApplyFailure::arguments("pickup expects (block, hand)"));
    };
    let hand = *hand;
    let Some(&from) = state.pos.get(block) else {
        return Err(ApplyFailure::precondition(format!("unknown block {block}")));
    };
    if from != Location::Center && from != hand.slot() {
        return Err(ApplyFailure::precondition(format!(
            "{block} at {from} is out of reach of the {hand} hand"
        )));
    }
    if state.holding(hand).is_some() {
        return Err(ApplyFailure::precondition(format!("{hand} hand is full")));
    }

    if from.is_slot() {
        state.vacated.insert(from);
    }
    state.pos.insert(block.clone(), Location::Held(hand));
    *state.holding_mut(hand) = Some(block.clone());
    Ok(state)
}

fn place(mut state: BaxterState, args: &[BaxterArg]) -> ApplyResult<BaxterState> {
    let [BaxterArg::Block(block), BaxterArg::Location(dest), BaxterArg::Hand(hand)] = args else {
        return Err(ApplyFailure::arguments("place expects (block, dest, hand)"));
    };
    let (dest, hand) = (*dest, *hand);
    if state.pos.get(block) != Some(&Location::Held(hand)) {
        return Err(ApplyFailure::precondition(format!(
            "{block} is not held by the {hand} hand"
        )));
    }
    match dest {
        Location::Center => {}
        Location::T1 | Location::T2 => {
            if dest != hand.slot() {
                return Err(ApplyFailure::precondition(format!(
                    "{dest} is out of reach of the {hand} hand"
                )));
            }
            if !state.vacated.remove(&dest) {
                return Err(ApplyFailure::precondition(format!("{dest} is occupied")));
            }
        }
        Location::Held(_) => {
            return Err(ApplyFailure::arguments("cannot place a block into a hand"));
        }
    }

    state.pos.insert(block.clone(), dest);
    *state.holding_mut(hand) = None;
    Ok(state)
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

fn move_one_task(block: &str, dest: Location, hand: Hand) -> Task<BaxterArg> {
    Task::new(
        "move_one",
        vec![
            BaxterArg::Block(block.to_string()),
            BaxterArg::Location(dest),
            BaxterArg::Hand(hand),
        ],
    )
}

/// One move toward `goal`, then `move_blocks` again. A slot block heading
/// anywhere else goes to center first; a center block goes to its slot once
/// the slot is vacated.
fn move_blocks(state: &BaxterState, args: &[BaxterArg]) -> Decomposition<BaxterArg> {
    let [BaxterArg::Goal(goal)] = args else {
        return Err(MethodFailure::arguments("move_blocks expects (goal)"));
    };

    let mut unsatisfied = false;
    for (block, &here) in &state.pos {
        let Some(&target) = goal.pos.get(block) else {
            continue;
        };
        if here == target {
            continue;
        }
        unsatisfied = true;

        let step = match (here, target) {
            (Location::T1, Location::Center | Location::T2) => Some((Location::Center, Hand::Left)),
            (Location::T2, Location::Center | Location::T1) => {
                Some((Location::Center, Hand::Right))
            }
            (Location::Center, Location::T1) if state.vacated.contains(&Location::T1) => {
                Some((Location::T1, Hand::Left))
            }
            (Location::Center, Location::T2) if state.vacated.contains(&Location::T2) => {
                Some((Location::T2, Hand::Right))
            }
            _ => None,
        };
        if let Some((dest, hand)) = step {
            return Ok(vec![
                move_one_task(block, dest, hand),
                Task::new("move_blocks", vec![BaxterArg::Goal(Arc::clone(goal))]),
            ]);
        }
    }

    if unsatisfied {
        Err(MethodFailure::not_applicable(
            "no misplaced block can move toward its goal",
        ))
    } else {
        Ok(vec![])
    }
}

fn move_one(_: &BaxterState, args: &[BaxterArg]) -> Decomposition<BaxterArg> {
    let [block @ BaxterArg::Block(_), dest @ BaxterArg::Location(_), hand @ BaxterArg::Hand(_)] =
        args
    else {
        return Err(MethodFailure::arguments("move_one expects (block, dest, hand)"));
    };
    Ok(vec![
        Task::new("get", vec![block.clone(), hand.clone()]),
        Task::new("put", vec![block.clone(), dest.clone(), hand.clone()]),
    ])
}

fn get(_: &BaxterState, args: &[BaxterArg]) -> Decomposition<BaxterArg> {
    let [BaxterArg::Block(_), BaxterArg::Hand(_)] = args else {
        return Err(MethodFailure::arguments("get expects (block, hand)"));
    };
    Ok(vec![Task::new("pickup", args.to_vec())])
}

fn put(state: &BaxterState, args: &[BaxterArg]) -> Decomposition<BaxterArg> {
    let [BaxterArg::Block(block), BaxterArg::Location(_), BaxterArg::Hand(_)] = args else {
        return Err(MethodFailure::arguments("put expects (block, dest, hand)"));
    };
    let held = [Hand::Left, Hand::Right]
        .into_iter()
        .any(|h| state.holding(h) == Some(block.as_str()));
    if !held {
        return Err(MethodFailure::not_applicable(format!("{block} is not held")));
    }
    Ok(vec![Task::new("place", args.to_vec())])
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// A Baxter swap problem: start positions and goal positions.
#[derive(Debug, Clone)]
pub struct BaxterSwapWorld {
    start: BaxterState,
    goal: Arc<BaxterGoal>,
}

impl BaxterSwapWorld {
    /// Build a problem from start and goal positions.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownBlock`] if the goal names a block with no start
    /// position; [`WorldError::InvalidProblem`] if any position is a hand or
    /// two blocks start in the same slot.
    pub fn new(
        start: BTreeMap<String, Location>,
        goal: BTreeMap<String, Location>,
    ) -> Result<Self, WorldError> {
        for (block, loc) in start.iter().chain(goal.iter()) {
            if let Location::Held(_) = loc {
                return Err(WorldError::InvalidProblem {
                    detail: format!("{block} cannot start or end in a hand"),
                });
            }
        }
        for slot in [Location::T1, Location::T2] {
            if start.values().filter(|&&loc| loc == slot).count() > 1 {
                return Err(WorldError::InvalidProblem {
                    detail: format!("more than one block starts at {slot}"),
                });
            }
        }
        if let Some(unknown) = goal.keys().find(|b| !start.contains_key(*b)) {
            return Err(WorldError::UnknownBlock {
                name: unknown.clone(),
            });
        }
        Ok(Self {
            start: BaxterState::new("Start state", start),
            goal: Arc::new(BaxterGoal { pos: goal }),
        })
    }

    /// Red at center, blue at `t1`, green at `t2`; swap blue and green.
    #[must_use]
    pub fn swap_problem() -> Self {
        let start = BTreeMap::from([
            ("red".to_string(), Location::Center),
            ("blue".to_string(), Location::T1),
            ("green".to_string(), Location::T2),
        ]);
        let goal = BTreeMap::from([
            ("red".to_string(), Location::Center),
            ("blue".to_string(), Location::T2),
            ("green".to_string(), Location::T1),
        ]);
        Self {
            start: BaxterState::new("Start state", start),
            goal: Arc::new(BaxterGoal { pos: goal }),
        }
    }

    #[must_use]
    pub fn goal(&self) -> &BaxterGoal {
        &self.goal
    }
}

impl HtnWorld for BaxterSwapWorld {
    type State = BaxterState;
    type Arg = BaxterArg;

    fn world_id(&self) -> &str {
        BAXTER_SWAP_ID
    }

    fn domain(&self) -> Result<Domain<BaxterState, BaxterArg>, WorldError> {
        let mut domain = Domain::new(BAXTER_SWAP_ID);
        domain
            .declare_operators([Operator::new("pickup", pickup), Operator::new("place", place)])?
            .declare_methods("put", [Method::new("place_held_block", put)])?
            .declare_methods("get", [Method::new("pickup_block", get)])?
            .declare_methods("move_one", [Method::new("get_then_put", move_one)])?
            .declare_methods("move_blocks", [Method::new("advance_one_block", move_blocks)])?;
        Ok(domain)
    }

    fn start_state(&self) -> BaxterState {
        self.start.clone()
    }

    fn initial_tasks(&self) -> Vec<Task<BaxterArg>> {
        vec![Task::new(
            "move_blocks",
            vec![BaxterArg::Goal(Arc::clone(&self.goal))],
        )]
    }

    fn goal_satisfied(&self, state: &BaxterState) -> bool {
        state.hands_empty()
            && self
                .goal
                .pos
                .iter()
                .all(|(block, target)| state.pos.get(block) == Some(target))
    }
}
