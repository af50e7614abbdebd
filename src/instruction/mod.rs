//! Player instructions.
//!
//! An instruction is one action a player wants carried out during a turn:
//! founding a headquarter, spawning troops, or moving troops between
//! territories. Instructions only act once they belong to an
//! [`InstructionSet`], which classifies movements against each other and owns
//! their execution state.

pub mod movement;
pub mod natural;
pub mod set;

use std::fmt;

use thiserror::Error;

use crate::world::{PlayerId, TerritoryId, WorldError};

pub use movement::{Movement, MovementChain, MovementKind};
pub use natural::{CreateHeadquarter, SpawnTroops};
pub use set::InstructionSet;

/// Position of an instruction inside its [`InstructionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstructionId(pub usize);

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of an instruction. Only the cycle breaker ever moves an
/// instruction backwards, from `Executing` to `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionState {
    #[default]
    NotStarted,
    Executing,
    Executed,
}

/// Classification of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    CreateHeadquarter,
    SpawnTroops,
    Movement(MovementKind),
}

/// Validation failures. Raised before the world is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionError {
    #[error("player {issuer} does not own territory {territory}")]
    IssuerDoesNotOwnTerritory {
        issuer: PlayerId,
        territory: TerritoryId,
    },

    #[error("territory {territory} holds {available} troops, {requested} requested")]
    InsufficientTroops {
        territory: TerritoryId,
        requested: u32,
        available: u32,
    },

    #[error("territory {destination} is not adjacent to {origin}")]
    TargetTerritoryNotAdjacent {
        origin: TerritoryId,
        destination: TerritoryId,
    },

    #[error("territory {0} is not neutral")]
    TerritoryNotNeutral(TerritoryId),

    #[error("player {0} already owns territory")]
    IssuerAlreadyPresentInWorld(PlayerId),

    #[error("territory {0} borders a non-empty territory")]
    AdjacentTerritoryNotEmpty(TerritoryId),

    #[error("player {issuer} may only spawn in a headquarter, {territory} has none")]
    SpawnNotInHeadquarter {
        issuer: PlayerId,
        territory: TerritoryId,
    },

    #[error("player {issuer} holds {available} influence points, {required} required")]
    InsufficientInfluencePoints {
        issuer: PlayerId,
        required: u32,
        available: u32,
    },

    #[error("movement chain is empty")]
    EmptyChain,

    #[error("movement {index} of the chain does not start where the previous one ended")]
    MovementsNotChained { index: usize },

    #[error("movement {index} of the chain has a different issuer")]
    ChainIssuerMismatch { index: usize },

    #[error(transparent)]
    World(#[from] WorldError),
}

/// Failures raised while executing an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("no instruction {0} in this set")]
    UnknownInstruction(InstructionId),

    #[error("instruction {0} was already executed")]
    AlreadyExecuted(InstructionId),

    #[error("instruction {0} is already executing")]
    AlreadyExecuting(InstructionId),

    #[error("instruction {0} is a skirmish without skirmish peers")]
    NoSkirmishPeers(InstructionId),

    #[error("instruction {0} was never classified")]
    Unclassified(InstructionId),

    #[error("invalid instruction: {0}")]
    Invalid(#[from] InstructionError),

    #[error(transparent)]
    World(#[from] WorldError),
}

/// Any instruction a player can issue.
#[derive(Debug, Clone)]
pub enum Instruction {
    CreateHeadquarter(CreateHeadquarter),
    SpawnTroops(SpawnTroops),
    Movement(Movement),
}

impl Instruction {
    pub fn issuer(&self) -> PlayerId {
        match self {
            Instruction::CreateHeadquarter(i) => i.issuer,
            Instruction::SpawnTroops(i) => i.issuer,
            Instruction::Movement(m) => m.issuer,
        }
    }

    pub fn state(&self) -> ExecutionState {
        match self {
            Instruction::CreateHeadquarter(i) => i.state,
            Instruction::SpawnTroops(i) => i.state,
            Instruction::Movement(m) => m.state,
        }
    }

    /// `None` for a movement that has not joined a set yet.
    pub fn kind(&self) -> Option<InstructionKind> {
        match self {
            Instruction::CreateHeadquarter(_) => Some(InstructionKind::CreateHeadquarter),
            Instruction::SpawnTroops(_) => Some(InstructionKind::SpawnTroops),
            Instruction::Movement(m) => m.kind.map(InstructionKind::Movement),
        }
    }

    pub fn is_executed(&self) -> bool {
        self.state() == ExecutionState::Executed
    }

    pub fn as_movement(&self) -> Option<&Movement> {
        match self {
            Instruction::Movement(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::CreateHeadquarter(i) => {
                write!(f, "create headquarter ({} at {})", i.issuer, i.territory)
            }
            Instruction::SpawnTroops(i) => {
                let bonus = if i.bonus { "bonus " } else { "" };
                write!(f, "spawn {}troops ({} at {})", bonus, i.issuer, i.territory)
            }
            Instruction::Movement(m) => fmt::Display::fmt(m, f),
        }
    }
}

impl From<CreateHeadquarter> for Instruction {
    fn from(i: CreateHeadquarter) -> Self {
        Instruction::CreateHeadquarter(i)
    }
}

impl From<SpawnTroops> for Instruction {
    fn from(i: SpawnTroops) -> Self {
        Instruction::SpawnTroops(i)
    }
}

impl From<Movement> for Instruction {
    fn from(m: Movement) -> Self {
        Instruction::Movement(m)
    }
}
