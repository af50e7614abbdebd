//! Troop movements and movement chains.

use std::fmt;

use super::{ExecutionState, InstructionError, InstructionId};
use crate::world::{PlayerId, TerritoryId, World};

/// How a movement is resolved, decided when it joins an instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementKind {
    /// Into a neutral territory.
    Expansion,
    /// Between two territories of the issuer.
    Distribution,
    /// Into a territory owned by another player.
    Invasion,
    /// One of several movements by different players into the same territory.
    Skirmish,
}

/// An order to move troops from `origin` to `destination`.
#[derive(Debug, Clone)]
pub struct Movement {
    pub(crate) issuer: PlayerId,
    pub(crate) origin: TerritoryId,
    pub(crate) destination: TerritoryId,
    pub(crate) troops: u32,
    pub(crate) kind: Option<MovementKind>,
    /// Troops accounted for so far: moved, or lost to penalties and trades.
    pub(crate) moved: u32,
    pub(crate) state: ExecutionState,
    pub(crate) partial: bool,
    pub(crate) loop_member: bool,
    pub(crate) skirmish_peers: Vec<InstructionId>,
    pub(crate) mutual_invasion: Option<InstructionId>,
}

impl Movement {
    pub fn new(
        issuer: PlayerId,
        origin: TerritoryId,
        destination: TerritoryId,
        troops: u32,
    ) -> Self {
        Movement {
            issuer,
            origin,
            destination,
            troops,
            kind: None,
            moved: 0,
            state: ExecutionState::NotStarted,
            partial: false,
            loop_member: false,
            skirmish_peers: Vec::new(),
            mutual_invasion: None,
        }
    }

    /// Lets the movement go ahead with fewer troops than requested.
    pub fn allow_partial(mut self) -> Self {
        self.partial = true;
        self
    }

    /// Returns the player who issued the movement.
    pub fn issuer(&self) -> PlayerId {
        self.issuer
    }

    /// Returns the territory the troops leave.
    pub fn origin(&self) -> TerritoryId {
        self.origin
    }

    /// Returns the territory the troops head for.
    pub fn destination(&self) -> TerritoryId {
        self.destination
    }

    /// Requested troop count.
    pub fn troops(&self) -> u32 {
        self.troops
    }

    /// Returns the classification, or `None` before the movement joins a set.
    pub fn kind(&self) -> Option<MovementKind> {
        self.kind
    }

    /// Returns the troops accounted for so far, including losses.
    pub fn moved(&self) -> u32 {
        self.moved
    }

    /// Returns the troops still owed to the destination.
    pub fn remaining(&self) -> u32 {
        self.troops.saturating_sub(self.moved)
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn is_executed(&self) -> bool {
        self.state == ExecutionState::Executed
    }

    /// Returns true if the movement was built with [`Movement::allow_partial`].
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// Whether this movement sat in a cycle of invasions that had to be broken.
    pub fn is_loop_member(&self) -> bool {
        self.loop_member
    }

    /// Returns the other movements fighting over the same destination.
    pub fn skirmish_peers(&self) -> &[InstructionId] {
        &self.skirmish_peers
    }

    /// Returns the invasion coming the other way, if any.
    pub fn mutual_invasion(&self) -> Option<InstructionId> {
        self.mutual_invasion
    }

    /// Checks ownership, troop count and adjacency without touching the world.
    pub fn validate(&self, world: &World, allow_partial: bool) -> Result<(), InstructionError> {
        let origin = world.territory(self.origin)?;
        world.territory(self.destination)?;

        if origin.owner() != Some(self.issuer) {
            return Err(InstructionError::IssuerDoesNotOwnTerritory {
                issuer: self.issuer,
                territory: self.origin,
            });
        }

        let available = origin.troops();
        if self.troops > available && !allow_partial {
            return Err(InstructionError::InsufficientTroops {
                territory: self.origin,
                requested: self.troops,
                available,
            });
        }

        if !world.is_adjacent(self.origin, self.destination) {
            return Err(InstructionError::TargetTerritoryNotAdjacent {
                origin: self.origin,
                destination: self.destination,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -[{}/{}]-> {}",
            self.issuer,
            self.origin,
            self.remaining(),
            self.troops,
            self.destination
        )
    }
}

/// Consecutive movements by one player, each starting where the previous
/// one ended. A turn unrolls a chain into its movements.
#[derive(Debug, Clone)]
pub struct MovementChain {
    movements: Vec<Movement>,
}

impl MovementChain {
    /// Builds a chain from `(origin, troops, destination)` links.
    pub fn new(issuer: PlayerId, links: &[(TerritoryId, u32, TerritoryId)]) -> Self {
        let movements = links
            .iter()
            .map(|&(origin, troops, destination)| Movement::new(issuer, origin, destination, troops))
            .collect();
        MovementChain { movements }
    }

    pub fn from_movements(movements: Vec<Movement>) -> Self {
        MovementChain { movements }
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn validate(&self) -> Result<(), InstructionError> {
        let first = self.movements.first().ok_or(InstructionError::EmptyChain)?;
        for (index, pair) in self.movements.windows(2).enumerate() {
            let index = index + 1;
            if pair[1].origin != pair[0].destination {
                return Err(InstructionError::MovementsNotChained { index });
            }
            if pair[1].issuer != first.issuer {
                return Err(InstructionError::ChainIssuerMismatch { index });
            }
        }
        Ok(())
    }

    pub fn into_movements(self) -> Vec<Movement> {
        self.movements
    }
}
