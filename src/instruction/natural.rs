//! Instructions of the natural and generation phases.
//!
//! Founding a headquarter and spawning troops never interact with other
//! instructions, so each validates and applies itself directly.

use tracing::info;

use super::{ExecutionError, ExecutionState, InstructionError, InstructionId};
use crate::world::{ConstructKind, PlayerId, TerritoryId, UnitKind, World};

/// Founds a player's first territory: a headquarter plus starting troops.
#[derive(Debug, Clone)]
pub struct CreateHeadquarter {
    pub(crate) issuer: PlayerId,
    pub(crate) territory: TerritoryId,
    pub(crate) state: ExecutionState,
}

impl CreateHeadquarter {
    pub fn new(issuer: PlayerId, territory: TerritoryId) -> Self {
        CreateHeadquarter {
            issuer,
            territory,
            state: ExecutionState::NotStarted,
        }
    }

    pub fn issuer(&self) -> PlayerId {
        self.issuer
    }

    pub fn territory(&self) -> TerritoryId {
        self.territory
    }

    /// The territory must be neutral, the issuer must not own anything yet,
    /// and every neighbour must be empty unless the barbarians hold it.
    pub fn validate(&self, world: &World) -> Result<(), InstructionError> {
        if !world.territory(self.territory)?.is_neutral() {
            return Err(InstructionError::TerritoryNotNeutral(self.territory));
        }

        if !world.owned_territories(self.issuer).is_empty() {
            return Err(InstructionError::IssuerAlreadyPresentInWorld(self.issuer));
        }

        let barbarian = world.rules().barbarian_name.as_str();
        for neighbour in world.adjacent_territories(self.territory) {
            let t = world.territory(neighbour)?;
            if t.is_empty() {
                continue;
            }
            let held_by_barbarians = match t.owner() {
                Some(owner) => world.player(owner)?.name() == barbarian,
                None => false,
            };
            if !held_by_barbarians {
                return Err(InstructionError::AdjacentTerritoryNotEmpty(neighbour));
            }
        }

        Ok(())
    }

    pub(crate) fn execute(
        &mut self,
        id: InstructionId,
        world: &mut World,
    ) -> Result<(), ExecutionError> {
        if self.state == ExecutionState::Executed {
            return Err(ExecutionError::AlreadyExecuted(id));
        }
        self.validate(world)?;

        let troops = world.rules().starting_troops;
        world.set_owner(self.territory, Some(self.issuer))?;
        world.build_construct(self.territory, ConstructKind::Headquarter)?;
        world.spawn_units(self.territory, UnitKind::Troop, troops)?;
        self.state = ExecutionState::Executed;

        info!(issuer = %self.issuer, territory = %self.territory, troops, "headquarter founded");
        Ok(())
    }
}

/// Spawns troops in a territory of the issuer.
///
/// A bonus spawn costs influence points and yields the bonus troop count.
#[derive(Debug, Clone)]
pub struct SpawnTroops {
    pub(crate) issuer: PlayerId,
    pub(crate) territory: TerritoryId,
    pub(crate) troops: Option<u32>,
    pub(crate) bonus: bool,
    pub(crate) state: ExecutionState,
}

impl SpawnTroops {
    /// A regular spawn of the rules' default size.
    pub fn new(issuer: PlayerId, territory: TerritoryId) -> Self {
        SpawnTroops {
            issuer,
            territory,
            troops: None,
            bonus: false,
            state: ExecutionState::NotStarted,
        }
    }

    /// A bonus spawn, paid for with influence points.
    pub fn bonus(issuer: PlayerId, territory: TerritoryId) -> Self {
        SpawnTroops {
            bonus: true,
            ..SpawnTroops::new(issuer, territory)
        }
    }

    /// Overrides the number of troops spawned.
    pub fn with_troops(mut self, troops: u32) -> Self {
        self.troops = Some(troops);
        self
    }

    pub fn issuer(&self) -> PlayerId {
        self.issuer
    }

    pub fn territory(&self) -> TerritoryId {
        self.territory
    }

    pub fn is_bonus(&self) -> bool {
        self.bonus
    }

    /// Troops this instruction spawns under `world`'s rules.
    pub fn troops(&self, world: &World) -> u32 {
        let rules = world.rules();
        self.troops.unwrap_or(if self.bonus {
            rules.bonus_troops
        } else {
            rules.spawn_troops
        })
    }

    pub fn validate(&self, world: &World) -> Result<(), InstructionError> {
        if self.bonus {
            let required = world.rules().bonus_troop_cost;
            let available = world.player(self.issuer)?.influence_points();
            if available < required {
                return Err(InstructionError::InsufficientInfluencePoints {
                    issuer: self.issuer,
                    required,
                    available,
                });
            }
        }

        if world.owner(self.territory)? != Some(self.issuer) {
            return Err(InstructionError::IssuerDoesNotOwnTerritory {
                issuer: self.issuer,
                territory: self.territory,
            });
        }

        // Players without a headquarter may spawn anywhere they own.
        let headquarters = world.territories_with_construct(self.issuer, ConstructKind::Headquarter);
        if !headquarters.is_empty() && !headquarters.contains(&self.territory) {
            return Err(InstructionError::SpawnNotInHeadquarter {
                issuer: self.issuer,
                territory: self.territory,
            });
        }

        Ok(())
    }

    pub(crate) fn execute(
        &mut self,
        id: InstructionId,
        world: &mut World,
    ) -> Result<(), ExecutionError> {
        if self.state == ExecutionState::Executed {
            return Err(ExecutionError::AlreadyExecuted(id));
        }
        self.validate(world)?;

        if self.bonus {
            let cost = world.rules().bonus_troop_cost;
            world.spend_influence(self.issuer, cost)?;
        }
        let troops = self.troops(world);
        world.spawn_units(self.territory, UnitKind::Troop, troops)?;
        self.state = ExecutionState::Executed;

        info!(issuer = %self.issuer, territory = %self.territory, troops, bonus = self.bonus, "troops spawned");
        Ok(())
    }
}
