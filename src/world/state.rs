//! The world: every territory, boundary, player, unit and construct of a game.
//!
//! The world owns the id allocators, so ids are unique for its lifetime and
//! never reused. All unit bookkeeping goes through the mutators here, which
//! keep each unit's territory back-reference equal to the territory that
//! actually holds it.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::adjacency::{Boundary, Terrain};
use super::player::{Player, PlayerId};
use super::territory::{Biome, Territory, TerritoryId};
use super::unit::{Construct, ConstructId, ConstructKind, Unit, UnitId, UnitKind};
use crate::config::GameRules;

/// Errors raised by world primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("unknown territory {0}")]
    UnknownTerritory(TerritoryId),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),

    #[error("territory {territory} holds {available} {kind:?} units, {requested} requested")]
    InsufficientUnits {
        territory: TerritoryId,
        kind: UnitKind,
        requested: u32,
        available: u32,
    },

    #[error("territory {0} cannot border itself")]
    SelfBoundary(TerritoryId),

    #[error("player {player} holds {available} influence points, {required} required")]
    InsufficientInfluence {
        player: PlayerId,
        required: u32,
        available: u32,
    },
}

/// Complete game world.
#[derive(Debug, Clone, Default)]
pub struct World {
    players: BTreeMap<PlayerId, Player>,
    territories: BTreeMap<TerritoryId, Territory>,
    boundaries: BTreeSet<Boundary>,
    unit_locations: BTreeMap<UnitId, TerritoryId>,
    rules: GameRules,
    next_player: u32,
    next_territory: u32,
    next_unit: u32,
    next_construct: u32,
}

impl World {
    /// Creates an empty world playing by the default rules.
    pub fn new() -> Self {
        World::default()
    }

    pub fn with_rules(rules: GameRules) -> Self {
        World {
            rules,
            ..World::default()
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    // === Players ===

    pub fn add_player(&mut self, name: impl Into<String>) -> PlayerId {
        let id = PlayerId(self.next_player);
        self.next_player += 1;
        self.players.insert(id, Player::new(id, name.into()));
        id
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, WorldError> {
        self.players.get(&id).ok_or(WorldError::UnknownPlayer(id))
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn grant_influence(&mut self, id: PlayerId, amount: u32) -> Result<(), WorldError> {
        self.players
            .get_mut(&id)
            .ok_or(WorldError::UnknownPlayer(id))?
            .grant_influence(amount);
        Ok(())
    }

    pub fn spend_influence(&mut self, id: PlayerId, amount: u32) -> Result<(), WorldError> {
        let player = self.players.get_mut(&id).ok_or(WorldError::UnknownPlayer(id))?;
        if player.spend_influence(amount) {
            Ok(())
        } else {
            Err(WorldError::InsufficientInfluence {
                player: id,
                required: amount,
                available: player.influence_points(),
            })
        }
    }

    // === Territories ===

    pub fn add_territory(&mut self, biome: Biome, name: Option<&str>) -> TerritoryId {
        let id = TerritoryId(self.next_territory);
        self.next_territory += 1;
        self.territories
            .insert(id, Territory::new(id, biome, name.map(str::to_string)));
        id
    }

    pub fn territory(&self, id: TerritoryId) -> Result<&Territory, WorldError> {
        self.territories.get(&id).ok_or(WorldError::UnknownTerritory(id))
    }

    fn territory_mut(&mut self, id: TerritoryId) -> Result<&mut Territory, WorldError> {
        self.territories
            .get_mut(&id)
            .ok_or(WorldError::UnknownTerritory(id))
    }

    /// Territories in id order.
    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.territories.values()
    }

    pub fn owner(&self, id: TerritoryId) -> Result<Option<PlayerId>, WorldError> {
        Ok(self.territory(id)?.owner)
    }

    /// Sets or clears the owner of a territory.
    pub fn set_owner(
        &mut self,
        id: TerritoryId,
        owner: Option<PlayerId>,
    ) -> Result<(), WorldError> {
        if let Some(player) = owner {
            self.player(player)?;
        }
        self.territory_mut(id)?.owner = owner;
        Ok(())
    }

    pub fn owned_territories(&self, player: PlayerId) -> Vec<TerritoryId> {
        self.territories
            .values()
            .filter(|t| t.owner == Some(player))
            .map(|t| t.id)
            .collect()
    }

    /// Territories owned by `player` that hold a construct of `kind`.
    pub fn territories_with_construct(
        &self,
        player: PlayerId,
        kind: ConstructKind,
    ) -> Vec<TerritoryId> {
        self.territories
            .values()
            .filter(|t| t.owner == Some(player) && t.has_construct(kind))
            .map(|t| t.id)
            .collect()
    }

    // === Boundaries ===

    /// Links two territories. Relinking an existing pair replaces its terrain.
    pub fn link(
        &mut self,
        a: TerritoryId,
        b: TerritoryId,
        terrain: Terrain,
    ) -> Result<(), WorldError> {
        self.territory(a)?;
        self.territory(b)?;
        let boundary = Boundary::new(a, b, terrain).ok_or(WorldError::SelfBoundary(a))?;
        self.boundaries.retain(|existing| !existing.links(a, b));
        self.boundaries.insert(boundary);
        Ok(())
    }

    pub fn boundaries(&self) -> impl Iterator<Item = &Boundary> {
        self.boundaries.iter()
    }

    pub fn boundary(&self, a: TerritoryId, b: TerritoryId) -> Option<&Boundary> {
        self.boundaries.iter().find(|bd| bd.links(a, b))
    }

    pub fn is_adjacent(&self, a: TerritoryId, b: TerritoryId) -> bool {
        self.boundary(a, b).is_some()
    }

    /// Neighbours of `id` in id order.
    pub fn adjacent_territories(&self, id: TerritoryId) -> Vec<TerritoryId> {
        let mut out: Vec<TerritoryId> =
            self.boundaries.iter().filter_map(|bd| bd.other(id)).collect();
        out.sort_unstable();
        out
    }

    // === Units ===

    pub fn spawn_unit(&mut self, territory: TerritoryId, kind: UnitKind) -> Result<UnitId, WorldError> {
        self.territory(territory)?;
        let id = UnitId(self.next_unit);
        self.next_unit += 1;
        self.territory_mut(territory)?.units.push(Unit {
            id,
            kind,
            territory,
        });
        self.unit_locations.insert(id, territory);
        Ok(id)
    }

    pub fn spawn_units(
        &mut self,
        territory: TerritoryId,
        kind: UnitKind,
        amount: u32,
    ) -> Result<Vec<UnitId>, WorldError> {
        (0..amount).map(|_| self.spawn_unit(territory, kind)).collect()
    }

    pub fn unit(&self, id: UnitId) -> Result<&Unit, WorldError> {
        let at = self.unit_locations.get(&id).ok_or(WorldError::UnknownUnit(id))?;
        self.territory(*at)?
            .units
            .iter()
            .find(|u| u.id == id)
            .ok_or(WorldError::UnknownUnit(id))
    }

    pub fn count(&self, territory: TerritoryId, kind: UnitKind) -> Result<u32, WorldError> {
        Ok(self.territory(territory)?.count(kind))
    }

    pub fn troops(&self, territory: TerritoryId) -> Result<u32, WorldError> {
        self.count(territory, UnitKind::Troop)
    }

    /// Selects the first `amount` units of `kind`, front of the collection
    /// first. With `allow_shortfall` a smaller selection is returned when
    /// fewer units exist; otherwise the shortfall is an error.
    pub fn take_units(
        &self,
        territory: TerritoryId,
        kind: UnitKind,
        amount: u32,
        allow_shortfall: bool,
    ) -> Result<Vec<UnitId>, WorldError> {
        let t = self.territory(territory)?;
        let available = t.count(kind);
        if available < amount && !allow_shortfall {
            return Err(WorldError::InsufficientUnits {
                territory,
                kind,
                requested: amount,
                available,
            });
        }
        Ok(t.units_of(kind).take(amount as usize).map(|u| u.id).collect())
    }

    /// Destroys up to `amount` units of `kind` and returns how many went.
    pub fn remove_units(
        &mut self,
        territory: TerritoryId,
        kind: UnitKind,
        amount: u32,
        allow_shortfall: bool,
    ) -> Result<u32, WorldError> {
        let doomed = self.take_units(territory, kind, amount, allow_shortfall)?;
        let t = self.territory_mut(territory)?;
        t.units.retain(|u| !doomed.contains(&u.id));
        for id in &doomed {
            self.unit_locations.remove(id);
        }
        Ok(doomed.len() as u32)
    }

    /// Moves one unit to `to`, updating both territories and the back-reference.
    pub fn move_unit(&mut self, unit: UnitId, to: TerritoryId) -> Result<(), WorldError> {
        self.territory(to)?;
        let from = *self
            .unit_locations
            .get(&unit)
            .ok_or(WorldError::UnknownUnit(unit))?;
        if from == to {
            return Ok(());
        }
        let source = self.territory_mut(from)?;
        let pos = source
            .units
            .iter()
            .position(|u| u.id == unit)
            .ok_or(WorldError::UnknownUnit(unit))?;
        let mut moving = source.units.remove(pos);
        moving.territory = to;
        self.territory_mut(to)?.units.push(moving);
        self.unit_locations.insert(unit, to);
        Ok(())
    }

    /// Moves up to `amount` units of `kind` from `from` to `to`, returning
    /// the number moved.
    pub fn move_units(
        &mut self,
        from: TerritoryId,
        to: TerritoryId,
        kind: UnitKind,
        amount: u32,
        allow_shortfall: bool,
    ) -> Result<u32, WorldError> {
        let selected = self.take_units(from, kind, amount, allow_shortfall)?;
        self.territory(to)?;
        for id in &selected {
            self.move_unit(*id, to)?;
        }
        Ok(selected.len() as u32)
    }

    // === Constructs ===

    pub fn build_construct(
        &mut self,
        territory: TerritoryId,
        kind: ConstructKind,
    ) -> Result<ConstructId, WorldError> {
        self.territory(territory)?;
        let id = ConstructId(self.next_construct);
        self.next_construct += 1;
        self.territory_mut(territory)?.constructs.push(Construct {
            id,
            kind,
            territory,
        });
        Ok(id)
    }

    pub fn has_construct(
        &self,
        territory: TerritoryId,
        kind: ConstructKind,
    ) -> Result<bool, WorldError> {
        Ok(self.territory(territory)?.has_construct(kind))
    }
}
