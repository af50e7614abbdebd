//! Territories: the nodes of the map graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::unit::{Construct, ConstructKind, Unit, UnitKind};

/// Identifier of a territory, allocated by the world and never reused.
///
/// Ids are ordered by allocation, which makes them the tie-break key when a
/// cycle of invasions has to be broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TerritoryId(pub u32);

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Surface type of a territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Land,
    Water,
    Wasteland,
}

/// A node of the map holding units and constructs.
#[derive(Debug, Clone)]
pub struct Territory {
    pub(crate) id: TerritoryId,
    pub(crate) biome: Biome,
    pub(crate) name: Option<String>,
    pub(crate) owner: Option<PlayerId>,
    pub(crate) units: Vec<Unit>,
    pub(crate) constructs: Vec<Construct>,
}

impl Territory {
    pub(crate) fn new(id: TerritoryId, biome: Biome, name: Option<String>) -> Self {
        Territory {
            id,
            biome,
            name,
            owner: None,
            units: Vec::new(),
            constructs: Vec::new(),
        }
    }

    pub fn id(&self) -> TerritoryId {
        self.id
    }

    /// Returns the biome tag.
    pub fn biome(&self) -> Biome {
        self.biome
    }

    /// Returns the display name, if the territory has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the owning player, or `None` when neutral.
    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Units in insertion order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn constructs(&self) -> &[Construct] {
        &self.constructs
    }

    /// Iterates over the units of one variant, front first.
    pub fn units_of(&self, kind: UnitKind) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(move |u| u.kind == kind)
    }

    /// Returns the number of units of one variant.
    pub fn count(&self, kind: UnitKind) -> u32 {
        self.units_of(kind).count() as u32
    }

    /// Returns the number of troops.
    pub fn troops(&self) -> u32 {
        self.count(UnitKind::Troop)
    }

    /// Returns true if a construct of `kind` stands here.
    pub fn has_construct(&self, kind: ConstructKind) -> bool {
        self.constructs.iter().any(|c| c.kind == kind)
    }

    /// No units and no constructs.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty() && self.constructs.is_empty()
    }

    /// No owner.
    pub fn is_neutral(&self) -> bool {
        self.owner.is_none()
    }
}
