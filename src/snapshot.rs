//! Serializable view of a world.
//!
//! Renderers and front-ends read the game through a [`WorldSnapshot`]
//! instead of the live [`World`], one record per player and per territory,
//! written as a single JSON document.

use serde::{Deserialize, Serialize};

use crate::world::{
    Biome, ConstructKind, PlayerId, Terrain, TerritoryId, UnitKind, World, WorldError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub influence_points: u32,
    pub territories: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighbourRecord {
    pub id: TerritoryId,
    pub terrain: Terrain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryRecord {
    pub id: TerritoryId,
    pub name: Option<String>,
    pub biome: Biome,
    pub owner: Option<PlayerId>,
    pub owner_name: Option<String>,
    pub troops: u32,
    pub cavalry: u32,
    pub generals: u32,
    pub constructs: Vec<ConstructKind>,
    pub neighbours: Vec<NeighbourRecord>,
}

/// Point-in-time copy of everything a renderer shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub players: Vec<PlayerRecord>,
    pub territories: Vec<TerritoryRecord>,
}

impl WorldSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn territory(&self, id: TerritoryId) -> Option<&TerritoryRecord> {
        self.territories.iter().find(|t| t.id == id)
    }
}

impl World {
    /// Captures players and territories in id order.
    pub fn snapshot(&self) -> Result<WorldSnapshot, WorldError> {
        let players = self
            .players()
            .map(|p| PlayerRecord {
                id: p.id(),
                name: p.name().to_string(),
                influence_points: p.influence_points(),
                territories: self.owned_territories(p.id()).len(),
            })
            .collect();

        let mut territories = Vec::new();
        for t in self.territories() {
            let owner_name = match t.owner() {
                Some(owner) => Some(self.player(owner)?.name().to_string()),
                None => None,
            };
            let neighbours = self
                .adjacent_territories(t.id())
                .into_iter()
                .filter_map(|n| {
                    self.boundary(t.id(), n).map(|b| NeighbourRecord {
                        id: n,
                        terrain: b.terrain(),
                    })
                })
                .collect();
            territories.push(TerritoryRecord {
                id: t.id(),
                name: t.name().map(str::to_string),
                biome: t.biome(),
                owner: t.owner(),
                owner_name,
                troops: t.count(UnitKind::Troop),
                cavalry: t.count(UnitKind::Cavalry),
                generals: t.count(UnitKind::General),
                constructs: t.constructs().iter().map(|c| c.kind).collect(),
                neighbours,
            });
        }

        Ok(WorldSnapshot {
            players,
            territories,
        })
    }
}
