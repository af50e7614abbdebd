//! World representation.
//!
//! Contains the map graph (territories and boundaries), the players, and the
//! units and constructs placed on the map.

pub mod adjacency;
pub mod player;
pub mod state;
pub mod territory;
pub mod unit;

pub use adjacency::{Boundary, Terrain};
pub use player::{Player, PlayerId};
pub use state::{World, WorldError};
pub use territory::{Biome, Territory, TerritoryId};
pub use unit::{Construct, ConstructId, ConstructKind, Unit, UnitId, UnitKind, ALL_UNIT_KINDS};
