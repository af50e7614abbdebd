//! Boundaries between territories.
//!
//! A boundary is an undirected edge. It is stored normalised with the lower
//! territory id first so that `(a, b)` and `(b, a)` are the same edge.

use serde::{Deserialize, Serialize};

use super::territory::TerritoryId;

/// Terrain along a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Flat,
    Mountain,
}

/// An undirected edge between two distinct territories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Boundary {
    a: TerritoryId,
    b: TerritoryId,
    terrain: Terrain,
}

impl Boundary {
    /// Builds a normalised boundary. Returns `None` for a self-edge.
    pub fn new(x: TerritoryId, y: TerritoryId, terrain: Terrain) -> Option<Self> {
        if x == y {
            return None;
        }
        let (a, b) = if x < y { (x, y) } else { (y, x) };
        Some(Boundary { a, b, terrain })
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Returns the endpoint opposite `t`, if `t` is an endpoint.
    pub fn other(&self, t: TerritoryId) -> Option<TerritoryId> {
        if self.a == t {
            Some(self.b)
        } else if self.b == t {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn links(&self, x: TerritoryId, y: TerritoryId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}
