//! Players taking part in a game.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a player, allocated by the world and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A participant. Two players are the same player iff their ids match.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    name: String,
    influence_points: u32,
}

impl Player {
    pub(crate) fn new(id: PlayerId, name: String) -> Self {
        Player {
            id,
            name,
            influence_points: 0,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Currency spent on bonus spawns.
    pub fn influence_points(&self) -> u32 {
        self.influence_points
    }

    pub(crate) fn grant_influence(&mut self, amount: u32) {
        self.influence_points = self.influence_points.saturating_add(amount);
    }

    /// Deducts `amount`, returning false (and leaving the balance alone) if
    /// the balance is too low.
    pub(crate) fn spend_influence(&mut self, amount: u32) -> bool {
        match self.influence_points.checked_sub(amount) {
            Some(rest) => {
                self.influence_points = rest;
                true
            }
            None => false,
        }
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}

impl std::hash::Hash for Player {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
