//! Units and constructs.
//!
//! Units are the mobile pieces that fight over territories; constructs are
//! fixed buildings. Both carry a back-reference to the territory holding
//! them, kept in sync by the [`World`](super::World) mutators.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::territory::TerritoryId;

/// Identifier of a unit, allocated by the world and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// Identifier of a construct, allocated by the world and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConstructId(pub u32);

impl fmt::Display for ConstructId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// The variant of a mobile unit.
///
/// Only troops take part in battles; cavalry and generals are carried in the
/// model for renderers and future rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Troop,
    Cavalry,
    General,
}

pub const ALL_UNIT_KINDS: [UnitKind; 3] = [UnitKind::Troop, UnitKind::Cavalry, UnitKind::General];

impl UnitKind {
    /// Returns the lowercase name used in logs and snapshots.
    pub const fn name(self) -> &'static str {
        match self {
            UnitKind::Troop => "troop",
            UnitKind::Cavalry => "cavalry",
            UnitKind::General => "general",
        }
    }
}

/// A unit stationed in a territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub territory: TerritoryId,
}

/// The variant of a fixed building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstructKind {
    Headquarter,
}

/// A building standing in a territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Construct {
    pub id: ConstructId,
    pub kind: ConstructKind,
    pub territory: TerritoryId,
}
