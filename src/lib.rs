//! Conquest turn resolution engine.
//!
//! Exposes the world model, player instructions, the turn scheduler and the
//! battle resolver of a multiplayer territorial-conquest game, plus the
//! tunable rules and a serializable world snapshot for renderers.

pub mod config;
pub mod instruction;
pub mod resolve;
pub mod snapshot;
pub mod world;

pub use config::{ConfigError, GameRules};
pub use instruction::{
    CreateHeadquarter, ExecutionError, ExecutionState, Instruction, InstructionError,
    InstructionId, InstructionKind, InstructionSet, Movement, MovementChain, MovementKind,
    SpawnTroops,
};
pub use resolve::{Order, Phase, Turn, TurnError, UnsupportedOrder};
pub use snapshot::WorldSnapshot;
pub use world::{
    Biome, ConstructKind, PlayerId, Terrain, TerritoryId, UnitKind, World, WorldError,
};
