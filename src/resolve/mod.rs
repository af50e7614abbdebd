//! Turn resolution.
//!
//! Schedules a turn's orders into phases and instruction sets, and resolves
//! the movements of each set into a new world state.

pub(crate) mod battle;
pub mod turn;

pub use turn::{Order, Phase, Turn, TurnError, UnsupportedOrder, ALL_PHASES};
