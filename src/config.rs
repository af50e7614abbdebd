//! Tunable game rules.
//!
//! Every constant the resolver and the natural-phase instructions depend on
//! lives here so a game host can load a rule variant from JSON. The defaults
//! are the standard rules.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Game constants shared by every instruction of a world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Troops lost by an invader before any one-for-one trade.
    pub invasion_penalty: u32,
    /// Troops placed with a freshly created headquarter.
    pub starting_troops: u32,
    /// Troops produced by a regular spawn.
    pub spawn_troops: u32,
    /// Troops produced by a bonus spawn.
    pub bonus_troops: u32,
    /// Influence points paid for a bonus spawn.
    pub bonus_troop_cost: u32,
    /// Name of the player whose land never blocks headquarter placement.
    pub barbarian_name: String,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            invasion_penalty: 2,
            starting_troops: 5,
            spawn_troops: 3,
            bonus_troops: 2,
            bonus_troop_cost: 10,
            barbarian_name: "Barbarian".to_string(),
        }
    }
}

impl GameRules {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        GameRules::from_json_str(&contents)
    }
}

/// Errors raised while loading [`GameRules`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse game rules: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read game rules from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
