//! Shared fixtures for the scenario tests.
#![allow(dead_code)]

use std::sync::Once;

use conquest::{Biome, PlayerId, Terrain, TerritoryId, UnitKind, World};

static INIT: Once = Once::new();

/// Routes engine logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A world under construction plus the players and territories in it.
pub struct Game {
    pub world: World,
}

impl Game {
    pub fn new() -> Self {
        init_tracing();
        Game {
            world: World::new(),
        }
    }

    pub fn players(&mut self, amount: usize) -> Vec<PlayerId> {
        (0..amount)
            .map(|i| self.world.add_player(format!("player-{}", i + 1)))
            .collect()
    }

    /// Adds territories owned by `owners` in order; any beyond the list are
    /// neutral. With `complete_graph` every pair is linked.
    pub fn territories(
        &mut self,
        amount: usize,
        owners: &[PlayerId],
        complete_graph: bool,
    ) -> Vec<TerritoryId> {
        let ts: Vec<TerritoryId> = (0..amount)
            .map(|_| self.world.add_territory(Biome::Land, None))
            .collect();
        for (t, owner) in ts.iter().zip(owners) {
            self.world.set_owner(*t, Some(*owner)).unwrap();
        }
        if complete_graph {
            for i in 0..ts.len() {
                for j in i + 1..ts.len() {
                    self.world.link(ts[i], ts[j], Terrain::Flat).unwrap();
                }
            }
        }
        ts
    }

    pub fn troops(&mut self, placement: &[(TerritoryId, u32)]) {
        for &(t, n) in placement {
            self.world.spawn_units(t, UnitKind::Troop, n).unwrap();
        }
    }

    pub fn troops_in(&self, t: TerritoryId) -> u32 {
        self.world.troops(t).unwrap()
    }

    pub fn total_troops(&self) -> u32 {
        self.world.territories().map(|t| t.troops()).sum()
    }

    #[track_caller]
    pub fn assert_troops(&self, t: TerritoryId, expected: u32) {
        assert_eq!(self.troops_in(t), expected, "troops in {t}");
    }

    #[track_caller]
    pub fn assert_owner(&self, t: TerritoryId, expected: PlayerId) {
        assert_eq!(self.world.owner(t).unwrap(), Some(expected), "owner of {t}");
    }

    #[track_caller]
    pub fn assert_neutral(&self, t: TerritoryId) {
        assert_eq!(self.world.owner(t).unwrap(), None, "owner of {t}");
    }
}
