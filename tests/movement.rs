//! Movement resolution scenarios: expansions, distributions, invasions,
//! skirmishes, mutual invasions and cycles within a single instruction set.

mod common;

use common::Game;
use conquest::{
    ExecutionError, InstructionError, InstructionSet, Movement, MovementKind, World,
};

// ---- Helpers ----

fn execute_all(set: &mut InstructionSet, world: &mut World) {
    let ids: Vec<_> = set.iter().map(|(id, _)| id).collect();
    for id in ids {
        if !set.get(id).unwrap().is_executed() {
            set.execute(id, world).unwrap();
        }
    }
}

// ---- Validation ----

#[test]
fn movement_from_foreign_territory_is_invalid() {
    let mut g = Game::new();
    let p = g.players(2);
    let t = g.territories(2, &[p[1]], true);
    g.troops(&[(t[0], 1)]);

    let mut set = InstructionSet::new();
    let id = set.add(Movement::new(p[0], t[0], t[1], 1), &g.world).unwrap();
    let err = set.execute(id, &mut g.world).unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::Invalid(InstructionError::IssuerDoesNotOwnTerritory { .. })
    ));
}

#[test]
fn movement_with_insufficient_troops_is_invalid() {
    let mut g = Game::new();
    let p = g.players(1);
    let t = g.territories(2, &[p[0]], true);
    g.troops(&[(t[0], 1)]);

    let m = Movement::new(p[0], t[0], t[1], 2);
    assert_eq!(
        m.validate(&g.world, false),
        Err(InstructionError::InsufficientTroops {
            territory: t[0],
            requested: 2,
            available: 1,
        })
    );
    assert_eq!(Movement::new(p[0], t[0], t[1], 1).validate(&g.world, false), Ok(()));
}

#[test]
fn movement_to_non_adjacent_territory_is_invalid() {
    let mut g = Game::new();
    let p = g.players(1);
    let t = g.territories(2, &[p[0]], false);
    g.troops(&[(t[0], 1)]);

    let err = Movement::new(p[0], t[0], t[1], 1)
        .validate(&g.world, false)
        .unwrap_err();
    assert!(matches!(err, InstructionError::TargetTerritoryNotAdjacent { .. }));
}

#[test]
fn movement_executes_only_once() {
    let mut g = Game::new();
    let p = g.players(1);
    let t = g.territories(2, &[p[0]], true);
    g.troops(&[(t[0], 3)]);

    let mut set = InstructionSet::new();
    let id = set.add(Movement::new(p[0], t[0], t[1], 1), &g.world).unwrap();
    set.execute(id, &mut g.world).unwrap();
    assert_eq!(
        set.execute(id, &mut g.world),
        Err(ExecutionError::AlreadyExecuted(id))
    );
    g.assert_troops(t[0], 2);
    g.assert_troops(t[1], 1);
}

// ---- Expansion and distribution ----

#[test]
fn moving_every_troop_away_keeps_the_origin_owned() {
    let mut g = Game::new();
    let p = g.players(1);
    let t = g.territories(2, &[p[0]], true);
    g.troops(&[(t[0], 3)]);

    let mut set = InstructionSet::new();
    let id = set.add(Movement::new(p[0], t[0], t[1], 3), &g.world).unwrap();
    set.execute(id, &mut g.world).unwrap();

    g.assert_troops(t[0], 0);
    g.assert_owner(t[0], p[0]);
    g.assert_troops(t[1], 3);
    g.assert_owner(t[1], p[0]);
}

#[test]
fn expansion_into_empty_territory() {
    let mut g = Game::new();
    let p = g.players(1);
    let t = g.territories(2, &[p[0]], true);
    g.troops(&[(t[0], 10)]);

    let mut set = InstructionSet::new();
    let id = set.add(Movement::new(p[0], t[0], t[1], 6), &g.world).unwrap();
    assert_eq!(set.movement(id).unwrap().kind(), Some(MovementKind::Expansion));
    set.execute(id, &mut g.world).unwrap();

    g.assert_owner(t[1], p[0]);
    g.assert_troops(t[0], 4);
    g.assert_troops(t[1], 6);
}

#[test]
fn distribution_to_friendly_territory_costs_nothing() {
    let mut g = Game::new();
    let p = g.players(1);
    let t = g.territories(2, &[p[0], p[0]], true);
    g.troops(&[(t[0], 10), (t[1], 6)]);
    let before = g.total_troops();

    let mut set = InstructionSet::new();
    let id = set.add(Movement::new(p[0], t[0], t[1], 5), &g.world).unwrap();
    assert_eq!(set.movement(id).unwrap().kind(), Some(MovementKind::Distribution));
    set.execute(id, &mut g.world).unwrap();

    g.assert_troops(t[0], 5);
    g.assert_troops(t[1], 11);
    assert_eq!(g.total_troops(), before);
}

// ---- Invasion ----

#[test]
fn simple_successful_invasion() {
    let mut g = Game::new();
    let p = g.players(2);
    let t = g.territories(2, &[p[0], p[1]], true);
    g.troops(&[(t[0], 9), (t[1], 5)]);

    let mut set = InstructionSet::new();
    let id = set.add(Movement::new(p[0], t[0], t[1], 8), &g.world).unwrap();
    set.execute(id, &mut g.world).unwrap();

    g.assert_troops(t[0], 1);
    g.assert_troops(t[1], 1);
    g.assert_owner(t[0], p[0]);
    g.assert_owner(t[1], p[0]);
}

#[test]
fn invasion_can_render_the_target_neutral() {
    let mut g = Game::new();
    let p = g.players(2);
    let t = g.territories(2, &[p[0], p[1]], true);
    g.troops(&[(t[0], 6), (t[1], 3)]);

    let mut set = InstructionSet::new();
    let id = set.add(Movement::new(p[0], t[0], t[1], 5), &g.world).unwrap();
    set.execute(id, &mut g.world).unwrap();

    g.assert_troops(t[0], 1);
    g.assert_troops(t[1], 0);
    g.assert_owner(t[0], p[0]);
    g.assert_neutral(t[1]);
}

#[test]
fn invasion_of_empty_land_still_costs_the_penalty() {
    let mut g = Game::new();
    let p = g.players(2);
    let t = g.territories(2, &[p[0], p[1]], true);
    g.troops(&[(t[0], 8)]);

    let mut set = InstructionSet::new();
    let id = set.add(Movement::new(p[0], t[0], t[1], 7), &g.world).unwrap();
    set.execute(id, &mut g.world).unwrap();

    g.assert_troops(t[1], 5);
    g.assert_owner(t[1], p[0]);
}

#[test]
fn invasion_accounting_matches_penalty_and_trade() {
    const PENALTY: u32 = 2;
    for available in [3, 6, 10] {
        for requested in 1..=available {
            for defenders in [0, 1, 4, 9] {
                let mut g = Game::new();
                let p = g.players(2);
                let t = g.territories(2, &[p[0], p[1]], true);
                g.troops(&[(t[0], available), (t[1], defenders)]);

                let mut set = InstructionSet::new();
                let id = set
                    .add(Movement::new(p[0], t[0], t[1], requested), &g.world)
                    .unwrap();
                set.execute(id, &mut g.world).unwrap();

                let traded = requested.saturating_sub(PENALTY).min(defenders);
                let losses = requested.min(PENALTY + traded);
                let survivors = requested - losses;
                let case = format!("A={available} R={requested} D={defenders}");

                assert_eq!(g.troops_in(t[0]), available - requested, "{case}");
                if survivors > 0 {
                    assert_eq!(g.troops_in(t[1]), survivors, "{case}");
                    g.assert_owner(t[1], p[0]);
                } else {
                    let left = defenders - traded;
                    assert_eq!(g.troops_in(t[1]), left, "{case}");
                    if left == 0 {
                        g.assert_neutral(t[1]);
                    } else {
                        g.assert_owner(t[1], p[1]);
                    }
                }
            }
        }
    }
}

#[test]
fn mutual_invasion_applies_penalty_once_per_territory() {
    let mut g = Game::new();
    let p = g.players(2);
    let t = g.territories(2, &[p[0], p[1]], true);
    g.troops(&[(t[0], 6), (t[1], 10)]);

    let mut set = InstructionSet::new();
    let i1 = set.add(Movement::new(p[0], t[0], t[1], 3), &g.world).unwrap();
    let i2 = set.add(Movement::new(p[1], t[1], t[0], 3), &g.world).unwrap();
    assert_eq!(set.movement(i1).unwrap().mutual_invasion(), Some(i2));

    set.execute(i1, &mut g.world).unwrap();

    // t1: 10 - 2 (penalty) - 1 (trade) - 3 (counter invasion) = 4
    // t0: 6 - 3 (invasion) - 3 (being invaded) = 0
    g.assert_troops(t[0], 0);
    g.assert_troops(t[1], 4);
    g.assert_neutral(t[0]);
    g.assert_owner(t[1], p[1]);
    assert!(set.movement(i2).unwrap().is_executed());
}

#[test]
fn mutual_invasion_outcome_does_not_depend_on_which_side_runs_first() {
    let mut g = Game::new();
    let p = g.players(2);
    let t = g.territories(2, &[p[0], p[1]], true);
    g.troops(&[(t[0], 6), (t[1], 10)]);

    let mut set = InstructionSet::new();
    let i1 = set.add(Movement::new(p[0], t[0], t[1], 3), &g.world).unwrap();
    let i2 = set.add(Movement::new(p[1], t[1], t[0], 3), &g.world).unwrap();

    // i2 waits on i1, which breaks the cycle at t0 and resumes i2 itself.
    set.execute(i2, &mut g.world).unwrap();

    g.assert_troops(t[0], 0);
    g.assert_troops(t[1], 4);
    g.assert_neutral(t[0]);
    g.assert_owner(t[1], p[1]);
    assert!(set.movement(i1).unwrap().is_executed());
    assert!(set.movement(i2).unwrap().is_executed());
    assert_eq!(
        set.execute(i1, &mut g.world),
        Err(ExecutionError::AlreadyExecuted(i1))
    );
}

// ---- Skirmishes ----

#[test]
fn two_party_skirmish_then_invasion() {
    let mut g = Game::new();
    let p = g.players(3);
    let t = g.territories(3, &[p[0], p[1], p[2]], true);
    g.troops(&[(t[0], 6), (t[1], 4), (t[2], 10)]);

    let mut set = InstructionSet::new();
    let i1 = set.add(Movement::new(p[0], t[0], t[2], 5), &g.world).unwrap();
    let i2 = set.add(Movement::new(p[1], t[1], t[2], 2), &g.world).unwrap();
    set.execute(i1, &mut g.world).unwrap();

    // Both of p1's troops fall to p0; p0's remaining three invade t2.
    g.assert_troops(t[0], 1);
    g.assert_troops(t[1], 2);
    g.assert_troops(t[2], 9);
    g.assert_owner(t[2], p[2]);
    assert!(set.movement(i2).unwrap().is_executed());
}

#[test]
fn triple_skirmish_goes_to_the_largest_army() {
    let mut g = Game::new();
    let p = g.players(4);
    let t = g.territories(4, &[p[0], p[1], p[2], p[3]], true);
    g.troops(&[(t[0], 6), (t[1], 3), (t[2], 10), (t[3], 1)]);

    let mut set = InstructionSet::new();
    let ids = [
        set.add(Movement::new(p[0], t[0], t[3], 5), &g.world).unwrap(),
        set.add(Movement::new(p[1], t[1], t[3], 2), &g.world).unwrap(),
        set.add(Movement::new(p[2], t[2], t[3], 9), &g.world).unwrap(),
    ];
    set.execute(ids[2], &mut g.world).unwrap();

    g.assert_troops(t[0], 1);
    g.assert_troops(t[1], 1);
    g.assert_troops(t[2], 1);
    g.assert_troops(t[3], 1);
    g.assert_owner(t[3], p[2]);
    for id in ids {
        assert!(set.movement(id).unwrap().is_executed());
    }
}

#[test]
fn skirmish_over_neutral_land_ends_in_expansion() {
    let mut g = Game::new();
    let p = g.players(2);
    let t = g.territories(3, &[p[0], p[1]], true);
    g.troops(&[(t[0], 5), (t[1], 3)]);

    let mut set = InstructionSet::new();
    let i1 = set.add(Movement::new(p[0], t[0], t[2], 5), &g.world).unwrap();
    set.add(Movement::new(p[1], t[1], t[2], 3), &g.world).unwrap();
    set.execute(i1, &mut g.world).unwrap();

    g.assert_troops(t[0], 0);
    g.assert_troops(t[1], 0);
    g.assert_troops(t[2], 2);
    g.assert_owner(t[2], p[0]);
}

// ---- Chains and cycles ----

#[test]
fn chain_of_invasions_resolves_the_far_end_first() {
    let mut g = Game::new();
    let p = g.players(3);
    let t = g.territories(3, &[p[0], p[1], p[2]], true);
    g.troops(&[(t[0], 6), (t[1], 6), (t[2], 6)]);

    let mut set = InstructionSet::new();
    let i1 = set.add(Movement::new(p[0], t[0], t[1], 4), &g.world).unwrap();
    let i2 = set.add(Movement::new(p[1], t[1], t[2], 4), &g.world).unwrap();
    set.execute(i1, &mut g.world).unwrap();

    assert!(set.movement(i1).unwrap().is_executed());
    assert!(set.movement(i2).unwrap().is_executed());
    g.assert_troops(t[0], 2);
    g.assert_troops(t[1], 0);
    g.assert_troops(t[2], 4);
}

#[test]
fn circular_invasions_start_at_the_lowest_origin() {
    let mut g = Game::new();
    let p = g.players(3);
    let t = g.territories(3, &[p[0], p[1], p[2]], true);
    g.troops(&[(t[0], 5), (t[1], 20), (t[2], 20)]);

    let mut set = InstructionSet::new();
    let ids = [
        set.add(Movement::new(p[0], t[0], t[1], 4), &g.world).unwrap(),
        set.add(Movement::new(p[1], t[1], t[2], 4), &g.world).unwrap(),
        set.add(Movement::new(p[2], t[2], t[0], 4), &g.world).unwrap(),
    ];
    set.execute(ids[0], &mut g.world).unwrap();

    for id in ids {
        let m = set.movement(id).unwrap();
        assert!(m.is_executed());
        assert!(m.is_loop_member());
    }
    // p0 kills two of p1's troops, p1 then kills two of p2's, and p2 takes
    // t0 from p0's last troop with one survivor.
    g.assert_troops(t[1], 14);
    g.assert_troops(t[2], 14);
    g.assert_troops(t[0], 1);
    g.assert_owner(t[0], p[2]);
}

#[test]
fn cycle_can_leave_later_movements_short_of_troops() {
    let mut g = Game::new();
    let p = g.players(3);
    let t = g.territories(3, &[p[0], p[1], p[2]], true);
    g.troops(&[(t[0], 5), (t[1], 5), (t[2], 5)]);

    let mut set = InstructionSet::new();
    let ids = [
        set.add(Movement::new(p[0], t[0], t[1], 4), &g.world).unwrap(),
        set.add(Movement::new(p[1], t[1], t[2], 4), &g.world).unwrap(),
        set.add(Movement::new(p[2], t[2], t[0], 4), &g.world).unwrap(),
    ];
    // t1 is down to three troops when its movement of four runs.
    set.execute(ids[0], &mut g.world).unwrap();
    for id in ids {
        assert!(set.movement(id).unwrap().is_executed());
    }
    let short = set.movement(ids[1]).unwrap();
    assert_eq!((short.moved(), short.troops()), (3, 4));
    g.assert_troops(t[1], 0);
    g.assert_neutral(t[2]);
}

#[test]
fn executing_every_movement_of_a_set_is_order_independent_for_cycles() {
    let mut g = Game::new();
    let p = g.players(3);
    let t = g.territories(3, &[p[0], p[1], p[2]], true);
    g.troops(&[(t[0], 5), (t[1], 20), (t[2], 20)]);

    let mut set = InstructionSet::new();
    set.add(Movement::new(p[2], t[2], t[0], 4), &g.world).unwrap();
    set.add(Movement::new(p[1], t[1], t[2], 4), &g.world).unwrap();
    set.add(Movement::new(p[0], t[0], t[1], 4), &g.world).unwrap();
    execute_all(&mut set, &mut g.world);

    g.assert_troops(t[0], 1);
    g.assert_owner(t[0], p[2]);
    g.assert_troops(t[1], 14);
    g.assert_troops(t[2], 14);
}
