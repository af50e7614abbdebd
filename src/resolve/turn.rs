//! Turn scheduling.
//!
//! A turn sorts a batch of orders into phases and, within the battle phase,
//! into successive instruction sets so that a player's follow-up movement
//! (`A -> B` then `B -> C`) only runs once the movement it builds on has
//! been resolved.
//!
//! Phase flow:
//! - Natural: headquarters are founded
//! - Generation: troops (and bonus troops) are spawned
//! - Construction: reserved
//! - Movement: distributions between territories the issuer already owns
//! - Battle: every other movement, in one or more passes
//! - Final: reserved

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::instruction::{
    CreateHeadquarter, ExecutionError, Instruction, InstructionError, InstructionId,
    InstructionSet, Movement, MovementChain, SpawnTroops,
};
use crate::world::{PlayerId, TerritoryId, World, WorldError};

/// A stage of a turn. Phases run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Natural,
    Generation,
    Construction,
    Movement,
    Battle,
    Final,
}

pub const ALL_PHASES: [Phase; 6] = [
    Phase::Natural,
    Phase::Generation,
    Phase::Construction,
    Phase::Movement,
    Phase::Battle,
    Phase::Final,
];

impl Phase {
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Natural => "natural",
            Phase::Generation => "generation",
            Phase::Construction => "construction",
            Phase::Movement => "movement",
            Phase::Battle => "battle",
            Phase::Final => "final",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something a player submits for a turn.
#[derive(Debug, Clone)]
pub enum Order {
    Single(Instruction),
    Chain(MovementChain),
}

impl From<Instruction> for Order {
    fn from(instruction: Instruction) -> Self {
        Order::Single(instruction)
    }
}

impl From<Movement> for Order {
    fn from(movement: Movement) -> Self {
        Order::Single(movement.into())
    }
}

impl From<CreateHeadquarter> for Order {
    fn from(instruction: CreateHeadquarter) -> Self {
        Order::Single(instruction.into())
    }
}

impl From<SpawnTroops> for Order {
    fn from(instruction: SpawnTroops) -> Self {
        Order::Single(instruction.into())
    }
}

impl From<MovementChain> for Order {
    fn from(chain: MovementChain) -> Self {
        Order::Chain(chain)
    }
}

/// Errors that abort a turn.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("no battle instruction set could be formed for the {remaining} remaining movements")]
    SetNotConstructible { remaining: usize },

    #[error("instruction {instruction} of {phase} set {set} was not executed")]
    NotExecuted {
        phase: Phase,
        set: usize,
        instruction: InstructionId,
    },

    #[error(transparent)]
    Instruction(#[from] InstructionError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    World(#[from] WorldError),
}

/// Order shapes the resolver does not model as one army. Each movement
/// involved still resolves on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedOrder {
    /// One player invades the same territory from several origins.
    MultiOriginInvasion {
        issuer: PlayerId,
        destination: TerritoryId,
        origins: Vec<TerritoryId>,
    },
    /// A follow-up movement leaves an invaded territory for land owned by
    /// the owner of the invasion's origin.
    ReturnThroughInvaded {
        issuer: PlayerId,
        origin: TerritoryId,
        invaded: TerritoryId,
        destination: TerritoryId,
    },
}

/// The orders of one turn, grouped into phases and instruction sets.
#[derive(Debug, Clone, Default)]
pub struct Turn {
    sets: BTreeMap<Phase, Vec<InstructionSet>>,
    unsupported: Vec<UnsupportedOrder>,
}

impl Turn {
    /// Validates and unrolls movement chains, then assigns every instruction
    /// to a phase and instruction set. Movements are classified against
    /// `world` as it is now.
    pub fn new<I, O>(orders: I, world: &World) -> Result<Self, TurnError>
    where
        I: IntoIterator<Item = O>,
        O: Into<Order>,
    {
        let mut natural = Vec::new();
        let mut generation = Vec::new();
        let mut movement = Vec::new();
        let mut battle = Vec::new();

        for instruction in unroll(orders)? {
            match instruction {
                Instruction::CreateHeadquarter(_) => natural.push(instruction),
                Instruction::SpawnTroops(_) => generation.push(instruction),
                Instruction::Movement(m) => {
                    let issuer = Some(m.issuer());
                    if world.owner(m.origin())? == issuer && world.owner(m.destination())? == issuer
                    {
                        movement.push(Instruction::Movement(m));
                    } else {
                        battle.push(m);
                    }
                }
            }
        }

        let mut sets = BTreeMap::new();
        for (phase, instructions) in [
            (Phase::Natural, natural),
            (Phase::Generation, generation),
            (Phase::Movement, movement),
        ] {
            if instructions.is_empty() {
                continue;
            }
            let mut set = InstructionSet::new();
            for instruction in instructions {
                set.add(instruction, world)?;
            }
            sets.insert(phase, vec![set]);
        }
        let unsupported = unsupported_orders(&battle, world)?;
        if !battle.is_empty() {
            sets.insert(Phase::Battle, battle_sets(battle, world)?);
        }

        Ok(Turn { sets, unsupported })
    }

    /// Phases that hold at least one instruction, in execution order.
    pub fn phases(&self) -> impl Iterator<Item = Phase> + '_ {
        self.sets.keys().copied()
    }

    pub fn instruction_sets(&self, phase: Phase) -> &[InstructionSet] {
        self.sets.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Order shapes found at construction that resolve as independent
    /// movements.
    pub fn unsupported(&self) -> &[UnsupportedOrder] {
        &self.unsupported
    }

    /// Every instruction set in execution order.
    pub fn all_sets(&self) -> impl Iterator<Item = (Phase, &InstructionSet)> {
        self.sets
            .iter()
            .flat_map(|(phase, sets)| sets.iter().map(move |set| (*phase, set)))
    }

    /// Runs every phase and set in order.
    ///
    /// An instruction already executed as a side effect of another one is
    /// skipped. Once a set is done, all of its instructions must have
    /// executed.
    pub fn execute(&mut self, world: &mut World) -> Result<(), TurnError> {
        for (&phase, sets) in self.sets.iter_mut() {
            info!(phase = %phase, sets = sets.len(), "processing phase");

            for (index, set) in sets.iter_mut().enumerate() {
                let ids: Vec<InstructionId> = set.iter().map(|(id, _)| id).collect();
                for &id in &ids {
                    if let Some(instruction) = set.get(id) {
                        if instruction.is_executed() {
                            debug!(phase = %phase, set = index, instruction = %id, "already executed");
                            continue;
                        }
                        debug!(
                            phase = %phase,
                            set = index,
                            instruction = %id,
                            kind = ?instruction.kind(),
                            "{instruction}"
                        );
                    }
                    set.execute(id, world)?;
                }

                if let Some(&instruction) = set.unexecuted().first() {
                    return Err(TurnError::NotExecuted {
                        phase,
                        set: index,
                        instruction,
                    });
                }
            }
        }
        Ok(())
    }
}

fn unroll<I, O>(orders: I) -> Result<Vec<Instruction>, InstructionError>
where
    I: IntoIterator<Item = O>,
    O: Into<Order>,
{
    let mut instructions = Vec::new();
    for order in orders {
        match order.into() {
            Order::Single(instruction) => instructions.push(instruction),
            Order::Chain(chain) => {
                chain.validate()?;
                instructions.extend(chain.into_movements().into_iter().map(Instruction::from));
            }
        }
    }
    Ok(instructions)
}

/// Detects multi-origin invasions and chains that leave an invaded
/// territory for the origin owner's land, against ownership at turn
/// construction.
fn unsupported_orders(
    movements: &[Movement],
    world: &World,
) -> Result<Vec<UnsupportedOrder>, TurnError> {
    let mut found = Vec::new();

    let mut invasions: BTreeMap<(PlayerId, TerritoryId), Vec<TerritoryId>> = BTreeMap::new();
    for m in movements {
        if matches!(world.owner(m.destination())?, Some(owner) if owner != m.issuer()) {
            invasions
                .entry((m.issuer(), m.destination()))
                .or_default()
                .push(m.origin());
        }
    }
    for ((issuer, destination), origins) in invasions {
        if origins.len() > 1 {
            warn!(issuer = %issuer, destination = %destination, origins = ?origins, "invasion from several origins resolves as independent movements");
            found.push(UnsupportedOrder::MultiOriginInvasion {
                issuer,
                destination,
                origins,
            });
        }
    }

    for first in movements {
        let invaded = first.destination();
        let home = world.owner(first.origin())?;
        match world.owner(invaded)? {
            Some(defender) if defender != first.issuer() => {}
            _ => continue,
        }
        for second in movements {
            if second.issuer() != first.issuer() || second.origin() != invaded {
                continue;
            }
            if home.is_some() && world.owner(second.destination())? == home {
                warn!(
                    issuer = %first.issuer(),
                    origin = %first.origin(),
                    invaded = %invaded,
                    destination = %second.destination(),
                    "chain through an invaded territory resolves as independent movements"
                );
                found.push(UnsupportedOrder::ReturnThroughInvaded {
                    issuer: first.issuer(),
                    origin: first.origin(),
                    invaded,
                    destination: second.destination(),
                });
            }
        }
    }

    Ok(found)
}

/// Splits battle movements into passes. A movement waits for a later pass
/// while another remaining movement of its issuer ends at its origin. Every
/// pass after the first allows partial execution.
fn battle_sets(movements: Vec<Movement>, world: &World) -> Result<Vec<InstructionSet>, TurnError> {
    let mut sets = Vec::new();
    let mut remaining = movements;

    while !remaining.is_empty() {
        let blocked: Vec<bool> = remaining
            .iter()
            .map(|m| {
                remaining
                    .iter()
                    .any(|other| other.issuer() == m.issuer() && other.destination() == m.origin())
            })
            .collect();
        if blocked.iter().all(|&b| b) {
            return Err(TurnError::SetNotConstructible {
                remaining: remaining.len(),
            });
        }

        let mut set = if sets.is_empty() {
            InstructionSet::new()
        } else {
            InstructionSet::partial()
        };
        let mut deferred = Vec::new();
        for (m, is_blocked) in remaining.into_iter().zip(blocked) {
            if is_blocked {
                deferred.push(m);
            } else {
                set.add(m, world)?;
            }
        }
        debug!(pass = sets.len(), movements = set.len(), deferred = deferred.len(), "battle set formed");
        sets.push(set);
        remaining = deferred;
    }

    Ok(sets)
}
