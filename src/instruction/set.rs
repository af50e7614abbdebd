//! Instruction sets and movement classification.
//!
//! Movements are classified the moment they join a set, against the movements
//! already in it:
//!
//! 1. the issuer owns the destination: distribution;
//! 2. another player (not the destination owner) also targets the
//!    destination: skirmish, for every non-distribution movement there;
//! 3. the destination is neutral: expansion;
//! 4. otherwise invasion, linked to a mutual invasion coming the other way.

use tracing::debug;

use super::movement::{Movement, MovementKind};
use super::{ExecutionError, Instruction, InstructionError, InstructionId};
use crate::resolve::battle::BattleResolver;
use crate::world::World;

/// Instructions evaluated together.
#[derive(Debug, Clone, Default)]
pub struct InstructionSet {
    instructions: Vec<Instruction>,
    allow_partial: bool,
}

impl InstructionSet {
    pub fn new() -> Self {
        InstructionSet::default()
    }

    /// A set whose movements may go ahead with fewer troops than requested.
    pub fn partial() -> Self {
        InstructionSet {
            allow_partial: true,
            ..InstructionSet::default()
        }
    }

    pub fn allows_partial(&self) -> bool {
        self.allow_partial
    }

    /// Adds an instruction, classifying it if it is a movement.
    pub fn add(
        &mut self,
        instruction: impl Into<Instruction>,
        world: &World,
    ) -> Result<InstructionId, InstructionError> {
        let instruction = instruction.into();
        if let Instruction::Movement(m) = &instruction {
            world.territory(m.origin)?;
            world.territory(m.destination)?;
        }

        let id = InstructionId(self.instructions.len());
        let is_movement = matches!(instruction, Instruction::Movement(_));
        self.instructions.push(instruction);
        if is_movement {
            self.classify(id, world)?;
        }
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, id: InstructionId) -> Option<&Instruction> {
        self.instructions.get(id.0)
    }

    pub fn movement(&self, id: InstructionId) -> Option<&Movement> {
        self.get(id).and_then(Instruction::as_movement)
    }

    /// Instructions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (InstructionId, &Instruction)> {
        self.instructions
            .iter()
            .enumerate()
            .map(|(i, instruction)| (InstructionId(i), instruction))
    }

    pub fn movements(&self) -> impl Iterator<Item = (InstructionId, &Movement)> {
        self.iter()
            .filter_map(|(id, instruction)| instruction.as_movement().map(|m| (id, m)))
    }

    /// Instructions not yet executed.
    pub fn unexecuted(&self) -> Vec<InstructionId> {
        self.iter()
            .filter(|(_, instruction)| !instruction.is_executed())
            .map(|(id, _)| id)
            .collect()
    }

    /// Executes one instruction against the world.
    ///
    /// Executing a movement may execute others of this set as a side effect
    /// (dependencies of an invasion, skirmish peers, the rest of a broken
    /// cycle).
    pub fn execute(&mut self, id: InstructionId, world: &mut World) -> Result<(), ExecutionError> {
        if self.movement(id).is_some() {
            return BattleResolver::new(self, world).run(id);
        }
        match self.instructions.get_mut(id.0) {
            Some(Instruction::CreateHeadquarter(i)) => i.execute(id, world),
            Some(Instruction::SpawnTroops(i)) => i.execute(id, world),
            _ => Err(ExecutionError::UnknownInstruction(id)),
        }
    }

    /// Callers only pass ids of movements of this set.
    pub(crate) fn movement_ref(&self, id: InstructionId) -> &Movement {
        match &self.instructions[id.0] {
            Instruction::Movement(m) => m,
            other => unreachable!("instruction {id} is not a movement: {other}"),
        }
    }

    pub(crate) fn movement_mut(&mut self, id: InstructionId) -> &mut Movement {
        match &mut self.instructions[id.0] {
            Instruction::Movement(m) => m,
            other => unreachable!("instruction {id} is not a movement: {other}"),
        }
    }

    fn classify(&mut self, id: InstructionId, world: &World) -> Result<(), InstructionError> {
        let (issuer, origin, destination) = {
            let m = self.movement_ref(id);
            (m.issuer, m.origin, m.destination)
        };
        let owner = world.owner(destination)?;

        if owner == Some(issuer) {
            self.movement_mut(id).kind = Some(MovementKind::Distribution);
            debug!(instruction = %id, "classified as distribution");
            return Ok(());
        }

        let contested = self.movements().any(|(other_id, other)| {
            other_id != id
                && other.destination == destination
                && other.issuer != issuer
                && Some(other.issuer) != owner
                && other.kind != Some(MovementKind::Distribution)
        });
        if contested {
            let group: Vec<InstructionId> = self
                .movements()
                .filter(|(_, m)| {
                    m.destination == destination && m.kind != Some(MovementKind::Distribution)
                })
                .map(|(member, _)| member)
                .collect();
            for &member in &group {
                if let Some(peer) = self.movement_mut(member).mutual_invasion.take() {
                    self.movement_mut(peer).mutual_invasion = None;
                }
                let m = self.movement_mut(member);
                m.kind = Some(MovementKind::Skirmish);
                m.skirmish_peers = group.iter().copied().filter(|&g| g != member).collect();
            }
            debug!(instruction = %id, destination = %destination, parties = group.len(), "classified as skirmish");
            return Ok(());
        }

        let Some(owner) = owner else {
            self.movement_mut(id).kind = Some(MovementKind::Expansion);
            debug!(instruction = %id, "classified as expansion");
            return Ok(());
        };

        self.movement_mut(id).kind = Some(MovementKind::Invasion);
        let mutual = self
            .movements()
            .find(|(other_id, other)| {
                *other_id != id
                    && other.issuer == owner
                    && other.destination == origin
                    && other.kind == Some(MovementKind::Invasion)
            })
            .map(|(other_id, _)| other_id);
        if let Some(peer) = mutual {
            self.movement_mut(id).mutual_invasion = Some(peer);
            self.movement_mut(peer).mutual_invasion = Some(id);
            debug!(instruction = %id, peer = %peer, "classified as mutual invasion");
        } else {
            debug!(instruction = %id, "classified as invasion");
        }
        Ok(())
    }
}
