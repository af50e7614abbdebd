//! Battle resolution for the movements of one instruction set.
//!
//! Movements are executed depth first: an invasion first resolves every
//! movement leaving its destination, which may in turn wait on others. The
//! traversal runs on an explicit frame stack. Re-entering a movement that is
//! still executing reports a [`Outcome::Cycle`] to its parent; the frames of
//! the cycle then unwind until the one whose origin has the lowest territory
//! id, which breaks the cycle by resolving first. Every frame passed on the
//! way is marked as a loop member and, once executed, resumes the movements
//! leaving its destination with partial execution allowed.

use std::collections::BTreeSet;
use std::iter;

use tracing::{debug, info, warn};

use crate::instruction::{
    ExecutionError, ExecutionState, InstructionId, InstructionSet, MovementKind,
};
use crate::world::{TerritoryId, UnitKind, World};

/// What a finished frame reports to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    /// The child was already executing.
    Cycle,
    /// The child sits in a cycle that must be broken further up.
    Unwind,
}

#[derive(Debug)]
enum Step {
    Start,
    /// Waiting on movements that leave the destination.
    Dependencies {
        pending: Vec<InstructionId>,
        next: usize,
    },
    /// Executed loop member resuming the movements leaving its destination.
    Continuation {
        pending: Vec<InstructionId>,
        next: usize,
    },
}

#[derive(Debug)]
struct Frame {
    id: InstructionId,
    step: Step,
}

impl Frame {
    fn new(id: InstructionId) -> Self {
        Frame {
            id,
            step: Step::Start,
        }
    }
}

enum Action {
    Push(InstructionId),
    Pop(Outcome),
}

/// What a movement still needs once its immediate work is done.
enum Next {
    Finish,
    Invade,
}

/// Executes movements of an instruction set against a world.
pub(crate) struct BattleResolver<'a> {
    set: &'a mut InstructionSet,
    world: &'a mut World,
    stack: Vec<Frame>,
    /// Movements resumed after a broken cycle; they may run short.
    resumed: BTreeSet<InstructionId>,
}

impl<'a> BattleResolver<'a> {
    pub(crate) fn new(set: &'a mut InstructionSet, world: &'a mut World) -> Self {
        BattleResolver {
            set,
            world,
            stack: Vec::new(),
            resumed: BTreeSet::new(),
        }
    }

    /// Executes `root` and everything it depends on.
    pub(crate) fn run(mut self, root: InstructionId) -> Result<(), ExecutionError> {
        self.stack.push(Frame::new(root));
        let mut signal = None;
        loop {
            match self.advance(signal.take())? {
                Action::Push(id) => self.stack.push(Frame::new(id)),
                Action::Pop(outcome) => {
                    self.stack.pop();
                    if self.stack.is_empty() {
                        return match outcome {
                            Outcome::Done => Ok(()),
                            Outcome::Cycle | Outcome::Unwind => {
                                Err(ExecutionError::AlreadyExecuting(root))
                            }
                        };
                    }
                    signal = Some(outcome);
                }
            }
        }
    }

    fn advance(&mut self, signal: Option<Outcome>) -> Result<Action, ExecutionError> {
        let Some(frame) = self.stack.last_mut() else {
            return Ok(Action::Pop(Outcome::Done));
        };
        let id = frame.id;
        match std::mem::replace(&mut frame.step, Step::Start) {
            Step::Start => self.start(id),
            Step::Dependencies { pending, next } => match signal {
                Some(outcome @ (Outcome::Cycle | Outcome::Unwind)) => {
                    self.break_cycle(id, outcome == Outcome::Cycle)
                }
                _ => self.next_dependency(id, pending, next),
            },
            Step::Continuation { pending, next } => match signal {
                Some(outcome @ (Outcome::Cycle | Outcome::Unwind)) => Ok(Action::Pop(outcome)),
                _ => self.next_continuation(pending, next),
            },
        }
    }

    fn set_step(&mut self, step: Step) {
        if let Some(frame) = self.stack.last_mut() {
            frame.step = step;
        }
    }

    fn allows_partial(&self, id: InstructionId) -> bool {
        self.set.allows_partial()
            || self.set.movement_ref(id).is_partial()
            || self.resumed.contains(&id)
    }

    /// Unexecuted movements of this set leaving `territory`.
    fn departures(&self, territory: TerritoryId) -> Vec<InstructionId> {
        self.set
            .movements()
            .filter(|(_, m)| m.origin == territory && !m.is_executed())
            .map(|(id, _)| id)
            .collect()
    }

    // === Frame steps ===

    fn start(&mut self, id: InstructionId) -> Result<Action, ExecutionError> {
        let is_root = self.stack.len() == 1;
        let partial = self.allows_partial(id);
        let m = self.set.movement_ref(id);
        match m.state {
            ExecutionState::Executing if is_root => {
                return Err(ExecutionError::AlreadyExecuting(id))
            }
            ExecutionState::Executing => return Ok(Action::Pop(Outcome::Cycle)),
            ExecutionState::Executed if is_root => return Err(ExecutionError::AlreadyExecuted(id)),
            ExecutionState::Executed => return Ok(Action::Pop(Outcome::Done)),
            ExecutionState::NotStarted => {}
        }

        m.validate(self.world, partial)?;
        let kind = m.kind.ok_or(ExecutionError::Unclassified(id))?;
        if kind == MovementKind::Skirmish && m.skirmish_peers.is_empty() {
            return Err(ExecutionError::NoSkirmishPeers(id));
        }
        if m.troops == 0 || m.remaining() == 0 {
            warn!(instruction = %id, requested = m.troops, remaining = m.remaining(), "no troops left to move");
        }
        info!(instruction = %id, movement = %m, kind = ?kind, "executing movement");

        self.set.movement_mut(id).state = ExecutionState::Executing;
        let next = match kind {
            MovementKind::Expansion | MovementKind::Distribution => self.expand(id)?,
            MovementKind::Skirmish => self.skirmish(id)?,
            MovementKind::Invasion => Next::Invade,
        };
        match next {
            Next::Finish => self.finish(id),
            Next::Invade => self.enter_invasion(id),
        }
    }

    fn enter_invasion(&mut self, id: InstructionId) -> Result<Action, ExecutionError> {
        let destination = self.set.movement_ref(id).destination;
        let pending = self.departures(destination);
        if pending.is_empty() {
            self.invade(id)?;
            return self.finish(id);
        }
        debug!(instruction = %id, dependencies = ?pending, "resolving movements leaving the destination first");
        self.next_dependency(id, pending, 0)
    }

    fn next_dependency(
        &mut self,
        id: InstructionId,
        pending: Vec<InstructionId>,
        mut next: usize,
    ) -> Result<Action, ExecutionError> {
        while let Some(&dependency) = pending.get(next) {
            next += 1;
            if !self.set.movement_ref(dependency).is_executed() {
                self.set_step(Step::Dependencies { pending, next });
                return Ok(Action::Push(dependency));
            }
        }
        self.after_dependencies(id)
    }

    fn break_cycle(&mut self, id: InstructionId, first_sighting: bool) -> Result<Action, ExecutionError> {
        let lowest = self
            .set
            .movements()
            .filter(|(_, m)| m.state == ExecutionState::Executing)
            .map(|(_, m)| m.origin)
            .min();
        let m = self.set.movement_mut(id);
        m.loop_member = true;
        let origin = m.origin;

        if first_sighting {
            if let Some(lowest) = lowest {
                info!(instruction = %id, resolve_from = %lowest, "cycle of movements detected");
            }
        }

        if lowest == Some(origin) {
            debug!(instruction = %id, origin = %origin, "breaking cycle at lowest origin");
            self.after_dependencies(id)
        } else {
            debug!(instruction = %id, origin = %origin, "unwinding cycle");
            Ok(Action::Pop(Outcome::Unwind))
        }
    }

    fn after_dependencies(&mut self, id: InstructionId) -> Result<Action, ExecutionError> {
        // Movements suspended by a broken cycle go back to being regular
        // dependencies.
        let suspended: Vec<InstructionId> = self
            .set
            .movements()
            .filter(|(other, m)| *other != id && m.state == ExecutionState::Executing)
            .map(|(other, _)| other)
            .collect();
        for other in suspended {
            self.set.movement_mut(other).state = ExecutionState::NotStarted;
        }

        // A cycle resumed through this movement may have executed it already.
        if self.set.movement_ref(id).is_executed() {
            return Ok(Action::Pop(Outcome::Done));
        }

        self.invade(id)?;
        self.finish(id)
    }

    fn finish(&mut self, id: InstructionId) -> Result<Action, ExecutionError> {
        let m = self.set.movement_mut(id);
        m.state = ExecutionState::Executed;
        let (origin, destination, moved, loop_member) =
            (m.origin, m.destination, m.moved, m.loop_member);
        let origin_troops = self.world.troops(origin)?;
        let destination_troops = self.world.troops(destination)?;
        let destination_owner = self.world.owner(destination)?;
        info!(
            instruction = %id,
            moved,
            origin_troops,
            destination_troops,
            destination_owner = ?destination_owner,
            "finished movement"
        );

        if !loop_member {
            return Ok(Action::Pop(Outcome::Done));
        }
        let pending = self.departures(destination);
        self.resumed.extend(pending.iter().copied());
        if !pending.is_empty() {
            info!(instruction = %id, resume = ?pending, "resuming movements of the broken cycle");
        }
        self.next_continuation(pending, 0)
    }

    fn next_continuation(
        &mut self,
        pending: Vec<InstructionId>,
        mut next: usize,
    ) -> Result<Action, ExecutionError> {
        while let Some(&follower) = pending.get(next) {
            next += 1;
            if !self.set.movement_ref(follower).is_executed() {
                self.set_step(Step::Continuation { pending, next });
                return Ok(Action::Push(follower));
            }
        }
        Ok(Action::Pop(Outcome::Done))
    }

    // === Movement bodies ===

    /// Moves troops into a neutral or friendly destination.
    fn expand(&mut self, id: InstructionId) -> Result<Next, ExecutionError> {
        let partial = self.allows_partial(id);
        let m = self.set.movement_ref(id);
        let (issuer, origin, destination, remaining) =
            (m.issuer, m.origin, m.destination, m.remaining());

        if let Some(owner) = self.world.owner(destination)? {
            if owner != issuer {
                debug!(instruction = %id, owner = %owner, "destination was taken; resolving as invasion");
                return Ok(Next::Invade);
            }
        }

        self.world.set_owner(destination, Some(issuer))?;
        let moved = self
            .world
            .move_units(origin, destination, UnitKind::Troop, remaining, partial)?;
        self.set.movement_mut(id).moved += moved;
        debug!(instruction = %id, moved, "expansion resolved");
        Ok(Next::Finish)
    }

    /// Penalty, one-for-one trade, then occupation with whatever is left.
    fn invade(&mut self, id: InstructionId) -> Result<(), ExecutionError> {
        let partial = self.allows_partial(id);
        let m = self.set.movement_ref(id);
        let (issuer, origin, destination, troops, mutual) =
            (m.issuer, m.origin, m.destination, m.troops, m.mutual_invasion);
        let mut moved = m.moved;

        let peer_executed = mutual.map(|peer| self.set.movement_ref(peer).is_executed());
        let is_mutual = peer_executed == Some(false);

        // The mutual peer already paid the penalty for both sides.
        if peer_executed != Some(true) {
            let penalty = self.world.rules().invasion_penalty.min(troops);
            let mut paid = 0;
            for _ in 0..penalty {
                let step = self
                    .world
                    .remove_units(origin, UnitKind::Troop, 1, false)
                    .and_then(|_| {
                        if is_mutual {
                            self.world.remove_units(destination, UnitKind::Troop, 1, false)
                        } else {
                            Ok(0)
                        }
                    });
                match step {
                    Ok(_) => {
                        moved += 1;
                        paid += 1;
                    }
                    Err(_) if partial => break,
                    Err(e) => {
                        self.set.movement_mut(id).moved = moved;
                        return Err(e.into());
                    }
                }
            }
            debug!(instruction = %id, paid, mutual = is_mutual, "invasion penalty applied");
        }

        while moved < troops
            && self.world.troops(origin)? > 0
            && self.world.troops(destination)? > 0
        {
            self.world.remove_units(origin, UnitKind::Troop, 1, false)?;
            self.world.remove_units(destination, UnitKind::Troop, 1, false)?;
            moved += 1;
        }
        self.set.movement_mut(id).moved = moved;

        let survivors = self.world.take_units(
            origin,
            UnitKind::Troop,
            troops.saturating_sub(moved),
            partial,
        )?;
        if !survivors.is_empty() {
            self.world.set_owner(destination, Some(issuer))?;
            for unit in &survivors {
                self.world.move_unit(*unit, destination)?;
            }
            self.set.movement_mut(id).moved += survivors.len() as u32;
            debug!(instruction = %id, survivors = survivors.len(), "destination occupied");
        } else if self.world.territory(destination)?.is_empty() {
            self.world.set_owner(destination, None)?;
            debug!(instruction = %id, destination = %destination, "destination left neutral");
        }
        Ok(())
    }

    /// Trades troops with the other parties heading for the same destination
    /// until this movement or every opponent is spent.
    fn skirmish(&mut self, id: InstructionId) -> Result<Next, ExecutionError> {
        let m = self.set.movement_ref(id);
        let (origin, destination) = (m.origin, m.destination);
        let mut peers: Vec<InstructionId> = m
            .skirmish_peers
            .iter()
            .copied()
            .filter(|peer| !self.set.movement_ref(*peer).is_executed())
            .collect();

        while !peers.is_empty() {
            let fight = peers
                .iter()
                .chain(iter::once(&id))
                .map(|party| self.set.movement_ref(*party).remaining())
                .min()
                .unwrap_or(0);
            debug!(instruction = %id, troops = fight, parties = peers.len() + 1, "skirmish round");

            for party in peers.iter().copied().chain(iter::once(id)) {
                let partial = self.allows_partial(party);
                let party_origin = self.set.movement_ref(party).origin;
                self.world
                    .remove_units(party_origin, UnitKind::Troop, fight, partial)?;
                self.set.movement_mut(party).moved += fight;
            }
            for &peer in &peers {
                let p = self.set.movement_mut(peer);
                if p.remaining() == 0 {
                    p.state = ExecutionState::Executed;
                    debug!(instruction = %peer, "skirmish peer spent");
                }
            }

            if self.set.movement_ref(id).remaining() == 0 {
                return Ok(Next::Finish);
            }
            peers.retain(|peer| !self.set.movement_ref(*peer).is_executed());
        }

        if self.world.troops(origin)? == 0 {
            return Ok(Next::Finish);
        }
        if self.world.territory(destination)?.is_neutral() {
            debug!(instruction = %id, "skirmish won; expanding");
            self.expand(id)
        } else {
            debug!(instruction = %id, "skirmish won; invading");
            Ok(Next::Invade)
        }
    }
}
