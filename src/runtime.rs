//! The per-party protocol lifecycle state machine, capacity ceilings, header
//! stamping and gate-cost accounting.
//!
//! The runtime is a plain value threaded into protocol implementations, not a
//! base class: protocol variants compose it and drive the transitions
//! explicitly.

use tracing::{debug, trace};

use crate::{
    error::Error,
    packet::{PacketHeader, Party, ProtocolDescriptor},
};

/// The lifecycle states of a protocol party.
///
/// `Uninit → InitBegin → Ready → PtoBegin → PtoStep* → PtoEnd → Ready` (loop),
/// with [`PtoState::Destroyed`] reachable from every state and terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtoState {
    /// Constructed, `init()` not yet called.
    Uninit,
    /// `init()` in progress.
    InitBegin,
    /// Initialized and idle between protocol invocations.
    Ready,
    /// A wire-consuming protocol invocation has started.
    PtoBegin,
    /// Inside a protocol step.
    PtoStep,
    /// The invocation finished; transient, collapses back to [`PtoState::Ready`].
    PtoEnd,
    /// `destroy()` was called. Terminal.
    Destroyed,
}

/// Per-party protocol state: identity, task context, lifecycle, capacity
/// ceilings and gate counters.
#[derive(Debug)]
pub struct ProtocolRuntime {
    descriptor: ProtocolDescriptor,
    party: Party,
    peer: Party,
    task_id: i64,
    state: PtoState,
    max_round_num: u64,
    update_num: u64,
    round_num: u64,
    and_gates: u64,
    xor_gates: u64,
    sync_seq: i64,
}

impl ProtocolRuntime {
    /// Creates a runtime in the [`PtoState::Uninit`] state.
    pub fn new(descriptor: ProtocolDescriptor, party: Party, peer: Party, task_id: i64) -> Self {
        ProtocolRuntime {
            descriptor,
            party,
            peer,
            task_id,
            state: PtoState::Uninit,
            max_round_num: 0,
            update_num: 0,
            round_num: 0,
            and_gates: 0,
            xor_gates: 0,
            sync_seq: 0,
        }
    }

    /// Records capacity ceilings and transitions `Uninit → Ready`.
    ///
    /// `max_round_num` bounds the number of wire-consuming gate rounds,
    /// `update_num` the width of a single gate call in bits. Callers propagate
    /// `max_round_num * update_num` to their triple source.
    pub fn init(&mut self, max_round_num: u64, update_num: u64) -> Result<(), Error> {
        if self.state != PtoState::Uninit {
            return Err(Error::State {
                op: "init",
                state: self.state,
            });
        }
        if max_round_num == 0 || update_num == 0 {
            return Err(Error::InvalidInput(
                "capacity ceilings must be positive".into(),
            ));
        }
        self.state = PtoState::InitBegin;
        trace!(state = ?self.state, "transition");
        self.max_round_num = max_round_num;
        self.update_num = update_num;
        self.state = PtoState::Ready;
        debug!(
            pto = self.descriptor.pto_name,
            party = %self.party.name,
            task_id = self.task_id,
            max_round_num,
            update_num,
            "initialized"
        );
        Ok(())
    }

    /// Fails with [`Error::State`] unless the runtime is [`PtoState::Ready`].
    pub fn ensure_ready(&self, op: &'static str) -> Result<(), Error> {
        if self.state != PtoState::Ready {
            return Err(Error::State {
                op,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Fails with [`Error::RoundLimitReached`] once all rounds declared at
    /// init are spent. Callers check this before consuming other resources.
    pub fn check_round(&self) -> Result<(), Error> {
        if self.round_num == self.max_round_num {
            return Err(Error::RoundLimitReached(self.max_round_num));
        }
        Ok(())
    }

    /// Starts a wire-consuming invocation, `Ready → PtoBegin`, consuming one of
    /// the `max_round_num` rounds declared at init.
    pub fn begin(&mut self, op: &'static str) -> Result<(), Error> {
        self.ensure_ready(op)?;
        self.check_round()?;
        self.round_num += 1;
        self.state = PtoState::PtoBegin;
        Ok(())
    }

    /// Marks a protocol step, `PtoBegin | PtoStep → PtoStep`.
    pub fn step(&mut self, op: &'static str) -> Result<(), Error> {
        match self.state {
            PtoState::PtoBegin | PtoState::PtoStep => {
                self.state = PtoState::PtoStep;
                Ok(())
            }
            state => Err(Error::State { op, state }),
        }
    }

    /// Finishes the invocation, `PtoBegin | PtoStep → PtoEnd → Ready`.
    pub fn end(&mut self, op: &'static str) -> Result<(), Error> {
        match self.state {
            PtoState::PtoBegin | PtoState::PtoStep => {
                self.state = PtoState::PtoEnd;
                trace!(op, state = ?self.state, "transition");
                self.state = PtoState::Ready;
                Ok(())
            }
            state => Err(Error::State { op, state }),
        }
    }

    /// Transitions to [`PtoState::Destroyed`]; valid from every state.
    pub fn destroy(&mut self) {
        debug!(
            pto = self.descriptor.pto_name,
            party = %self.party.name,
            task_id = self.task_id,
            "destroyed"
        );
        self.state = PtoState::Destroyed;
    }

    /// The current lifecycle state.
    pub fn state(&self) -> PtoState {
        self.state
    }

    /// Validates the width of one gate call against the declared ceiling.
    pub fn check_width(&self, num: usize) -> Result<(), Error> {
        if num == 0 {
            return Err(Error::EmptyVector);
        }
        if num as u64 > self.update_num {
            return Err(Error::WidthExceeded {
                num,
                max: self.update_num,
            });
        }
        Ok(())
    }

    /// The header for an outbound packet of the given step and sequence.
    pub fn stamp(&self, step_id: i32, sequence: i64) -> PacketHeader {
        PacketHeader {
            task_id: self.task_id,
            pto_id: self.descriptor.pto_id,
            step_id,
            sequence,
            sender: self.party.id,
            receiver: self.peer.id,
        }
    }

    /// The header template the peer's packet of this step and sequence carries.
    pub fn expect(&self, step_id: i32, sequence: i64) -> PacketHeader {
        self.stamp(step_id, sequence).mirrored()
    }

    /// Adds `num` AND gates to the running counter and returns the new total,
    /// which the AND gate uses verbatim as its message sequence.
    pub fn count_and(&mut self, num: usize) -> i64 {
        self.and_gates += num as u64;
        self.and_gates as i64
    }

    /// Adds `num` XOR gates to the running counter.
    pub fn count_xor(&mut self, num: usize) {
        self.xor_gates += num as u64;
    }

    /// The next sequence value for a barrier packet.
    pub fn next_sync_seq(&mut self) -> i64 {
        self.sync_seq += 1;
        self.sync_seq
    }

    /// Returns the accumulated AND gate count, zeroing it if `reset` is set.
    pub fn and_gate_num(&mut self, reset: bool) -> u64 {
        let total = self.and_gates;
        if reset {
            self.and_gates = 0;
        }
        total
    }

    /// Returns the accumulated XOR gate count, zeroing it if `reset` is set.
    pub fn xor_gate_num(&mut self, reset: bool) -> u64 {
        let total = self.xor_gates;
        if reset {
            self.xor_gates = 0;
        }
        total
    }

    /// The task id this runtime was created for. Reset of the gate accounting
    /// never changes it.
    pub fn task_id(&self) -> i64 {
        self.task_id
    }
}
