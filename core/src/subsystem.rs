//! Cascade step trait.
//!
//! RULE: Every cascade step implements SimSubsystem.
//! The engine calls update() on each registered step in registration
//! order. Execution order is fixed and documented in engine.rs.

use crate::{
    clock::SimTime,
    error::SimResult,
    event::SimEvent,
    rng::{SubsystemRng, SubsystemSlot},
    snapshot::WorldSnapshot,
    state::SimState,
    types::Tick,
};

/// What a step knows about the tick it runs in.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub tick:  Tick,
    pub time:  SimTime,
    /// Taken immediately before this step runs.
    pub world: WorldSnapshot,
}

/// The contract every cascade step must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name, used in logs and the event log.
    fn name(&self) -> &'static str;

    /// RNG slot this step draws from.
    fn slot(&self) -> SubsystemSlot;

    /// Run once for this tick.
    ///
    /// - `state`: the step mutates its own container and reaches others
    ///   only through their public operations
    /// - `ctx`:   tick, time, and a read-only world snapshot
    /// - `rng`:   this step's deterministic RNG for this tick
    ///
    /// Returns the events to add to the tick's event log.
    fn update(
        &mut self,
        state: &mut SimState,
        ctx:   &StepContext,
        rng:   &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>>;
}
