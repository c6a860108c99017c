//! Lap event controller
//!
//! Owns every piece of mutable lap state: debounce filter, assignment pool,
//! counters and the random source. One call to [`LapEventController::tick`]
//! is one pass of the control loop; a confirmed lap is assigned, counted,
//! persisted and returned within that call.

use log::{debug, error};

use crate::clock::WallTime;
use crate::config::LapCounterConfig;
use crate::counters::CounterStore;
use crate::debounce::{DebounceFilter, Edge};
use crate::roster::{Roster, Vehicle};
use crate::selector::{AssignmentPool, RandomSource};
use crate::storage::SlotStorage;

/// A confirmed, attributed lap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapEvent {
    /// Vehicle's lap count including this lap
    pub lap_number: u16,
    pub vehicle: Vehicle,
    /// Adjusted wall-clock time of the tick that confirmed the lap
    pub timestamp: WallTime,
}

/// Controller state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    /// Waiting for a rising edge
    Idle,
    /// Lap confirmed, being assigned and counted
    Reporting,
}

pub struct LapEventController<S, R> {
    roster: Roster,
    filter: DebounceFilter,
    pool: AssignmentPool,
    counters: CounterStore<S>,
    rng: R,
    utc_offset_seconds: i64,
    state: ControllerState,
}

impl<S: SlotStorage, R: RandomSource> LapEventController<S, R> {
    /// Load counters from `storage` and start idle with a full pool
    pub fn new(roster: Roster, storage: S, rng: R, config: &LapCounterConfig) -> Self {
        Self {
            roster,
            filter: DebounceFilter::new(config.debounce_ms),
            pool: AssignmentPool::new(roster.len()),
            counters: CounterStore::load_all(storage, roster.len()),
            rng,
            utc_offset_seconds: config.utc_offset_seconds,
            state: ControllerState::Idle,
        }
    }

    /// One control-loop pass.
    ///
    /// # Arguments
    /// * `sensor_level` - Raw digital level (HIGH = lap region active)
    /// * `now_ms` - Monotonic milliseconds
    /// * `epoch_seconds` - Clock reading for this tick
    ///
    /// # Returns
    /// The lap event if this tick confirmed a rising edge
    pub fn tick(&mut self, sensor_level: bool, now_ms: u32, epoch_seconds: i64) -> Option<LapEvent> {
        let timestamp = WallTime::from_epoch(epoch_seconds, self.utc_offset_seconds);

        match self.filter.observe(sensor_level, now_ms) {
            Some(Edge::Rising) => {}
            None => return None,
        }

        self.state = ControllerState::Reporting;
        let event = self.report(timestamp);
        self.state = ControllerState::Idle;
        event
    }

    fn report(&mut self, timestamp: WallTime) -> Option<LapEvent> {
        let index = self.pool.choose(&mut self.rng);
        let Some(vehicle) = self.roster.get(index) else {
            error!("Pool produced vehicle {} outside the roster", index);
            return None;
        };

        let lap_number = match self.counters.increment_and_persist(index) {
            Ok(count) => count,
            Err(e) => {
                error!("Lap for vehicle {} not counted: {}", index, e);
                return None;
            }
        };

        debug!(
            "Lap {} assigned to {} ({} left in round)",
            lap_number,
            vehicle.short_code,
            self.pool.remaining().len()
        );

        Some(LapEvent {
            lap_number,
            vehicle: *vehicle,
            timestamp,
        })
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Lap counts in roster order
    pub fn counts(&self) -> &[u16] {
        self.counters.counts()
    }

    pub fn pool(&self) -> &AssignmentPool {
        &self.pool
    }

    pub fn counters(&self) -> &CounterStore<S> {
        &self.counters
    }

    pub fn into_storage(self) -> S {
        self.counters.into_storage()
    }
}
