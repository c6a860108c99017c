//! Lap station runtime
//!
//! Ties the collaborators together: startup (clock handshake, counter load,
//! roster echo) and the per-tick loop body. Hardware stays behind traits so
//! the same station runs on the device and in host simulation.

use core::fmt;

use log::{error, info, warn};
use thiserror::Error;

use crate::clock::{acquire_clock, WallClock};
use crate::config::LapCounterConfig;
use crate::controller::{LapEvent, LapEventController};
use crate::presentation::{
    DiagnosticSink, LapDisplay, LapPublisher, STATUS_CLOCK_FAILED, STATUS_CLOCK_READY,
    STATUS_STARTING,
};
use crate::roster::Roster;
use crate::selector::RandomSource;
use crate::storage::SlotStorage;

/// Digital lap sensor, polled once per tick
pub trait LapSensor {
    /// HIGH = something is in the lap region
    fn is_active(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    ClockUnavailable,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::ClockUnavailable => write!(f, "clock unavailable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationState {
    Running,
    Halted(HaltReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StationError {
    #[error("station halted: {0}")]
    Halted(HaltReason),
}

/// Devices consumed by [`LapStation::start`]
pub struct StationParts<C, I, S, R> {
    pub clock: C,
    pub sensor: I,
    pub storage: S,
    pub rng: R,
}

enum Stage<S, R> {
    Running(LapEventController<S, R>),
    Halted(HaltReason),
}

pub struct LapStation<C, I, S, R, D, G> {
    clock: C,
    sensor: I,
    publisher: LapPublisher<D, G>,
    /// Most recent good clock reading, reused when a read fails
    last_epoch: i64,
    stage: Stage<S, R>,
}

impl<C, I, S, R, D, G> LapStation<C, I, S, R, D, G>
where
    C: WallClock,
    I: LapSensor,
    S: SlotStorage,
    R: RandomSource,
    D: LapDisplay,
    G: DiagnosticSink,
{
    /// Run the startup sequence.
    ///
    /// The sensor is never read here. If the clock cannot be acquired, or
    /// never yields a first reading, within the configured window the station
    /// comes back halted; storage is not touched in that case.
    ///
    /// `sleep_ms` is used for the clock backoff only.
    pub fn start(
        roster: Roster,
        parts: StationParts<C, I, S, R>,
        mut publisher: LapPublisher<D, G>,
        config: &LapCounterConfig,
        sleep_ms: &mut dyn FnMut(u32),
    ) -> Self {
        let StationParts {
            mut clock,
            sensor,
            storage,
            rng,
        } = parts;

        if !config.diagnostics_enabled {
            publisher.disable_diagnostics();
        }

        publisher.show_status(0, STATUS_STARTING);

        let last_epoch = match acquire_clock(&mut clock, &config.startup, sleep_ms) {
            Ok(acquired) => acquired.epoch,
            Err(e) => {
                error!("Startup halted: {}", e);
                publisher.show_halt(STATUS_CLOCK_FAILED);
                return Self {
                    clock,
                    sensor,
                    publisher,
                    last_epoch: 0,
                    stage: Stage::Halted(HaltReason::ClockUnavailable),
                };
            }
        };
        publisher.show_status(1, STATUS_CLOCK_READY);

        let controller = LapEventController::new(roster, storage, rng, config);
        publisher.publish_roster(controller.roster(), controller.counts());
        info!(
            "Station running: {} vehicles, debounce {} ms",
            roster.len(),
            config.debounce_ms
        );

        Self {
            clock,
            sensor,
            publisher,
            last_epoch,
            stage: Stage::Running(controller),
        }
    }

    /// One pass of the main loop.
    ///
    /// # Returns
    /// The lap confirmed during this tick, if any. Always `Err` once halted.
    pub fn tick(&mut self, now_ms: u32) -> Result<Option<LapEvent>, StationError> {
        let controller = match &mut self.stage {
            Stage::Running(controller) => controller,
            Stage::Halted(reason) => return Err(StationError::Halted(*reason)),
        };

        let level = self.sensor.is_active();
        let epoch = match self.clock.now() {
            Ok(epoch) => {
                self.last_epoch = epoch;
                epoch
            }
            Err(e) => {
                warn!("Clock read failed ({}), reusing last reading", e);
                self.last_epoch
            }
        };

        let event = controller.tick(level, now_ms, epoch);
        if let Some(event) = &event {
            self.publisher.publish_lap(event);
        }
        Ok(event)
    }

    pub fn state(&self) -> StationState {
        match &self.stage {
            Stage::Running(_) => StationState::Running,
            Stage::Halted(reason) => StationState::Halted(*reason),
        }
    }

    pub fn controller(&self) -> Option<&LapEventController<S, R>> {
        match &self.stage {
            Stage::Running(controller) => Some(controller),
            Stage::Halted(_) => None,
        }
    }

    pub fn publisher(&self) -> &LapPublisher<D, G> {
        &self.publisher
    }

    /// Shut down and hand back the counter storage (`None` if halted)
    pub fn into_storage(self) -> Option<S> {
        match self.stage {
            Stage::Running(controller) => Some(controller.into_storage()),
            Stage::Halted(_) => None,
        }
    }
}
