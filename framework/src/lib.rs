//! Lap Counter Framework
//!
//! Hardware-independent core of a trackside lap counter. A single motion
//! sensor sees something cross the line; each debounced rising edge becomes a
//! lap, attributed to a vehicle drawn fairly from a fixed roster, counted in
//! non-volatile slots and shown with the local time of day.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Station (startup, per-tick loop body)  │
//! ├─────────────────────────────────────────┤
//! │  Lap Event Controller                   │
//! │  debounce → selector → counters         │
//! ├─────────────────────────────────────────┤
//! │  Collaborators (traits)                 │
//! │  clock, sensor, slots, rng, outputs     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lap_counter::{
//!     LapCounterConfig, LapPublisher, LapStation, LineRecorder, MemorySlots, Roster,
//!     RngSource, StationParts, TextDisplay,
//! };
//! # use lap_counter::{ClockError, LapSensor, WallClock};
//! # struct Rtc;
//! # impl WallClock for Rtc {
//! #     fn begin(&mut self) -> Result<(), ClockError> { Ok(()) }
//! #     fn now(&mut self) -> Result<i64, ClockError> { Ok(0) }
//! # }
//! # struct Pir;
//! # impl LapSensor for Pir { fn is_active(&mut self) -> bool { false } }
//! # use rand::SeedableRng;
//! let parts = StationParts {
//!     clock: Rtc,
//!     sensor: Pir,
//!     storage: MemorySlots::erased(4),
//!     rng: RngSource(rand::rngs::SmallRng::seed_from_u64(7)),
//! };
//! let publisher = LapPublisher::new(Some(TextDisplay::lcd1602()), Some(LineRecorder::new()));
//! let mut station = LapStation::start(
//!     Roster::default(),
//!     parts,
//!     publisher,
//!     &LapCounterConfig::default(),
//!     &mut |ms| std::thread::sleep(std::time::Duration::from_millis(ms.into())),
//! );
//!
//! let mut now_ms = 0u32;
//! while let Ok(lap) = station.tick(now_ms) {
//!     if let Some(lap) = lap {
//!         println!("lap {} for {}", lap.lap_number, lap.vehicle.name);
//!     }
//!     now_ms = now_ms.wrapping_add(5);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`roster`] - Fixed vehicle roster
//! - [`debounce`] - Sensor edge filter
//! - [`storage`] - Fixed-offset counter slots
//! - [`counters`] - Self-healing persistent lap counts
//! - [`selector`] - Fair without-replacement assignment
//! - [`clock`] - Wall clock trait, time of day, startup acquisition
//! - [`controller`] - Per-tick lap pipeline
//! - [`presentation`] - Display and diagnostic output
//! - [`sinks`] - In-memory and log-backed outputs
//! - [`station`] - Startup sequence and main loop body

pub mod clock;
pub mod config;
pub mod controller;
pub mod counters;
pub mod debounce;
pub mod presentation;
pub mod roster;
pub mod selector;
pub mod sinks;
pub mod station;
pub mod storage;

// Re-export commonly used types
pub use clock::{
    acquire_clock, AcquiredClock, ClockError, StartupError, StartupPolicy, WallClock, WallTime,
};
pub use config::LapCounterConfig;
pub use controller::{ControllerState, LapEvent, LapEventController};
pub use counters::CounterStore;
pub use debounce::{DebounceFilter, Edge};
pub use presentation::{DiagnosticSink, LapDisplay, LapPublisher, PresentationError, PublishStats};
pub use roster::{Roster, RosterError, Vehicle, DEFAULT_ROSTER};
pub use selector::{AssignmentPool, RandomSource, RngSource};
pub use sinks::{LineRecorder, LogDiagnostics, TextDisplay};
pub use station::{HaltReason, LapSensor, LapStation, StationError, StationParts, StationState};
pub use storage::{MemorySlots, SlotStorage, StorageError};
