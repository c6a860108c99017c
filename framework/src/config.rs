//! Lap counter configuration
//!
//! Deployment constants live in [`Default`]. Firmware applies its compile-time
//! overrides on top before building the station.

use crate::clock::StartupPolicy;
use crate::debounce::DEFAULT_DEBOUNCE_MS;

/// Local-time adjustment applied to every clock reading (hours)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapCounterConfig {
    /// Sensor level must hold longer than this before it is accepted (ms)
    pub debounce_ms: u32,
    /// Added to the clock's epoch reading before formatting.
    /// A single opaque local adjustment, not a timezone.
    pub utc_offset_seconds: i64,
    /// Echo laps and startup counters on the diagnostic channel
    pub diagnostics_enabled: bool,
    /// Clock handshake retry window
    pub startup: StartupPolicy,
}

impl LapCounterConfig {
    pub fn with_utc_offset_hours(mut self, hours: i32) -> Self {
        self.utc_offset_seconds = i64::from(hours) * 3600;
        self
    }
}

impl Default for LapCounterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            utc_offset_seconds: i64::from(DEFAULT_UTC_OFFSET_HOURS) * 3600,
            diagnostics_enabled: true,
            startup: StartupPolicy::default(),
        }
    }
}
