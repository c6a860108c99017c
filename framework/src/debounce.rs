//! Time-based debounce for the lap sensor input
//!
//! A raw level has to hold for longer than the debounce delay before it is
//! accepted as the new stable level. Only the accepted LOW → HIGH transition
//! is reported; an accepted release just updates the stable level.
//!
//! ```text
//! raw     ___|‾|_|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|_|‾|____________
//! stable  ___________________|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|___
//!                            ^ Rising
//! ```

/// Default debounce delay (milliseconds)
pub const DEFAULT_DEBOUNCE_MS: u32 = 50;

/// Edge reported by [`DebounceFilter::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Stable level went LOW → HIGH
    Rising,
}

/// Debounce state for one digital input
#[derive(Debug, Clone)]
pub struct DebounceFilter {
    /// Level seen on the previous call
    raw_level: bool,
    /// Last accepted level
    stable_level: bool,
    /// When `raw_level` last changed (ms)
    last_transition_ms: u32,
    debounce_ms: u32,
}

impl DebounceFilter {
    /// Create a filter with both levels LOW
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            raw_level: false,
            stable_level: false,
            last_transition_ms: 0,
            debounce_ms,
        }
    }

    /// Feed one sample. Returns `Some(Edge::Rising)` at most once per accepted
    /// LOW → HIGH transition.
    ///
    /// The new level is accepted only when the time since the last raw
    /// transition is strictly greater than the debounce delay. Elapsed time
    /// uses wrapping arithmetic so a 32-bit millisecond counter may roll over.
    pub fn observe(&mut self, raw_level: bool, now_ms: u32) -> Option<Edge> {
        if raw_level != self.raw_level {
            self.last_transition_ms = now_ms;
        }
        self.raw_level = raw_level;

        let elapsed = now_ms.wrapping_sub(self.last_transition_ms);
        if elapsed <= self.debounce_ms || raw_level == self.stable_level {
            return None;
        }

        self.stable_level = raw_level;
        if raw_level {
            Some(Edge::Rising)
        } else {
            None
        }
    }

    /// Last accepted level
    pub fn stable_level(&self) -> bool {
        self.stable_level
    }

    pub fn debounce_ms(&self) -> u32 {
        self.debounce_ms
    }
}

impl Default for DebounceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}
