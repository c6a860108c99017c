//! Wall-clock source and startup acquisition
//!
//! The clock is the only collaborator the station cannot run without: a lap
//! without a trustworthy timestamp is not recorded at all. Startup therefore
//! retries the clock handshake and first reading with exponential backoff and
//! gives up after a bounded window.

use core::fmt;

use log::{info, warn};
use thiserror::Error;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("clock source did not respond")]
    NotResponding,
    #[error("clock returned an invalid reading")]
    InvalidReading,
    #[error("clock bus error: {0}")]
    Bus(String),
}

/// Real-time clock collaborator
pub trait WallClock {
    /// One-time handshake; must succeed before the first [`now`](Self::now)
    fn begin(&mut self) -> Result<(), ClockError>;

    /// Current time in seconds since the Unix epoch
    fn now(&mut self) -> Result<i64, ClockError>;
}

/// Time of day shown with each lap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl WallTime {
    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Time of day for an epoch reading shifted by a fixed offset.
    ///
    /// Plain arithmetic: no timezone tables, no daylight saving. Both terms
    /// are reduced to a day first, so any `i64` reading is accepted.
    pub fn from_epoch(epoch_seconds: i64, offset_seconds: i64) -> Self {
        let of_day = (epoch_seconds.rem_euclid(SECONDS_PER_DAY)
            + offset_seconds.rem_euclid(SECONDS_PER_DAY))
            % SECONDS_PER_DAY;
        Self {
            hour: (of_day / 3600) as u8,
            minute: (of_day % 3600 / 60) as u8,
            second: (of_day % 60) as u8,
        }
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Bounded retry schedule for the startup clock handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupPolicy {
    /// Give up once this much time has been spent waiting (ms)
    pub timeout_ms: u32,
    /// Delay after the first failed attempt (ms)
    pub initial_backoff_ms: u32,
    /// Backoff doubles up to this ceiling (ms)
    pub max_backoff_ms: u32,
}

impl Default for StartupPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            initial_backoff_ms: 250,
            max_backoff_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupError {
    #[error("clock unavailable after {attempts} attempts over {waited_ms} ms: {last_error}")]
    ClockUnavailable {
        attempts: u32,
        waited_ms: u32,
        last_error: ClockError,
    },
}

/// Outcome of a successful [`acquire_clock`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquiredClock {
    pub attempts: u32,
    /// First good reading (epoch seconds)
    pub epoch: i64,
}

/// Run the clock handshake and a first read until both succeed or the policy
/// window closes.
///
/// An attempt is `begin` followed by `now`; a failure of either counts as a
/// failed attempt. `sleep_ms` performs the backoff delay; the window is
/// measured as the sum of requested delays. The last attempt lands exactly on
/// the timeout.
pub fn acquire_clock<C: WallClock + ?Sized>(
    clock: &mut C,
    policy: &StartupPolicy,
    sleep_ms: &mut dyn FnMut(u32),
) -> Result<AcquiredClock, StartupError> {
    let mut attempts = 0;
    let mut waited_ms = 0u32;
    let mut backoff_ms = policy.initial_backoff_ms.max(1);

    loop {
        attempts += 1;
        let last_error = match clock.begin().and_then(|()| clock.now()) {
            Ok(epoch) => {
                info!("Clock ready after {} attempt(s)", attempts);
                return Ok(AcquiredClock { attempts, epoch });
            }
            Err(e) => e,
        };

        if waited_ms >= policy.timeout_ms {
            return Err(StartupError::ClockUnavailable {
                attempts,
                waited_ms,
                last_error,
            });
        }

        let delay_ms = backoff_ms.min(policy.timeout_ms - waited_ms);
        warn!(
            "Clock attempt {} failed ({}), retrying in {} ms",
            attempts, last_error, delay_ms
        );
        sleep_ms(delay_ms);
        waited_ms += delay_ms;
        backoff_ms = backoff_ms.saturating_mul(2).min(policy.max_backoff_ms.max(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPOCH: i64 = 1_710_079_509;

    /// Fails `begin`, then `now`, a fixed number of times each
    struct FlakyClock {
        failures_left: u32,
        read_failures_left: u32,
        begins: u32,
    }

    impl FlakyClock {
        fn failing(times: u32) -> Self {
            Self {
                failures_left: times,
                read_failures_left: 0,
                begins: 0,
            }
        }

        fn unreadable(times: u32) -> Self {
            Self {
                read_failures_left: times,
                ..Self::failing(0)
            }
        }
    }

    impl WallClock for FlakyClock {
        fn begin(&mut self) -> Result<(), ClockError> {
            self.begins += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                Err(ClockError::NotResponding)
            } else {
                Ok(())
            }
        }

        fn now(&mut self) -> Result<i64, ClockError> {
            if self.read_failures_left > 0 {
                self.read_failures_left -= 1;
                return Err(ClockError::InvalidReading);
            }
            Ok(EPOCH)
        }
    }

    #[test]
    fn test_wall_time_formatting() {
        assert_eq!(WallTime::new(14, 5, 9).to_string(), "14:05:09");
        assert_eq!(WallTime::new(0, 0, 0).to_string(), "00:00:00");
        assert_eq!(WallTime::new(23, 59, 59).to_string(), "23:59:59");
    }

    #[test]
    fn test_from_epoch_no_offset() {
        // 2024-03-10 14:05:09 UTC
        assert_eq!(WallTime::from_epoch(1_710_079_509, 0), WallTime::new(14, 5, 9));
    }

    #[test]
    fn test_from_epoch_negative_offset_wraps_day() {
        // 01:30:00 UTC shifted by -3 h
        let epoch = 1_710_028_800 + 5400;
        assert_eq!(
            WallTime::from_epoch(epoch, -3 * 3600),
            WallTime::new(22, 30, 0)
        );
    }

    #[test]
    fn test_from_epoch_positive_offset_wraps_day() {
        let epoch = 1_710_028_800 + 23 * 3600;
        assert_eq!(WallTime::from_epoch(epoch, 2 * 3600), WallTime::new(1, 0, 0));
    }

    #[test]
    fn test_from_epoch_extreme_readings() {
        let expected = |epoch: i64, offset: i64| {
            let of_day = (i128::from(epoch) + i128::from(offset)).rem_euclid(86_400);
            WallTime::new(
                (of_day / 3600) as u8,
                (of_day % 3600 / 60) as u8,
                (of_day % 60) as u8,
            )
        };

        for epoch in [i64::MAX, i64::MIN, i64::MAX - 1, i64::MIN + 1] {
            for offset in [3600, -3 * 3600, 0, 14 * 3600] {
                assert_eq!(WallTime::from_epoch(epoch, offset), expected(epoch, offset));
            }
        }
    }

    #[test]
    fn test_acquire_first_try() {
        let mut clock = FlakyClock::failing(0);
        let mut slept = Vec::new();
        let acquired =
            acquire_clock(&mut clock, &StartupPolicy::default(), &mut |ms| slept.push(ms)).unwrap();

        assert_eq!(acquired, AcquiredClock { attempts: 1, epoch: EPOCH });
        assert!(slept.is_empty());
    }

    #[test]
    fn test_acquire_after_retries() {
        let mut clock = FlakyClock::failing(2);
        let mut slept = Vec::new();
        let acquired =
            acquire_clock(&mut clock, &StartupPolicy::default(), &mut |ms| slept.push(ms)).unwrap();

        assert_eq!(acquired.attempts, 3);
        assert_eq!(slept, vec![250, 500]);
    }

    #[test]
    fn test_acquire_retries_failed_first_read() {
        let mut clock = FlakyClock::unreadable(2);
        let mut slept = Vec::new();
        let acquired =
            acquire_clock(&mut clock, &StartupPolicy::default(), &mut |ms| slept.push(ms)).unwrap();

        assert_eq!(acquired, AcquiredClock { attempts: 3, epoch: EPOCH });
        assert_eq!(slept, vec![250, 500]);
    }

    #[test]
    fn test_acquire_unreadable_clock_gives_up() {
        let mut clock = FlakyClock::unreadable(u32::MAX);
        let err = acquire_clock(&mut clock, &StartupPolicy::default(), &mut |_| {}).unwrap_err();

        assert_eq!(
            err,
            StartupError::ClockUnavailable {
                attempts: 6,
                waited_ms: 5000,
                last_error: ClockError::InvalidReading,
            }
        );
        assert_eq!(clock.begins, 6);
    }

    #[test]
    fn test_acquire_gives_up_at_timeout() {
        let mut clock = FlakyClock::failing(u32::MAX);
        let mut slept = Vec::new();
        let err =
            acquire_clock(&mut clock, &StartupPolicy::default(), &mut |ms| slept.push(ms)).unwrap_err();

        // 250 + 500 + 1000 + 2000 + 1250 (clipped to the window)
        assert_eq!(slept, vec![250, 500, 1000, 2000, 1250]);
        assert_eq!(
            err,
            StartupError::ClockUnavailable {
                attempts: 6,
                waited_ms: 5000,
                last_error: ClockError::NotResponding,
            }
        );
        assert_eq!(clock.begins, 6);
    }

    #[test]
    fn test_zero_timeout_single_attempt() {
        let mut clock = FlakyClock::failing(1);
        let policy = StartupPolicy {
            timeout_ms: 0,
            ..StartupPolicy::default()
        };
        let result = acquire_clock(&mut clock, &policy, &mut |_| panic!("must not sleep"));
        assert!(result.is_err());
        assert_eq!(clock.begins, 1);
    }
}
