//! Simulates a race session at the finish line
//!
//! Drives the full lap station on the host: a chattering motion sensor, a
//! clock that needs a few handshakes before it answers, RAM-backed counter
//! slots, a 16x2 text display and the log-backed diagnostic channel. The
//! session is then power-cycled to show counters surviving the restart, and
//! finally a station is started with a dead clock to show the halt screen.
//!
//! Run with: RUST_LOG=info cargo run -p lap-counter --example track_sim

use std::cell::Cell;
use std::rc::Rc;

use lap_counter::{
    ClockError, LapCounterConfig, LapPublisher, LapSensor, LapStation, LogDiagnostics,
    MemorySlots, RngSource, Roster, StationParts, StationState, TextDisplay, WallClock,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// 2024-03-10 14:00:00 UTC
const SESSION_START_EPOCH: i64 = 1_710_079_200;

/// Main loop period (ms)
const TICK_MS: u32 = 5;

/// A car crosses the line every this many ms
const PASS_INTERVAL_MS: u32 = 3000;
/// Offset of each pass within its interval
const PASS_START_MS: u32 = 1000;
/// Sensor stays HIGH this long per pass
const PASS_LENGTH_MS: u32 = 800;
/// Contact chatter at the start of each pass
const CHATTER_MS: u32 = 30;
/// 20 ms spike between passes, too short to pass the debounce filter
const GLITCH_MS: core::ops::Range<u32> = 2500..2520;

/// Simulated monotonic time shared by the fake devices
#[derive(Clone, Default)]
struct SimTime(Rc<Cell<u32>>);

impl SimTime {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }

    fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

/// RTC that ignores the first few handshakes, like a chip still powering up
struct SimClock {
    time: SimTime,
    ignored_begins: u32,
}

impl WallClock for SimClock {
    fn begin(&mut self) -> Result<(), ClockError> {
        if self.ignored_begins > 0 {
            self.ignored_begins -= 1;
            return Err(ClockError::NotResponding);
        }
        Ok(())
    }

    fn now(&mut self) -> Result<i64, ClockError> {
        Ok(SESSION_START_EPOCH + i64::from(self.time.now_ms() / 1000))
    }
}

/// PIR output with chatter on every rising edge and a short glitch
/// halfway between passes
struct BouncingSensor {
    time: SimTime,
    session_start_ms: u32,
}

impl LapSensor for BouncingSensor {
    fn is_active(&mut self) -> bool {
        let t = self.time.now_ms().wrapping_sub(self.session_start_ms) % PASS_INTERVAL_MS;
        match t {
            t if t < PASS_START_MS => false,
            t if t < PASS_START_MS + CHATTER_MS => ((t - PASS_START_MS) / 4) % 2 == 0,
            t if t < PASS_START_MS + PASS_LENGTH_MS => true,
            t => GLITCH_MS.contains(&t),
        }
    }
}

fn print_display(display: Option<&TextDisplay>) {
    if let Some(display) = display {
        println!("  +----------------+");
        println!("  |{:<16}|", display.row_text(0));
        println!("  |{:<16}|", display.row_text(1));
        println!("  +----------------+");
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = LapCounterConfig::default().with_utc_offset_hours(-3);
    let roster = Roster::default();
    let time = SimTime::default();
    let mut storage_image = MemorySlots::erased(roster.len()).into_bytes();

    println!("=== Lap Station Track Simulation ===\n");

    for session in 1..=2 {
        println!("Session {}: power on", session);
        let parts = StationParts {
            clock: SimClock {
                time: time.clone(),
                ignored_begins: 2,
            },
            sensor: BouncingSensor {
                time: time.clone(),
                session_start_ms: time.now_ms(),
            },
            storage: MemorySlots::from_bytes(storage_image),
            rng: RngSource(SmallRng::seed_from_u64(session)),
        };
        let publisher = LapPublisher::new(Some(TextDisplay::lcd1602()), Some(LogDiagnostics::new()));

        let sleep_time = time.clone();
        let mut station = LapStation::start(
            roster,
            parts,
            publisher,
            &config,
            &mut |ms| sleep_time.advance(ms),
        );
        print_display(station.publisher().display());
        assert_eq!(station.state(), StationState::Running);

        let session_ms = PASS_INTERVAL_MS * (roster.len() as u32 * 2);
        let mut laps = 0;
        for _ in 0..session_ms / TICK_MS {
            match station.tick(time.now_ms()) {
                Ok(Some(lap)) => {
                    laps += 1;
                    println!(
                        "  t={:>6}ms  lap {:>3}  {:<8} ({})",
                        time.now_ms(),
                        lap.lap_number,
                        lap.vehicle.name,
                        lap.timestamp
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    println!("  unexpected: {}", e);
                    break;
                }
            }
            time.advance(TICK_MS);
        }

        print_display(station.publisher().display());
        if let Some(controller) = station.controller() {
            println!("  {} laps this session, counts now {:?}\n", laps, controller.counts());
        }

        // Power cycle: only the slot image survives
        storage_image = match station.into_storage() {
            Some(slots) => slots.into_bytes(),
            None => MemorySlots::erased(roster.len()).into_bytes(),
        };
    }

    println!("Session 3: RTC disconnected");
    let parts = StationParts {
        clock: SimClock {
            time: time.clone(),
            ignored_begins: u32::MAX,
        },
        sensor: BouncingSensor {
            time: time.clone(),
            session_start_ms: time.now_ms(),
        },
        storage: MemorySlots::from_bytes(storage_image),
        rng: RngSource(SmallRng::seed_from_u64(3)),
    };
    let publisher = LapPublisher::new(Some(TextDisplay::lcd1602()), Some(LogDiagnostics::new()));
    let sleep_time = time.clone();
    let mut station = LapStation::start(
        roster,
        parts,
        publisher,
        &config,
        &mut |ms| sleep_time.advance(ms),
    );
    print_display(station.publisher().display());
    println!("  state: {:?}", station.state());
    if let Err(e) = station.tick(time.now_ms()) {
        println!("  tick refused: {}", e);
    }
}
