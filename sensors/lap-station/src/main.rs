mod config;
mod i2c_bus;
mod lcd;
mod nvs_storage;
mod rng;
mod rtc;
mod sensor;

use config::StationConfig;
use esp_idf_hal::{
    delay::FreeRtos,
    i2c::{I2cConfig, I2cDriver},
    peripherals::Peripherals,
    units::Hertz,
};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use i2c_bus::SharedI2c;
use lap_counter::{
    LapPublisher, LapStation, LogDiagnostics, RngSource, Roster, StationParts, StationState,
    DEFAULT_ROSTER,
};
use lcd::I2cLcd;
use log::{error, info, warn};
use nvs_storage::NvsSlots;
use rng::EspRng;
use rtc::Ds1307Clock;
use sensor::GpioLapSensor;

fn now_ms() -> u32 {
    unsafe { (esp_idf_svc::sys::esp_timer_get_time() / 1000) as u32 }
}

fn main() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let config = StationConfig::from_env();

    info!("=== ESP32-C3 Lap Station ===");
    info!(
        "Debounce: {}ms, UTC offset: {}s, Poll: {}ms, Diagnostics: {}",
        config.laps.debounce_ms,
        config.laps.utc_offset_seconds,
        config.poll_interval_ms,
        if config.laps.diagnostics_enabled {
            "on"
        } else {
            "off"
        }
    );

    let roster = Roster::new(&DEFAULT_ROSTER).expect("Built-in roster is invalid");

    // Initialize hardware
    let peripherals = Peripherals::take().unwrap();
    let nvs = EspDefaultNvsPartition::take().expect("NVS partition unavailable");

    let i2c_config = I2cConfig::new().baudrate(Hertz(config.bus.baudrate_hz));
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6,
        peripherals.pins.gpio7,
        &i2c_config,
    )
    .expect("I2C init failed");
    let bus = SharedI2c::new(i2c);

    // The display is optional: laps are still counted and logged without it
    let display = match I2cLcd::init(bus.clone(), config.bus.lcd_address, &config.lcd) {
        Ok(lcd) => Some(lcd),
        Err(e) => {
            warn!("LCD unavailable, continuing without it: {}", e);
            None
        }
    };

    let parts = StationParts {
        clock: Ds1307Clock::new(bus.clone(), config.bus.rtc_address),
        sensor: GpioLapSensor::new(peripherals.pins.gpio2).expect("Sensor pin init failed"),
        storage: NvsSlots::new(nvs, roster.len()).expect("NVS namespace open failed"),
        rng: RngSource(EspRng),
    };
    let publisher = LapPublisher::new(display, Some(LogDiagnostics::new()));

    let mut station = LapStation::start(
        roster,
        parts,
        publisher,
        &config.laps,
        &mut |ms| FreeRtos::delay_ms(ms),
    );

    if let StationState::Halted(reason) = station.state() {
        error!("Lap station halted: {}", reason);
        return;
    }

    info!("Waiting for laps");
    let mut reported = station.publisher().stats();
    loop {
        if let Err(e) = station.tick(now_ms()) {
            error!("{}", e);
            return;
        }

        let stats = station.publisher().stats();
        if stats != reported {
            warn!(
                "Output failures: display {}, diagnostics {}",
                stats.display_failures, stats.diagnostic_failures
            );
            reported = stats;
        }

        FreeRtos::delay_ms(config.poll_interval_ms);
    }
}
