/// Configuration for the lap station firmware
/// Hardware wiring plus the lap counter settings, with compile-time overrides
use lap_counter::LapCounterConfig;

/// I2C bus shared by the clock and the display
#[derive(Debug, Clone, Copy)]
pub struct BusConfig {
    pub baudrate_hz: u32,
    pub rtc_address: u8,
    pub lcd_address: u8,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            baudrate_hz: 100_000,
            rtc_address: ds1307::ADDRESS,
            lcd_address: lcd1602::DEFAULT_ADDRESS,
        }
    }
}

/// Character LCD geometry
#[derive(Debug, Clone, Copy)]
pub struct LcdConfig {
    pub columns: u8,
    pub rows: u8,
    pub backlight: bool,
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            columns: lcd1602::COLUMNS,
            rows: lcd1602::ROWS,
            backlight: true,
        }
    }
}

/// Master station configuration
#[derive(Debug, Clone, Copy)]
pub struct StationConfig {
    pub bus: BusConfig,
    pub lcd: LcdConfig,
    /// Main loop period (ms)
    pub poll_interval_ms: u32,
    pub laps: LapCounterConfig,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            lcd: LcdConfig::default(),
            poll_interval_ms: 5,
            laps: LapCounterConfig::default(),
        }
    }
}

impl StationConfig {
    /// Create configuration from environment variables (compile-time)
    ///
    /// ```bash
    /// export UTC_OFFSET_HOURS="-3"   # local time shown on the LCD
    /// export LAP_DIAGNOSTICS="off"   # silence the serial lap log
    /// export DEBOUNCE_MS="80"
    /// cargo build --release
    /// ```
    ///
    /// Unparseable values are ignored and the default kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(hours) = option_env!("UTC_OFFSET_HOURS").and_then(|v| v.trim().parse().ok()) {
            config.laps = config.laps.with_utc_offset_hours(hours);
        }

        if let Some(flag) = option_env!("LAP_DIAGNOSTICS") {
            config.laps.diagnostics_enabled = !matches!(
                flag.to_lowercase().as_str(),
                "0" | "off" | "false" | "no"
            );
        }

        if let Some(ms) = option_env!("DEBOUNCE_MS").and_then(|v| v.trim().parse().ok()) {
            config.laps.debounce_ms = ms;
        }

        config
    }
}
