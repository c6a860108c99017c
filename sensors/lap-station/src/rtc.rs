//! DS1307 wall clock on the shared I2C bus

use ds1307::{decode, is_halted, TIME_REGISTER, TIME_REGISTER_LEN};
use esp_idf_svc::sys::EspError;
use lap_counter::{ClockError, WallClock};
use log::{info, warn};

use crate::i2c_bus::SharedI2c;

pub struct Ds1307Clock {
    bus: SharedI2c,
    address: u8,
}

impl Ds1307Clock {
    pub fn new(bus: SharedI2c, address: u8) -> Self {
        Self { bus, address }
    }

    fn read_registers(&self) -> Result<[u8; TIME_REGISTER_LEN], EspError> {
        let mut regs = [0u8; TIME_REGISTER_LEN];
        self.bus.write_read(self.address, &[TIME_REGISTER], &mut regs)?;
        Ok(regs)
    }
}

impl WallClock for Ds1307Clock {
    /// Probe the chip. A stopped oscillator still counts as present.
    fn begin(&mut self) -> Result<(), ClockError> {
        let regs = self.read_registers().map_err(|e| {
            warn!("DS1307 at {:#04x} not answering: {}", self.address, e);
            ClockError::NotResponding
        })?;

        if is_halted(&regs) {
            warn!("DS1307 oscillator halted, time will not advance until it is set");
        }
        info!("DS1307 found at {:#04x}", self.address);
        Ok(())
    }

    fn now(&mut self) -> Result<i64, ClockError> {
        let regs = self
            .read_registers()
            .map_err(|e| ClockError::Bus(e.to_string()))?;
        let time = decode(&regs).map_err(|_| ClockError::InvalidReading)?;
        Ok(time.unix_time())
    }
}
