//! 16x2 LCD behind a PCF8574 backpack

use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_svc::sys::EspError;
use lap_counter::{LapDisplay, PresentationError};
use lcd1602::{
    rom_char, Encoder, CLEAR_DELAY_US, CMD_CLEAR, INIT_COMMANDS, INIT_NIBBLES, POWER_ON_DELAY_MS,
};
use log::info;

use crate::config::LcdConfig;
use crate::i2c_bus::SharedI2c;

pub struct I2cLcd {
    bus: SharedI2c,
    address: u8,
    encoder: Encoder,
    /// Column the next character lands in; the controller wraps into
    /// off-screen DDRAM, so printing stops at the last visible column
    col: u8,
}

fn write_failed(e: EspError) -> PresentationError {
    PresentationError::Write(e.to_string())
}

impl I2cLcd {
    /// Reset the controller into 4-bit mode and clear it
    pub fn init(bus: SharedI2c, address: u8, config: &LcdConfig) -> Result<Self, EspError> {
        let encoder = Encoder::with_geometry(config.backlight, config.columns, config.rows);

        FreeRtos::delay_ms(POWER_ON_DELAY_MS);
        bus.write(address, &[encoder.backlight_frame()])?;

        for (nibble, wait_us) in INIT_NIBBLES {
            bus.write(address, &encoder.init_nibble(nibble))?;
            Ets::delay_us(wait_us);
        }
        for cmd in INIT_COMMANDS {
            bus.write(address, &encoder.command(cmd))?;
            if cmd == CMD_CLEAR {
                Ets::delay_us(CLEAR_DELAY_US);
            }
        }

        info!(
            "LCD {}x{} ready at {:#04x}",
            encoder.columns(),
            encoder.rows(),
            address
        );
        Ok(Self {
            bus,
            address,
            encoder,
            col: 0,
        })
    }
}

impl LapDisplay for I2cLcd {
    fn clear(&mut self) -> Result<(), PresentationError> {
        self.bus
            .write(self.address, &self.encoder.command(CMD_CLEAR))
            .map_err(write_failed)?;
        Ets::delay_us(CLEAR_DELAY_US);
        self.col = 0;
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), PresentationError> {
        let cmd = self
            .encoder
            .set_cursor(col, row)
            .map_err(|_| PresentationError::CursorOutOfRange { col, row })?;
        self.bus
            .write(self.address, &self.encoder.command(cmd))
            .map_err(write_failed)?;
        self.col = col;
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<(), PresentationError> {
        for ch in text.chars() {
            if self.col >= self.encoder.columns() {
                break;
            }
            self.bus
                .write(self.address, &self.encoder.data(rom_char(ch)))
                .map_err(write_failed)?;
            self.col += 1;
        }
        Ok(())
    }
}
