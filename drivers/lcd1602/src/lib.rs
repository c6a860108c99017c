//! HD44780 Character LCD over a PCF8574 I2C Backpack
//!
//! Encodes commands and characters into the byte frames the PCF8574 expander
//! needs to drive an HD44780 controller in 4-bit mode. Each byte sent to the
//! LCD becomes four I2C bytes: high nibble with EN raised, high nibble with
//! EN dropped, then the same for the low nibble.
//!
//! Expander wiring (the common backpack layout):
//!
//! ```text
//! P0 RS | P1 RW | P2 EN | P3 backlight | P4..P7 D4..D7
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lcd1602::{Encoder, DEFAULT_ADDRESS, INIT_COMMANDS, INIT_NIBBLES};
//!
//! let enc = Encoder::new(true);
//! for (nibble, wait_us) in INIT_NIBBLES {
//!     i2c.write(DEFAULT_ADDRESS, &enc.init_nibble(nibble))?;
//!     delay_us(wait_us);
//! }
//! for cmd in INIT_COMMANDS {
//!     i2c.write(DEFAULT_ADDRESS, &enc.command(cmd))?;
//! }
//! i2c.write(DEFAULT_ADDRESS, &enc.command(enc.set_cursor(0, 1)?))?;
//! for byte in "Hello".bytes() {
//!     i2c.write(DEFAULT_ADDRESS, &enc.data(byte))?;
//! }
//! ```

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "logging")]
use log::warn;

/// Address with A0..A2 pulled high
pub const DEFAULT_ADDRESS: u8 = 0x27;

pub const COLUMNS: u8 = 16;
pub const ROWS: u8 = 2;

const RS: u8 = 0x01;
#[allow(dead_code)] // Write-only: RW is always held low
const RW: u8 = 0x02;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

pub const CMD_CLEAR: u8 = 0x01;
pub const CMD_ENTRY_INCREMENT: u8 = 0x06;
pub const CMD_DISPLAY_ON: u8 = 0x0C;
pub const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
pub const CMD_SET_DDRAM: u8 = 0x80;

/// Clear and home need far longer than other commands (µs)
pub const CLEAR_DELAY_US: u32 = 2000;

/// Power-on delay before the first init nibble (ms)
pub const POWER_ON_DELAY_MS: u32 = 50;

/// Reset-by-instruction into 4-bit mode: (nibble, wait after it in µs)
pub const INIT_NIBBLES: [(u8, u32); 4] = [(0x3, 4500), (0x3, 4500), (0x3, 150), (0x2, 150)];

/// Sent as full commands once in 4-bit mode
pub const INIT_COMMANDS: [u8; 4] = [
    CMD_FUNCTION_4BIT_2LINE,
    CMD_DISPLAY_ON,
    CMD_CLEAR,
    CMD_ENTRY_INCREMENT,
];

/// DDRAM start address of each row
const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Cursor outside the configured geometry
    OutOfRange { col: u8, row: u8 },
}

/// Builds expander frames for a display of a given geometry
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    backlight: bool,
    columns: u8,
    rows: u8,
}

impl Encoder {
    /// 16x2 display
    pub fn new(backlight: bool) -> Self {
        Self::with_geometry(backlight, COLUMNS, ROWS)
    }

    /// Rows beyond 4 are not addressable on an HD44780 and are clamped
    pub fn with_geometry(backlight: bool, columns: u8, rows: u8) -> Self {
        Self {
            backlight,
            columns,
            rows: rows.min(ROW_OFFSETS.len() as u8),
        }
    }

    pub fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    fn control(&self, rs: bool) -> u8 {
        let mut bits = 0;
        if rs {
            bits |= RS;
        }
        if self.backlight {
            bits |= BACKLIGHT;
        }
        bits
    }

    fn pulse(&self, nibble: u8, rs: bool) -> [u8; 2] {
        let byte = (nibble << 4) | self.control(rs);
        [byte | EN, byte]
    }

    fn split(&self, value: u8, rs: bool) -> [u8; 4] {
        let [a, b] = self.pulse(value >> 4, rs);
        let [c, d] = self.pulse(value & 0x0F, rs);
        [a, b, c, d]
    }

    /// Single nibble, used only during the reset sequence
    pub fn init_nibble(&self, nibble: u8) -> [u8; 2] {
        self.pulse(nibble & 0x0F, false)
    }

    /// Instruction register write
    pub fn command(&self, cmd: u8) -> [u8; 4] {
        self.split(cmd, false)
    }

    /// Data register write (one character at the cursor)
    pub fn data(&self, byte: u8) -> [u8; 4] {
        self.split(byte, true)
    }

    /// Set-DDRAM-address command for a cursor position
    pub fn set_cursor(&self, col: u8, row: u8) -> Result<u8, Error> {
        if col >= self.columns || row >= self.rows {
            #[cfg(feature = "logging")]
            warn!("LCD cursor ({}, {}) outside {}x{}", col, row, self.columns, self.rows);
            return Err(Error::OutOfRange { col, row });
        }
        Ok(CMD_SET_DDRAM | (col + ROW_OFFSETS[row as usize]))
    }

    /// Frame that switches only the backlight, leaving the bus idle
    pub fn backlight_frame(&self) -> u8 {
        self.control(false)
    }
}

/// Map a character to the controller's A00 character ROM.
///
/// Printable ASCII is identical; anything else shows as `?`.
pub fn rom_char(ch: char) -> u8 {
    if ch.is_ascii() && !ch.is_ascii_control() {
        ch as u8
    } else {
        b'?'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_frames() {
        let enc = Encoder::new(true);
        // 0x28: high nibble 2, low nibble 8, backlight on, RS low
        assert_eq!(enc.command(0x28), [0x2C, 0x28, 0x8C, 0x88]);
    }

    #[test]
    fn test_data_frames_set_rs() {
        let enc = Encoder::new(true);
        // 'V' = 0x56
        assert_eq!(enc.data(b'V'), [0x5D, 0x59, 0x6D, 0x69]);
    }

    #[test]
    fn test_backlight_off() {
        let mut enc = Encoder::new(true);
        enc.set_backlight(false);
        assert_eq!(enc.command(CMD_CLEAR), [0x04, 0x00, 0x14, 0x10]);
        assert_eq!(enc.backlight_frame(), 0x00);
    }

    #[test]
    fn test_init_nibble() {
        let enc = Encoder::new(true);
        assert_eq!(enc.init_nibble(0x3), [0x3C, 0x38]);
        assert_eq!(enc.init_nibble(0x2), [0x2C, 0x28]);
    }

    #[test]
    fn test_cursor_addresses() {
        let enc = Encoder::new(true);
        assert_eq!(enc.set_cursor(0, 0), Ok(0x80));
        assert_eq!(enc.set_cursor(0, 1), Ok(0xC0));
        assert_eq!(enc.set_cursor(15, 1), Ok(0xCF));
        assert_eq!(
            enc.set_cursor(16, 0),
            Err(Error::OutOfRange { col: 16, row: 0 })
        );
        assert_eq!(enc.set_cursor(0, 2), Err(Error::OutOfRange { col: 0, row: 2 }));
    }

    #[test]
    fn test_four_row_geometry() {
        let enc = Encoder::with_geometry(true, 20, 4);
        assert_eq!(enc.set_cursor(0, 2), Ok(0x94));
        assert_eq!(enc.set_cursor(19, 3), Ok(0xE7));
        assert_eq!(Encoder::with_geometry(true, 20, 9).rows(), 4);
    }

    #[test]
    fn test_rom_char() {
        assert_eq!(rom_char('A'), b'A');
        assert_eq!(rom_char(':'), b':');
        assert_eq!(rom_char('ã'), b'?');
        assert_eq!(rom_char('\n'), b'?');
    }
}
