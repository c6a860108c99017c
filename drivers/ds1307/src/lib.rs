//! DS1307 Real-Time Clock Register Codec
//!
//! Pure decoding of the DS1307 timekeeping registers. The caller owns the I2C
//! bus: write [`TIME_REGISTER`] to set the register pointer, read
//! [`TIME_REGISTER_LEN`] bytes, then hand them to [`decode`].
//!
//! # Features
//!
//! - BCD decoding with validation
//! - 24-hour and 12-hour (AM/PM) register modes
//! - Clock-halt (oscillator stopped) detection
//! - Conversion to Unix time without a calendar library
//! - `no_std` compatible, no external dependencies
//!
//! # Example
//!
//! ```ignore
//! use ds1307::{decode, ADDRESS, TIME_REGISTER, TIME_REGISTER_LEN};
//!
//! let mut regs = [0u8; TIME_REGISTER_LEN];
//! i2c.write_read(ADDRESS, &[TIME_REGISTER], &mut regs)?;
//! let now = decode(&regs)?;
//! println!("{:02}:{:02}:{:02}", now.hour, now.minute, now.second);
//! let epoch = now.unix_time();
//! ```

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "logging")]
use log::warn;

/// 7-bit I2C address (fixed in silicon)
pub const ADDRESS: u8 = 0x68;

/// First timekeeping register (seconds)
pub const TIME_REGISTER: u8 = 0x00;

/// Seconds, minutes, hours, weekday, date, month, year
pub const TIME_REGISTER_LEN: usize = 7;

/// Clock Halt bit in the seconds register
const CH_BIT: u8 = 0x80;
/// Hours register: set for 12-hour mode
const MODE_12H_BIT: u8 = 0x40;
/// Hours register in 12-hour mode: set for PM
const PM_BIT: u8 = 0x20;

/// Two-digit years are relative to this
const CENTURY: u16 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A register nibble was above 9
    InvalidBcd(u8),
    /// Digits were valid BCD but the field is outside its calendar range
    OutOfRange,
}

/// Calendar date and time as stored by the chip (no timezone)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Seconds since 1970-01-01 00:00:00, treating the register contents as UTC
    pub fn unix_time(&self) -> i64 {
        days_from_civil(i64::from(self.year), i64::from(self.month), i64::from(self.day)) * 86_400
            + i64::from(self.hour) * 3600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn bcd(byte: u8) -> Result<u8, Error> {
    let (hi, lo) = (byte >> 4, byte & 0x0F);
    if hi > 9 || lo > 9 {
        #[cfg(feature = "logging")]
        warn!("DS1307 register byte {:#04x} is not BCD", byte);
        return Err(Error::InvalidBcd(byte));
    }
    Ok(hi * 10 + lo)
}

fn decode_hour(reg: u8) -> Result<u8, Error> {
    if reg & MODE_12H_BIT == 0 {
        return bcd(reg & 0x3F);
    }

    let hour = bcd(reg & 0x1F)?;
    if !(1..=12).contains(&hour) {
        return Err(Error::OutOfRange);
    }
    let pm = reg & PM_BIT != 0;
    Ok(hour % 12 + if pm { 12 } else { 0 })
}

/// True if the oscillator is stopped; the time registers are frozen
pub fn is_halted(regs: &[u8; TIME_REGISTER_LEN]) -> bool {
    regs[0] & CH_BIT != 0
}

/// Decode the seven timekeeping registers.
///
/// The weekday register is ignored. A halted oscillator still decodes (the
/// frozen time is returned); check [`is_halted`] to tell.
pub fn decode(regs: &[u8; TIME_REGISTER_LEN]) -> Result<DateTime, Error> {
    let dt = DateTime {
        second: bcd(regs[0] & 0x7F)?,
        minute: bcd(regs[1] & 0x7F)?,
        hour: decode_hour(regs[2])?,
        day: bcd(regs[4] & 0x3F)?,
        month: bcd(regs[5] & 0x1F)?,
        year: CENTURY + u16::from(bcd(regs[6])?),
    };

    let valid = dt.second < 60
        && dt.minute < 60
        && dt.hour < 24
        && (1..=31).contains(&dt.day)
        && (1..=12).contains(&dt.month);
    if !valid {
        return Err(Error::OutOfRange);
    }

    Ok(dt)
}
