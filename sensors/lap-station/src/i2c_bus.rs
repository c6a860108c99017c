//! Shared I2C bus
//!
//! The clock and the display sit on the same two wires. Everything runs on
//! the main task, so a `RefCell` is enough to hand the driver to both.

use std::cell::RefCell;
use std::rc::Rc;

use esp_idf_hal::delay::BLOCK;
use esp_idf_hal::i2c::I2cDriver;
use esp_idf_svc::sys::EspError;

#[derive(Clone)]
pub struct SharedI2c(Rc<RefCell<I2cDriver<'static>>>);

impl SharedI2c {
    pub fn new(driver: I2cDriver<'static>) -> Self {
        Self(Rc::new(RefCell::new(driver)))
    }

    pub fn write(&self, address: u8, bytes: &[u8]) -> Result<(), EspError> {
        self.0.borrow_mut().write(address, bytes, BLOCK)
    }

    pub fn write_read(&self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), EspError> {
        self.0.borrow_mut().write_read(address, bytes, buffer, BLOCK)
    }
}
