//! PIR motion sensor on a digital input

use esp_idf_hal::gpio::{Input, InputPin, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_svc::sys::EspError;
use lap_counter::LapSensor;

/// Sensor output idles LOW; the pull-down keeps a disconnected line from
/// reading as a lap
pub struct GpioLapSensor<'d, T: InputPin + OutputPin> {
    pin: PinDriver<'d, T, Input>,
}

impl<'d, T: InputPin + OutputPin> GpioLapSensor<'d, T> {
    pub fn new(pin: impl Peripheral<P = T> + 'd) -> Result<Self, EspError> {
        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(Pull::Down)?;
        Ok(Self { pin })
    }
}

impl<T: InputPin + OutputPin> LapSensor for GpioLapSensor<'_, T> {
    fn is_active(&mut self) -> bool {
        self.pin.is_high()
    }
}
