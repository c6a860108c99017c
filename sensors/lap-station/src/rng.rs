//! Hardware random number generator

use esp_idf_svc::sys::{esp_fill_random, esp_random};
use rand::RngCore;

/// `esp_random` is a true RNG while the radio or bootloader entropy source is
/// active, and a seeded PRNG otherwise
#[derive(Debug, Default, Clone, Copy)]
pub struct EspRng;

impl RngCore for EspRng {
    fn next_u32(&mut self) -> u32 {
        unsafe { esp_random() }
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        unsafe { esp_fill_random(dest.as_mut_ptr().cast(), dest.len() as _) }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
