//! Non-volatile lap counter slots.
//!
//! All slots live in one raw NVS blob, `slots * 4` bytes. A blob that was
//! never written, or is shorter than the roster, reads as erased (`0xFF`),
//! which the counter loader heals to zero.

use esp_idf_svc::nvs::{EspNvs, EspNvsPartition, NvsDefault};
use esp_idf_svc::sys::EspError;
use lap_counter::storage::{read_slot, write_slot, ERASED_BYTE, SLOT_SIZE};
use lap_counter::{SlotStorage, StorageError};
use log::{info, warn};

const NAMESPACE: &str = "lapcnt";
const KEY_SLOTS: &str = "slots";

/// NVS-backed slot storage with a RAM copy of the blob
pub struct NvsSlots {
    nvs: EspNvs<NvsDefault>,
    image: Vec<u8>,
}

impl NvsSlots {
    pub fn new(partition: EspNvsPartition<NvsDefault>, slots: usize) -> Result<Self, EspError> {
        let nvs = EspNvs::new(partition, NAMESPACE, true)?;

        let mut image = vec![ERASED_BYTE; slots * SLOT_SIZE];
        let mut buf = vec![0u8; image.len()];
        match nvs.get_raw(KEY_SLOTS, &mut buf) {
            Ok(Some(stored)) => {
                let n = stored.len().min(image.len());
                image[..n].copy_from_slice(&stored[..n]);
                info!("NVS: Loaded {} bytes of lap counters", n);
            }
            Ok(None) => info!("NVS: No lap counters stored yet"),
            Err(e) => warn!("NVS: Lap counter blob unreadable ({}), treating as erased", e),
        }

        Ok(Self { nvs, image })
    }
}

impl SlotStorage for NvsSlots {
    fn get(&self, offset: usize) -> Result<i32, StorageError> {
        read_slot(&self.image, offset)
    }

    fn put(&mut self, offset: usize, value: i32) -> Result<(), StorageError> {
        let mut next = self.image.clone();
        write_slot(&mut next, offset, value)?;
        self.nvs
            .set_raw(KEY_SLOTS, &next)
            .map_err(|e| StorageError::Device(e.to_string()))?;
        self.image = next;
        Ok(())
    }
}
