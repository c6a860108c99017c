//! Slot-addressed persistent storage
//!
//! Each vehicle owns one fixed-size slot holding a signed 32-bit counter.
//! Slot `i` lives at byte offset `i * SLOT_SIZE`, in roster order.

use thiserror::Error;

/// Bytes per slot (one `i32`)
pub const SLOT_SIZE: usize = core::mem::size_of::<i32>();

/// Value read back from erased (never written) storage cells
pub const ERASED_BYTE: u8 = 0xFF;

/// Byte offset of a vehicle's slot
pub const fn slot_offset(index: usize) -> usize {
    index * SLOT_SIZE
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("slot at offset {offset} is outside the {capacity}-byte storage area")]
    OutOfBounds { offset: usize, capacity: usize },
    #[error("storage device error: {0}")]
    Device(String),
}

/// Byte-addressed get/put of fixed-size integer slots.
///
/// Writes carry no durability guarantee. `Ok` from [`put`](Self::put) means
/// the device accepted the request, not that the value survived.
pub trait SlotStorage {
    fn get(&self, offset: usize) -> Result<i32, StorageError>;
    fn put(&mut self, offset: usize, value: i32) -> Result<(), StorageError>;
}

impl<T: SlotStorage + ?Sized> SlotStorage for &mut T {
    fn get(&self, offset: usize) -> Result<i32, StorageError> {
        (**self).get(offset)
    }

    fn put(&mut self, offset: usize, value: i32) -> Result<(), StorageError> {
        (**self).put(offset, value)
    }
}

/// Read one little-endian slot out of a byte image
pub fn read_slot(bytes: &[u8], offset: usize) -> Result<i32, StorageError> {
    let raw = bytes
        .get(offset..offset + SLOT_SIZE)
        .ok_or(StorageError::OutOfBounds {
            offset,
            capacity: bytes.len(),
        })?;
    let mut buf = [0u8; SLOT_SIZE];
    buf.copy_from_slice(raw);
    Ok(i32::from_le_bytes(buf))
}

/// Write one little-endian slot into a byte image
pub fn write_slot(bytes: &mut [u8], offset: usize, value: i32) -> Result<(), StorageError> {
    let capacity = bytes.len();
    let raw = bytes
        .get_mut(offset..offset + SLOT_SIZE)
        .ok_or(StorageError::OutOfBounds { offset, capacity })?;
    raw.copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// RAM-backed slot storage
///
/// Starts out erased, like a fresh EEPROM or NVS page. Used by host
/// simulation and tests; [`into_bytes`](Self::into_bytes) and
/// [`from_bytes`](Self::from_bytes) carry the image across a simulated
/// power cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySlots {
    bytes: Vec<u8>,
}

impl MemorySlots {
    /// Erased storage with room for `slots` counters
    pub fn erased(slots: usize) -> Self {
        Self {
            bytes: vec![ERASED_BYTE; slots * SLOT_SIZE],
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl SlotStorage for MemorySlots {
    fn get(&self, offset: usize) -> Result<i32, StorageError> {
        read_slot(&self.bytes, offset)
    }

    fn put(&mut self, offset: usize, value: i32) -> Result<(), StorageError> {
        write_slot(&mut self.bytes, offset, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_layout() {
        assert_eq!(SLOT_SIZE, 4);
        assert_eq!(slot_offset(0), 0);
        assert_eq!(slot_offset(1), 4);
        assert_eq!(slot_offset(3), 12);
    }

    #[test]
    fn test_erased_reads_minus_one() {
        let slots = MemorySlots::erased(4);
        assert_eq!(slots.bytes().len(), 16);
        for i in 0..4 {
            assert_eq!(slots.get(slot_offset(i)).unwrap(), -1);
        }
    }

    #[test]
    fn test_put_is_little_endian_and_isolated() {
        let mut slots = MemorySlots::erased(3);
        slots.put(slot_offset(1), 0x0102_0304).unwrap();

        assert_eq!(&slots.bytes()[4..8], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(slots.get(slot_offset(0)).unwrap(), -1);
        assert_eq!(slots.get(slot_offset(2)).unwrap(), -1);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut slots = MemorySlots::erased(2);
        assert_eq!(
            slots.get(8),
            Err(StorageError::OutOfBounds {
                offset: 8,
                capacity: 8
            })
        );
        // Straddling the end is rejected too
        assert!(slots.put(6, 1).is_err());
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn write_through<S: SlotStorage>(mut storage: S) {
            storage.put(0, 42).unwrap();
        }

        let mut slots = MemorySlots::erased(1);
        write_through(&mut slots);
        assert_eq!(slots.get(0).unwrap(), 42);
    }
}
