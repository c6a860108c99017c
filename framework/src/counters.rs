//! Per-vehicle lap counters backed by slot storage
//!
//! The in-memory counts are a cache of the storage slots. Every increment is
//! written through before it is reported, so the two only diverge when the
//! device drops a write; the range check in [`CounterStore::load_all`] heals
//! that on the next boot.

use log::{info, warn};
use thiserror::Error;

use crate::storage::{slot_offset, SlotStorage};

/// Highest lap count accepted from storage
pub const MAX_PLAUSIBLE_LAPS: u16 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CounterError {
    #[error("no counter slot for vehicle {0}")]
    UnknownVehicle(usize),
}

/// Map a raw slot value to a counter, rejecting corrupt or erased values
pub fn validate(raw: i32) -> Option<u16> {
    if (0..=i32::from(MAX_PLAUSIBLE_LAPS)).contains(&raw) {
        Some(raw as u16)
    } else {
        None
    }
}

/// Authoritative lap counts for the roster
#[derive(Debug)]
pub struct CounterStore<S> {
    storage: S,
    counts: Vec<u16>,
}

impl<S: SlotStorage> CounterStore<S> {
    /// Load `vehicles` counters from storage.
    ///
    /// Any slot that cannot be read or holds a value outside
    /// `[0, MAX_PLAUSIBLE_LAPS]` is rewritten to zero and reported as zero.
    pub fn load_all(storage: S, vehicles: usize) -> Self {
        let mut store = Self {
            storage,
            counts: Vec::with_capacity(vehicles),
        };

        for index in 0..vehicles {
            let offset = slot_offset(index);
            let loaded = match store.storage.get(offset) {
                Ok(raw) => {
                    let valid = validate(raw);
                    if valid.is_none() {
                        info!("Counter slot {} holds {}, out of range", index, raw);
                    }
                    valid
                }
                Err(e) => {
                    warn!("Counter slot {} unreadable: {}", index, e);
                    None
                }
            };

            let count = match loaded {
                Some(count) => count,
                None => {
                    info!("Resetting counter slot {} to 0", index);
                    if let Err(e) = store.storage.put(offset, 0) {
                        warn!("Counter slot {} reset failed: {}", index, e);
                    }
                    0
                }
            };
            store.counts.push(count);
        }

        store
    }

    /// Add one lap for `index` and write it through to its slot.
    ///
    /// The write is always attempted. A failed write is logged and the
    /// in-memory count stays authoritative until restart. Counts saturate at
    /// [`MAX_PLAUSIBLE_LAPS`].
    pub fn increment_and_persist(&mut self, index: usize) -> Result<u16, CounterError> {
        let count = self
            .counts
            .get_mut(index)
            .ok_or(CounterError::UnknownVehicle(index))?;

        if *count >= MAX_PLAUSIBLE_LAPS {
            warn!(
                "Vehicle {} reached {} laps, counter saturated",
                index, MAX_PLAUSIBLE_LAPS
            );
        } else {
            *count += 1;
        }
        let new_count = *count;

        if let Err(e) = self.storage.put(slot_offset(index), i32::from(new_count)) {
            warn!(
                "Counter slot {} write failed ({}), count {} held in memory only",
                index, e, new_count
            );
        }

        Ok(new_count)
    }

    pub fn count(&self, index: usize) -> Option<u16> {
        self.counts.get(index).copied()
    }

    /// Counts in roster order
    pub fn counts(&self) -> &[u16] {
        &self.counts
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemorySlots, StorageError, SLOT_SIZE};
    use proptest::prelude::*;

    /// Storage that accepts writes but never keeps them
    struct DroppingSlots {
        inner: MemorySlots,
    }

    impl SlotStorage for DroppingSlots {
        fn get(&self, offset: usize) -> Result<i32, StorageError> {
            self.inner.get(offset)
        }

        fn put(&mut self, _offset: usize, _value: i32) -> Result<(), StorageError> {
            Err(StorageError::Device("write timeout".into()))
        }
    }

    fn slots_with(values: &[i32]) -> MemorySlots {
        let mut slots = MemorySlots::erased(values.len());
        for (i, v) in values.iter().enumerate() {
            slots.put(slot_offset(i), *v).unwrap();
        }
        slots
    }

    #[test]
    fn test_validate_bounds() {
        assert_eq!(validate(0), Some(0));
        assert_eq!(validate(1000), Some(1000));
        assert_eq!(validate(1001), None);
        assert_eq!(validate(-1), None);
        assert_eq!(validate(i32::MIN), None);
    }

    #[test]
    fn test_fresh_storage_heals_to_zero() {
        let mut slots = MemorySlots::erased(4);
        let store = CounterStore::load_all(&mut slots, 4);

        assert_eq!(store.counts(), &[0, 0, 0, 0]);
        drop(store);
        assert_eq!(slots.bytes(), &[0u8; 16]);
    }

    #[test]
    fn test_valid_values_loaded_unchanged() {
        let store = CounterStore::load_all(slots_with(&[0, 7, 1000, 42]), 4);
        assert_eq!(store.counts(), &[0, 7, 1000, 42]);
    }

    #[test]
    fn test_only_invalid_slots_rewritten() {
        let mut slots = slots_with(&[5, 5000, -3, 9]);
        let store = CounterStore::load_all(&mut slots, 4);
        assert_eq!(store.counts(), &[5, 0, 0, 9]);
        drop(store);

        assert_eq!(slots.get(slot_offset(0)).unwrap(), 5);
        assert_eq!(slots.get(slot_offset(1)).unwrap(), 0);
        assert_eq!(slots.get(slot_offset(2)).unwrap(), 0);
        assert_eq!(slots.get(slot_offset(3)).unwrap(), 9);
    }

    #[test]
    fn test_unreadable_slot_reported_as_zero() {
        // Image too short for the fourth slot
        let slots = MemorySlots::from_bytes(vec![1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]);
        let store = CounterStore::load_all(slots, 4);
        assert_eq!(store.counts(), &[1, 2, 3, 0]);
    }

    #[test]
    fn test_increment_round_trips_through_restart() {
        let mut slots = slots_with(&[3, 7, 0, 11]);

        let mut store = CounterStore::load_all(&mut slots, 4);
        assert_eq!(store.increment_and_persist(1), Ok(8));
        drop(store);

        let reloaded = CounterStore::load_all(&mut slots, 4);
        assert_eq!(reloaded.counts(), &[3, 8, 0, 11]);
    }

    #[test]
    fn test_unknown_vehicle() {
        let mut store = CounterStore::load_all(MemorySlots::erased(2), 2);
        assert_eq!(
            store.increment_and_persist(2),
            Err(CounterError::UnknownVehicle(2))
        );
        assert_eq!(store.counts(), &[0, 0]);
    }

    #[test]
    fn test_counter_saturates_at_max() {
        let mut store = CounterStore::load_all(slots_with(&[999]), 1);
        assert_eq!(store.increment_and_persist(0), Ok(1000));
        assert_eq!(store.increment_and_persist(0), Ok(1000));
        assert_eq!(store.storage().get(0).unwrap(), 1000);
    }

    #[test]
    fn test_dropped_write_keeps_memory_authoritative() {
        let inner = slots_with(&[4, 4]);
        let mut store = CounterStore::load_all(DroppingSlots { inner }, 2);

        assert_eq!(store.increment_and_persist(0), Ok(5));
        assert_eq!(store.increment_and_persist(0), Ok(6));
        assert_eq!(store.count(0), Some(6));

        // Device never saw the writes; next boot starts from the stored value
        let storage = store.into_storage();
        let reloaded = CounterStore::load_all(storage, 2);
        assert_eq!(reloaded.counts(), &[4, 4]);
    }

    proptest! {
        #[test]
        fn prop_loaded_counts_always_in_range(raw in proptest::collection::vec(any::<u8>(), 4 * SLOT_SIZE)) {
            let mut slots = MemorySlots::from_bytes(raw);
            let store = CounterStore::load_all(&mut slots, 4);

            for &count in store.counts() {
                prop_assert!(count <= MAX_PLAUSIBLE_LAPS);
            }
            let counts = store.counts().to_vec();
            drop(store);

            // Storage now agrees with what was reported
            for (i, &count) in counts.iter().enumerate() {
                prop_assert_eq!(slots.get(slot_offset(i)).unwrap(), i32::from(count));
            }
        }
    }
}
