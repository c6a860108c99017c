//! Vehicle roster
//!
//! The roster is fixed at build time. Its length is the `N` every other
//! component is sized by: counter slots, assignment pool and startup
//! diagnostics all iterate the roster in index order.

use thiserror::Error;

/// A competing vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vehicle {
    /// Position in the roster, also the storage slot number
    pub index: usize,
    /// Full name for diagnostic output
    pub name: &'static str,
    /// Two-letter code for the 16-column display
    pub short_code: &'static str,
}

impl Vehicle {
    pub const fn new(index: usize, name: &'static str, short_code: &'static str) -> Self {
        Self {
            index,
            name,
            short_code,
        }
    }
}

/// Deployment roster
pub const DEFAULT_ROSTER: [Vehicle; 4] = [
    Vehicle::new(0, "Mahindra", "MH"),
    Vehicle::new(1, "Porsche", "PS"),
    Vehicle::new(2, "Jaguar", "JG"),
    Vehicle::new(3, "Nissan", "NS"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("roster has no vehicles")]
    Empty,
    #[error("vehicle at position {position} declares index {index}")]
    IndexMismatch { position: usize, index: usize },
}

/// Validated, immutable list of vehicles
#[derive(Debug, Clone, Copy)]
pub struct Roster {
    vehicles: &'static [Vehicle],
}

impl Roster {
    /// Validate a static vehicle list.
    ///
    /// Every vehicle's `index` must equal its position so that slot offsets
    /// and pool entries can be derived from the index alone.
    pub fn new(vehicles: &'static [Vehicle]) -> Result<Self, RosterError> {
        if vehicles.is_empty() {
            return Err(RosterError::Empty);
        }
        for (position, vehicle) in vehicles.iter().enumerate() {
            if vehicle.index != position {
                return Err(RosterError::IndexMismatch {
                    position,
                    index: vehicle.index,
                });
            }
        }
        Ok(Self { vehicles })
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Always false for a validated roster
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'static Vehicle> {
        self.vehicles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Vehicle> {
        self.vehicles.iter()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            vehicles: &DEFAULT_ROSTER,
        }
    }
}
