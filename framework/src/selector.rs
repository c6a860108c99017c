//! Fair vehicle assignment
//!
//! Lap events are attributed by drawing without replacement from a pool of
//! vehicle indices. When the pool runs dry it is refilled, so within one round
//! every vehicle is picked exactly once and no vehicle repeats before all the
//! others have had a turn.

use rand::{Rng, RngCore};

/// Source of uniform draws for the selector
pub trait RandomSource {
    /// Return a value in `[0, bound)`. `bound` is never zero.
    ///
    /// Out-of-range values are reduced modulo `bound` by the caller, so a
    /// scripted source may return raw values.
    fn draw(&mut self, bound: usize) -> usize;
}

/// Adapts any [`RngCore`] into a [`RandomSource`]
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: RngCore> RandomSource for RngSource<R> {
    fn draw(&mut self, bound: usize) -> usize {
        self.0.gen_range(0..bound)
    }
}

/// Vehicle indices not yet chosen in the current round
#[derive(Debug, Clone)]
pub struct AssignmentPool {
    vehicles: usize,
    available: Vec<usize>,
}

impl AssignmentPool {
    /// Full pool over `vehicles` indices
    ///
    /// # Panics
    /// Panics if `vehicles` is zero
    pub fn new(vehicles: usize) -> Self {
        assert!(vehicles > 0, "Assignment pool needs at least one vehicle");
        let mut pool = Self {
            vehicles,
            available: Vec::with_capacity(vehicles),
        };
        pool.refill();
        pool
    }

    /// Start a new round with every index available, in ascending order
    pub fn refill(&mut self) {
        self.available.clear();
        self.available.extend(0..self.vehicles);
    }

    /// Pick the vehicle for the next lap.
    ///
    /// Refills first if the round is exhausted. The chosen position is
    /// removed by shifting later entries left, so the remaining order is
    /// deterministic for a given draw sequence.
    pub fn choose<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> usize {
        if self.available.is_empty() {
            self.refill();
        }
        let position = rng.draw(self.available.len()) % self.available.len();
        self.available.remove(position)
    }

    /// Indices still available this round
    pub fn remaining(&self) -> &[usize] {
        &self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    pub fn vehicles(&self) -> usize {
        self.vehicles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    /// Replays a fixed draw sequence
    struct Scripted(VecDeque<usize>);

    impl Scripted {
        fn new(draws: &[usize]) -> Self {
            Self(draws.iter().copied().collect())
        }
    }

    impl RandomSource for Scripted {
        fn draw(&mut self, _bound: usize) -> usize {
            self.0.pop_front().expect("script exhausted")
        }
    }

    #[test]
    fn test_new_pool_is_full_and_ordered() {
        let pool = AssignmentPool::new(4);
        assert_eq!(pool.remaining(), &[0, 1, 2, 3]);
        assert_eq!(pool.vehicles(), 4);
    }

    #[test]
    #[should_panic(expected = "at least one vehicle")]
    fn test_empty_pool_rejected() {
        let _ = AssignmentPool::new(0);
    }

    #[test]
    fn test_scripted_round_order() {
        let mut pool = AssignmentPool::new(4);
        let mut rng = Scripted::new(&[2, 0, 1, 0]);

        assert_eq!(pool.choose(&mut rng), 2);
        assert_eq!(pool.remaining(), &[0, 1, 3]);
        assert_eq!(pool.choose(&mut rng), 0);
        assert_eq!(pool.remaining(), &[1, 3]);
        assert_eq!(pool.choose(&mut rng), 3);
        assert_eq!(pool.choose(&mut rng), 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_draw_reduced_modulo_pool_size() {
        let mut pool = AssignmentPool::new(4);
        // 6 % 4 = 2, then 7 % 3 = 1
        let mut rng = Scripted::new(&[6, 7]);

        assert_eq!(pool.choose(&mut rng), 2);
        assert_eq!(pool.choose(&mut rng), 1);
        assert_eq!(pool.remaining(), &[0, 3]);
    }

    #[test]
    fn test_exhausted_pool_refills_before_choosing() {
        let mut pool = AssignmentPool::new(2);
        let mut rng = Scripted::new(&[0, 0, 1]);

        assert_eq!(pool.choose(&mut rng), 0);
        assert_eq!(pool.choose(&mut rng), 1);
        assert!(pool.is_empty());

        // New round: pool is [0, 1] again
        assert_eq!(pool.choose(&mut rng), 1);
        assert_eq!(pool.remaining(), &[0]);
    }

    #[test]
    fn test_single_vehicle_always_chosen() {
        let mut pool = AssignmentPool::new(1);
        let mut rng = RngSource(SmallRng::seed_from_u64(1));
        for _ in 0..5 {
            assert_eq!(pool.choose(&mut rng), 0);
        }
    }

    #[test]
    fn test_rng_source_stays_in_bounds() {
        let mut rng = RngSource(SmallRng::seed_from_u64(99));
        for bound in 1..10 {
            for _ in 0..100 {
                assert!(rng.draw(bound) < bound);
            }
        }
    }

    proptest! {
        /// Every round is a permutation, across several consecutive rounds
        #[test]
        fn prop_each_round_is_a_permutation(seed in any::<u64>(), vehicles in 1usize..12, rounds in 1usize..5) {
            let mut pool = AssignmentPool::new(vehicles);
            let mut rng = RngSource(SmallRng::seed_from_u64(seed));

            for _ in 0..rounds {
                let mut round: Vec<usize> = (0..vehicles).map(|_| pool.choose(&mut rng)).collect();
                prop_assert!(pool.is_empty());
                round.sort_unstable();
                prop_assert_eq!(round, (0..vehicles).collect::<Vec<_>>());
            }
        }
    }
}
