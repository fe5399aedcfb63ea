//! Seedable random number generation for payload shuffling.
//!
//! The `PayloadRng` wraps a seedable RNG so a benchmark run can be replayed
//! with the exact same request contents. Given the same seed, random parts
//! are shuffled into the same order.
//!
//! # Example
//!
//! ```
//! use ttbench_payload::PayloadRng;
//!
//! let mut a = vec![1, 2, 3, 4, 5];
//! let mut b = a.clone();
//!
//! PayloadRng::new(42).shuffle(&mut a);
//! PayloadRng::new(42).shuffle(&mut b);
//! assert_eq!(a, b);
//! ```

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Random number generator owned by whoever builds the payload.
#[derive(Debug)]
pub struct PayloadRng {
    /// The underlying RNG.
    inner: SmallRng,
    /// The seed used to create this RNG.
    seed: u64,
}

impl PayloadRng {
    /// Creates a new RNG with the specified seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates an RNG seeded from operating system entropy.
    ///
    /// The chosen seed is kept so the run can be reproduced.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Returns the seed used to create this RNG.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generates a random `usize` in the range `[0, max)`.
    ///
    /// # Panics
    ///
    /// Panics if `max` is 0.
    #[inline]
    pub fn next_usize(&mut self, max: usize) -> usize {
        debug_assert!(max > 0, "max must be > 0");
        self.inner.gen_range(0..max)
    }

    /// Shuffles a slice in place using the Fisher-Yates algorithm.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_usize(i + 1);
            items.swap(i, j);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
