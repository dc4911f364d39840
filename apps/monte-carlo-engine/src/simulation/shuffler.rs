//! Random permutation of trade order.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Produces uniformly random permutations of an outcome sequence.
///
/// One engine per shuffler, seeded once. Without an explicit seed the engine
/// draws from the OS and runs are not reproducible.
#[derive(Debug, Clone)]
pub struct RandomOrderShuffler {
    rng: StdRng,
}

impl RandomOrderShuffler {
    /// Create a shuffler seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a shuffler with a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is set, OS-seeded otherwise.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Working copy of `outcomes`, shuffled when `randomize` is set.
    pub fn order(&mut self, outcomes: &[f64], randomize: bool) -> Vec<f64> {
        let mut working = outcomes.to_vec();
        if randomize {
            self.shuffle_in_place(&mut working);
        }
        working
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle_in_place(&mut self, outcomes: &mut [f64]) {
        outcomes.shuffle(&mut self.rng);
    }

    /// Derive an independent shuffler from the next value of this engine.
    ///
    /// Parallel workers each receive a fork taken in submission order, so a
    /// seeded run stays reproducible regardless of thread scheduling.
    pub fn fork(&mut self) -> Self {
        Self::seeded(self.rng.random::<u64>())
    }
}

impl Default for RandomOrderShuffler {
    fn default() -> Self {
        Self::from_entropy()
    }
}
