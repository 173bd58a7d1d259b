use crate::Time;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// the source of randomness for one replicate.
///
/// every replicate owns exactly one Source, so a rerun at the same seed
/// and population size reproduces the same event sequence.
pub struct Source {
    seed: u64,
    rng: SmallRng,
}

impl Source {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// arbitrary seeding; the seed chosen is retained for reporting
    pub fn arbitrary() -> Self {
        Self::from_seed(rand::rng().random::<u64>())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// uniform draw in [0, 1)
    pub fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// uniform integer in [0, n)
    pub fn below(&mut self, n: usize) -> usize {
        assert!(n > 0, "draw from an empty range");
        self.rng.random_range(0..n)
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }

    /// exponential waiting time at the given rate
    pub fn expon(&mut self, rate: f64) -> Time {
        assert!(rate > 0.0, "waiting times need a positive rate");
        -(1.0 - self.uniform()).ln() / rate
    }
}
