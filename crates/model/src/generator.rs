use num_rational::Ratio;

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::batch::{Batch, Sequence};

/// Produces random sequences of a fixed length.
///
/// A share of the values is drawn again from a pool of earlier values, so the
/// generated sequences carry duplicates the way real payloads do.
pub struct BatchGenerator {
    rng: SmallRng,
    length: usize,
    repeat_pool: Vec<i64>,
}

impl BatchGenerator {
    const VALUE_BOUNDARY: i64 = 1_000_000;
    const POOLED_VALUES: Ratio<u32> = Ratio::new_raw(1, 100);
    const REPEATED_VALUES: Ratio<u32> = Ratio::new_raw(10, 100);

    pub fn new(length: usize) -> Self {
        Self::with_rng(SmallRng::from_os_rng(), length)
    }

    /// Same seed and length, same sequences.
    pub fn seeded(seed: u64, length: usize) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed), length)
    }

    fn with_rng(rng: SmallRng, length: usize) -> Self {
        BatchGenerator {
            rng,
            length,
            repeat_pool: Vec::new(),
        }
    }

    pub fn batch(&mut self, sequences: usize) -> Batch {
        self.by_ref().take(sequences).collect()
    }

    fn random_ratio(&mut self, ratio: Ratio<u32>) -> bool {
        self.rng.random_ratio(*ratio.numer(), *ratio.denom())
    }

    fn next_value(&mut self) -> i64 {
        if self.random_ratio(Self::REPEATED_VALUES) {
            if let Some(value) = self.repeat_pool.choose(&mut self.rng) {
                return *value;
            }
        }
        let value = self
            .rng
            .random_range(-Self::VALUE_BOUNDARY..Self::VALUE_BOUNDARY);
        if self.random_ratio(Self::POOLED_VALUES) {
            self.repeat_pool.push(value);
        }
        value
    }
}

impl Iterator for BatchGenerator {
    type Item = Sequence;

    fn next(&mut self) -> Option<Self::Item> {
        let values = (0..self.length).map(|_| self.next_value()).collect::<Vec<_>>();
        Some(Sequence::new(values))
    }
}
