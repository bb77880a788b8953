use batch_sort_model::{Batch, generator::BatchGenerator};

/// Size of one benchmarked batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchShape {
    pub sequences: usize,
    pub length: usize,
}

impl BatchShape {
    const SEED: u64 = 0x5eed;

    pub fn values(&self) -> u64 {
        (self.sequences * self.length) as u64
    }

    /// The same shape always yields the same batch.
    pub fn batch(&self) -> Batch {
        BatchGenerator::seeded(Self::SEED, self.length).batch(self.sequences)
    }
}

impl std::fmt::Display for BatchShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.sequences, self.length)
    }
}

/// Many short sequences, a few long ones, and the spread in between.
pub fn batch_shapes() -> impl Iterator<Item = BatchShape> {
    [(1, 100_000), (8, 10_000), (64, 1_000), (512, 100), (4_096, 10)]
        .into_iter()
        .map(|(sequences, length)| BatchShape { sequences, length })
}
