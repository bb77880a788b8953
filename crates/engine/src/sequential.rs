use std::time::Instant;

use batch_sort_model::Batch;

use crate::{BatchSorter, SortReport};

/// Sorts sequences one after another on the calling thread.
///
/// The output keeps submission order: `batch[i]` comes back as the sorted
/// form of the `i`-th submitted sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialSorter;

impl SequentialSorter {
    pub fn sort(&self, mut batch: Batch) -> SortReport {
        let started = Instant::now();
        for sequence in batch.iter_mut() {
            sequence.sort();
        }
        let elapsed = started.elapsed();

        tracing::debug!(
            strategy = Self::STRATEGY,
            sequences = batch.len(),
            ?elapsed,
            "batch sorted"
        );

        SortReport {
            batch,
            elapsed,
            failures: Vec::new(),
        }
    }
}

impl BatchSorter for SequentialSorter {
    const STRATEGY: &'static str = "sequential";

    fn sort_batch(&self, batch: Batch) -> impl Future<Output = SortReport> + Send {
        let report = self.sort(batch);
        std::future::ready(report)
    }
}
