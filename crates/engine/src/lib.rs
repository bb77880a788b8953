pub mod concurrent;
pub mod sequential;
pub mod wait_group;

use std::time::Duration;

use batch_sort_model::{Batch, SortResponse, TaskFailure};

pub use concurrent::{CollectOrder, ConcurrentSorter};
pub use sequential::SequentialSorter;

/// Sorts a slice ascending in place.
pub type SortKernel = fn(&mut [i64]);

pub fn sort_ascending(values: &mut [i64]) {
    values.sort_unstable();
}

/// A strategy for sorting every sequence of a batch.
pub trait BatchSorter {
    /// Name used in logs and benchmark ids.
    const STRATEGY: &'static str;

    fn sort_batch(&self, batch: Batch) -> impl Future<Output = SortReport> + Send;
}

/// Sorted batch together with the time spent sorting it.
#[derive(Debug, Clone, PartialEq)]
pub struct SortReport {
    pub batch: Batch,
    pub elapsed: Duration,
    /// Tasks that faulted; their sequences are missing from `batch`.
    pub failures: Vec<TaskFailure>,
}

impl SortReport {
    pub fn time_ns(&self) -> u64 {
        u64::try_from(self.elapsed.as_nanos()).unwrap_or(u64::MAX)
    }
}

impl From<SortReport> for SortResponse {
    fn from(report: SortReport) -> Self {
        SortResponse {
            time_ns: report.time_ns(),
            sorted_arrays: report.batch,
            failed_tasks: report.failures,
        }
    }
}
