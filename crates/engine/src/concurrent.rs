use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use batch_sort_model::{Batch, Sequence, TaskFailure};
use tokio::sync::mpsc;

use crate::wait_group::WaitGroup;
use crate::{BatchSorter, SortKernel, SortReport};

/// How the coordinator assembles the sorted sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectOrder {
    /// Sequences come back in the order their tasks finished.
    /// Position `i` of the output need not hold input sequence `i`.
    #[default]
    Completion,
    /// Each sequence is written back to the slot of its original position.
    Input,
}

/// Sorts every sequence of a batch on its own blocking task.
///
/// One task is spawned per sequence. Each task sorts its sequence, publishes
/// it on a completion channel sized to the batch, and marks itself done on a
/// shared [`WaitGroup`]. A supervisor task closes the channel once the group
/// drains, which ends the coordinator's collect loop.
///
/// A task whose kernel panics still counts as done and is reported in
/// [`SortReport::failures`] instead of its sequence.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrentSorter {
    order: CollectOrder,
    kernel: SortKernel,
}

enum Completion {
    Sorted { index: usize, sequence: Sequence },
    Faulted { index: usize, reason: String },
}

impl Default for ConcurrentSorter {
    fn default() -> Self {
        Self::new(CollectOrder::default())
    }
}

impl ConcurrentSorter {
    pub fn new(order: CollectOrder) -> Self {
        Self::with_kernel(order, crate::sort_ascending)
    }

    pub fn with_kernel(order: CollectOrder, kernel: SortKernel) -> Self {
        ConcurrentSorter { order, kernel }
    }

    /// Must be called from within a tokio runtime.
    pub async fn sort(&self, batch: Batch) -> SortReport {
        let started = Instant::now();
        let total = batch.len();

        // Sized to the batch so publishing never waits on the collector.
        let (completed_tx, mut completed_rx) = mpsc::channel(total.max(1));
        let pending = WaitGroup::new(total);

        for (index, sequence) in batch.into_iter().enumerate() {
            let completed_tx = completed_tx.clone();
            // Created outside the task: a task dropped before it runs still counts as done.
            let done = pending.done_guard();
            let kernel = self.kernel;
            tokio::task::spawn_blocking(move || {
                let _done = done;
                let completion = sort_isolated(index, sequence, kernel);
                // Capacity covers every task, so this only fails once the collector is gone.
                if completed_tx.try_send(completion).is_err() {
                    tracing::debug!(index, "collector dropped before the sequence was published");
                }
                // The channel must close only after the supervisor saw every task finish.
                drop(completed_tx);
            });
        }

        tokio::spawn(async move {
            pending.wait().await;
            drop(completed_tx);
        });

        let mut collector = Collector::new(self.order, total);
        while let Some(completion) = completed_rx.recv().await {
            collector.accept(completion);
        }
        let (batch, failures) = collector.finish();
        let elapsed = started.elapsed();

        if failures.is_empty() {
            tracing::debug!(
                strategy = Self::STRATEGY,
                order = ?self.order,
                sequences = total,
                ?elapsed,
                "batch sorted"
            );
        } else {
            tracing::warn!(
                strategy = Self::STRATEGY,
                order = ?self.order,
                sequences = total,
                failed = failures.len(),
                ?elapsed,
                "batch sorted with failed tasks"
            );
        }

        SortReport {
            batch,
            elapsed,
            failures,
        }
    }
}

impl BatchSorter for ConcurrentSorter {
    const STRATEGY: &'static str = "concurrent";

    fn sort_batch(&self, batch: Batch) -> impl Future<Output = SortReport> + Send {
        self.sort(batch)
    }
}

fn sort_isolated(index: usize, mut sequence: Sequence, kernel: SortKernel) -> Completion {
    let sorted = std::panic::catch_unwind(AssertUnwindSafe(|| kernel(sequence.as_mut_slice())));
    match sorted {
        Ok(()) => Completion::Sorted { index, sequence },
        Err(payload) => Completion::Faulted {
            index,
            reason: panic_reason(payload.as_ref()),
        },
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "sort task panicked".to_string()
    }
}

/// Fan-in side of the protocol.
struct Collector {
    order: CollectOrder,
    in_completion_order: Vec<Sequence>,
    in_input_order: Vec<Option<Sequence>>,
    reported: Vec<bool>,
    failures: Vec<TaskFailure>,
}

impl Collector {
    fn new(order: CollectOrder, total: usize) -> Self {
        let (in_completion_order, in_input_order) = match order {
            CollectOrder::Completion => (Vec::with_capacity(total), Vec::new()),
            CollectOrder::Input => (Vec::new(), vec![None; total]),
        };
        Collector {
            order,
            in_completion_order,
            in_input_order,
            reported: vec![false; total],
            failures: Vec::new(),
        }
    }

    fn accept(&mut self, completion: Completion) {
        match completion {
            Completion::Sorted { index, sequence } => {
                self.reported[index] = true;
                match self.order {
                    CollectOrder::Completion => self.in_completion_order.push(sequence),
                    CollectOrder::Input => self.in_input_order[index] = Some(sequence),
                }
            }
            Completion::Faulted { index, reason } => {
                self.reported[index] = true;
                tracing::warn!(index, %reason, "sort task faulted");
                self.failures.push(TaskFailure { index, reason });
            }
        }
    }

    /// Every task that never published is reported as failed, so the output
    /// plus the failures always account for the whole batch.
    fn finish(mut self) -> (Batch, Vec<TaskFailure>) {
        for (index, reported) in self.reported.iter().enumerate() {
            if !reported {
                self.failures.push(TaskFailure {
                    index,
                    reason: "sort task ended without reporting".to_string(),
                });
            }
        }
        self.failures.sort_by_key(|failure| failure.index);

        let batch = match self.order {
            CollectOrder::Completion => self.in_completion_order.into_iter().collect(),
            CollectOrder::Input => self.in_input_order.into_iter().flatten().collect(),
        };
        (batch, self.failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_multiset(batch: &Batch) -> Vec<Vec<i64>> {
        let mut sequences = batch
            .iter()
            .map(|sequence| {
                let mut values = sequence.as_slice().to_vec();
                values.sort_unstable();
                values
            })
            .collect::<Vec<_>>();
        sequences.sort();
        sequences
    }

    fn panic_on_sentinel(values: &mut [i64]) {
        if values.contains(&-1) {
            panic!("sentinel value");
        }
        values.sort_unstable();
    }

    const SLOW_SORT: std::time::Duration = std::time::Duration::from_millis(200);

    fn slow_on_nine(values: &mut [i64]) {
        if values.contains(&9) {
            std::thread::sleep(SLOW_SORT);
        }
        values.sort_unstable();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn completion_order_puts_slow_task_last() {
        let input = Batch::from(vec![vec![9, 8, 7], vec![1], vec![2]]);
        let sorter = ConcurrentSorter::with_kernel(CollectOrder::Completion, slow_on_nine);

        let report = sorter.sort(input).await;

        assert_eq!(report.batch.len(), 3);
        let last = report.batch.iter().last().map(Sequence::as_slice);
        assert_eq!(last, Some(&[7, 8, 9][..]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn input_order_waits_for_slow_task_slot() {
        let input = Batch::from(vec![vec![9, 8, 7], vec![1], vec![2]]);
        let sorter = ConcurrentSorter::with_kernel(CollectOrder::Input, slow_on_nine);

        let report = sorter.sort(input).await;

        assert_eq!(report.batch, Batch::from(vec![vec![7, 8, 9], vec![1], vec![2]]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn elapsed_covers_slowest_task() {
        for order in [CollectOrder::Completion, CollectOrder::Input] {
            let input = Batch::from(vec![vec![1], vec![9, 8, 7], vec![2]]);
            let report = ConcurrentSorter::with_kernel(order, slow_on_nine)
                .sort(input)
                .await;

            assert!(
                report.elapsed >= SLOW_SORT,
                "{order:?}: {:?} is shorter than the slowest task",
                report.elapsed
            );
            assert!(report.time_ns() >= SLOW_SORT.as_nanos() as u64);
        }
    }

    #[tokio::test]
    async fn empty_batch_returns_immediately() {
        let report = ConcurrentSorter::default().sort(Batch::default()).await;
        assert!(report.batch.is_empty());
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn empty_sequence_takes_part() {
        let report = ConcurrentSorter::default()
            .sort(Batch::from(vec![vec![]]))
            .await;
        assert_eq!(report.batch, Batch::from(vec![vec![]]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn completion_order_returns_every_sequence() {
        let input = Batch::from(vec![vec![5, 4], vec![2, 1], vec![0]]);
        let report = ConcurrentSorter::new(CollectOrder::Completion)
            .sort(input.clone())
            .await;

        assert_eq!(report.batch.len(), 3);
        assert!(report.batch.iter().all(Sequence::is_sorted));
        assert_eq!(sorted_multiset(&report.batch), sorted_multiset(&input));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn input_order_keeps_positions() {
        let input = Batch::from(vec![vec![5, 4], vec![2, 1], vec![0]]);
        let report = ConcurrentSorter::new(CollectOrder::Input).sort(input).await;
        assert_eq!(report.batch, Batch::from(vec![vec![4, 5], vec![1, 2], vec![0]]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn faulted_task_is_reported_not_hung() {
        let input = Batch::from(vec![vec![3, 2], vec![9, -1, 4], vec![1, 0]]);
        let sorter = ConcurrentSorter::with_kernel(CollectOrder::Input, panic_on_sentinel);

        let report = tokio::time::timeout(std::time::Duration::from_secs(10), sorter.sort(input))
            .await
            .expect("fan-in must not hang on a faulted task");

        assert_eq!(report.batch, Batch::from(vec![vec![2, 3], vec![0, 1]]));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].reason, "sentinel value");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn faults_in_completion_order_keep_the_count() {
        let input = Batch::from(vec![vec![-1], vec![7, 6], vec![-1, 5]]);
        let sorter = ConcurrentSorter::with_kernel(CollectOrder::Completion, panic_on_sentinel);

        let report = sorter.sort(input).await;

        assert_eq!(report.batch, Batch::from(vec![vec![6, 7]]));
        let failed = report.failures.iter().map(|f| f.index).collect::<Vec<_>>();
        assert_eq!(failed, vec![0, 2]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_do_not_mix() {
        let sorter = ConcurrentSorter::new(CollectOrder::Input);
        let first = Batch::from(vec![vec![3, 2, 1]; 32]);
        let second = Batch::from(vec![vec![10, -10]; 32]);

        let (first, second) = tokio::join!(sorter.sort(first), sorter.sort(second));

        assert!(first.batch.iter().all(|s| s.as_slice() == [1, 2, 3]));
        assert!(second.batch.iter().all(|s| s.as_slice() == [-10, 10]));
    }

    #[test]
    fn collector_reports_missing_tasks() {
        let mut collector = Collector::new(CollectOrder::Input, 3);
        collector.accept(Completion::Sorted {
            index: 2,
            sequence: Sequence::from(vec![1]),
        });
        let (batch, failures) = collector.finish();

        assert_eq!(batch, Batch::from(vec![vec![1]]));
        let failed = failures.iter().map(|f| f.index).collect::<Vec<_>>();
        assert_eq!(failed, vec![0, 1]);
    }
}
