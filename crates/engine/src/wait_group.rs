use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Counts outstanding tasks and wakes waiters once the count reaches zero.
#[derive(Clone)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

struct Inner {
    pending: AtomicUsize,
    all_done: Notify,
}

/// Calls [`WaitGroup::done`] when dropped, unwinding included.
pub type DoneGuard = scopeguard::ScopeGuard<WaitGroup, fn(WaitGroup)>;

impl WaitGroup {
    pub fn new(pending: usize) -> Self {
        WaitGroup {
            inner: Arc::new(Inner {
                pending: AtomicUsize::new(pending),
                all_done: Notify::new(),
            }),
        }
    }

    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Marks one task as finished.
    ///
    /// Each task must call this exactly once; [`WaitGroup::done_guard`] makes
    /// that hold on every exit path.
    pub fn done(&self) {
        let previous = self.inner.pending.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "more tasks finished than were counted");
        if previous == 1 {
            self.inner.all_done.notify_waiters();
        }
    }

    pub fn done_guard(&self) -> DoneGuard {
        scopeguard::guard::<_, fn(WaitGroup)>(self.clone(), |wait_group| wait_group.done())
    }

    /// Resolves once every counted task has called [`WaitGroup::done`].
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.all_done.notified();
            tokio::pin!(notified);
            // Register before reading the counter so a concurrent `done` cannot slip between.
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}
