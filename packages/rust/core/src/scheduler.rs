//! Deferred execution for assistant replies.
//!
//! [`TokioScheduler`] runs tasks on a real timer. [`ManualScheduler`] keeps a
//! virtual clock that only moves when [`ManualScheduler::advance`] is called,
//! so reply timing can be driven step by step.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use noahaid_shared::{NoahAidError, Result};
use tokio::runtime::Handle;

/// A one-shot unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task once `delay` has elapsed. Tasks cannot be cancelled.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task);
}

// ---------------------------------------------------------------------------
// TokioScheduler
// ---------------------------------------------------------------------------

/// Spawns each task onto a Tokio runtime behind `tokio::time::sleep`.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime of the calling context.
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| NoahAidError::Scheduler(format!("no Tokio runtime available: {e}")))?;
        Ok(Self::new(handle))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

// ---------------------------------------------------------------------------
// ManualScheduler
// ---------------------------------------------------------------------------

struct Pending {
    due: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_seq: u64,
    pending: Vec<Pending>,
}

/// Virtual-clock scheduler. Tasks run inside [`ManualScheduler::advance`],
/// ordered by due time and then by scheduling order.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of tasks still waiting.
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Move the clock forward by `by`, running every task that falls due.
    /// Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = {
            let mut inner = self.lock();
            inner.now += by;
            inner.now
        };

        let mut ran = 0;
        // Pop one at a time with the lock released, so a task may schedule more work.
        while let Some(task) = self.pop_due(target) {
            task();
            ran += 1;
        }
        ran
    }

    fn pop_due(&self, target: Duration) -> Option<Task> {
        let mut inner = self.lock();
        let idx = inner
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= target)
            .min_by_key(|(_, p)| (p.due, p.seq))
            .map(|(i, _)| i)?;
        Some(inner.pending.swap_remove(idx).task)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualInner> {
        // A panicking task cannot leave the queue half-updated.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut inner = self.lock();
        let due = inner.now + delay;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.pending.push(Pending { due, seq, task });
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &inner.now)
            .field("pending", &inner.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log2 = Arc::clone(&log);
        let make = move |name: &'static str| -> Task {
            let log = Arc::clone(&log2);
            Box::new(move || log.lock().unwrap().push(name))
        };
        (log, make)
    }

    #[test]
    fn task_waits_for_full_delay() {
        let sched = ManualScheduler::new();
        let (log, task) = recorder();
        sched.schedule(Duration::from_millis(800), task("reply"));

        assert_eq!(sched.advance(Duration::from_millis(799)), 0);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(sched.pending(), 1);

        assert_eq!(sched.advance(Duration::from_millis(1)), 1);
        assert_eq!(*log.lock().unwrap(), vec!["reply"]);
        assert_eq!(sched.pending(), 0);
        assert_eq!(sched.now(), Duration::from_millis(800));
    }

    #[test]
    fn tasks_run_in_due_order_then_fifo() {
        let sched = ManualScheduler::new();
        let (log, task) = recorder();
        sched.schedule(Duration::from_millis(50), task("late"));
        sched.schedule(Duration::from_millis(10), task("early-a"));
        sched.schedule(Duration::from_millis(10), task("early-b"));

        assert_eq!(sched.advance(Duration::from_millis(100)), 3);
        assert_eq!(*log.lock().unwrap(), vec!["early-a", "early-b", "late"]);
    }

    #[test]
    fn delay_is_relative_to_schedule_time() {
        let sched = ManualScheduler::new();
        let (log, task) = recorder();
        sched.advance(Duration::from_millis(500));
        sched.schedule(Duration::from_millis(800), task("reply"));

        sched.advance(Duration::from_millis(700));
        assert!(log.lock().unwrap().is_empty());
        sched.advance(Duration::from_millis(100));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn task_may_schedule_follow_up() {
        let sched = ManualScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));

        let inner_sched = sched.clone();
        let inner_count = Arc::clone(&count);
        sched.schedule(
            Duration::ZERO,
            Box::new(move || {
                inner_count.fetch_add(1, Ordering::SeqCst);
                let c = Arc::clone(&inner_count);
                inner_sched.schedule(
                    Duration::ZERO,
                    Box::new(move || {
                        c.fetch_add(1, Ordering::SeqCst);
                    }),
                );
            }),
        );

        assert_eq!(sched.advance(Duration::ZERO), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_fires_after_delay() {
        let sched = TokioScheduler::current().expect("runtime");
        let (tx, rx) = tokio::sync::oneshot::channel();
        sched.schedule(
            Duration::from_millis(800),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );

        let start = tokio::time::Instant::now();
        rx.await.expect("task ran");
        assert!(start.elapsed() >= Duration::from_millis(800));
    }

    #[test]
    fn tokio_scheduler_requires_runtime() {
        let err = TokioScheduler::current().unwrap_err();
        assert!(err.to_string().contains("no Tokio runtime"));
    }
}
