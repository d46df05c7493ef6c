//! Tokio Scheduler Module
//!
//! Scheduler port adapter running jobs as cooperative tokio tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::sched::{Job, JobOutcome, Scheduler, TaskHandle};

// == Tokio Scheduler ==
/// Runs scheduled jobs on a tokio runtime.
///
/// One-shot jobs sleep then fire; fixed-rate jobs loop on a
/// `tokio::time::interval`, checking the cancellation flag before every
/// firing. Cancelling with `interrupt = true` additionally aborts the
/// backing task, stopping an in-flight firing.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    /// Runtime the tasks are spawned onto
    handle: Handle,
}

impl TokioScheduler {
    // == Constructors ==
    /// Creates a scheduler on the current runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn new() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    /// Creates a scheduler on an explicit runtime handle.
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, mut job: Job) -> Box<dyn TaskHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if flag.load(Ordering::Acquire) {
                return;
            }
            let _ = job();
        });

        Box::new(TokioTaskHandle { cancelled, join })
    }

    fn schedule_at_fixed_rate(&self, period: Duration, mut job: Job) -> Box<dyn TaskHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let join = self.handle.spawn(async move {
            let mut interval = tokio::time::interval_at(
                tokio::time::Instant::now() + period,
                period,
            );
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                if job() == JobOutcome::Halt {
                    debug!("fixed-rate job halted itself");
                    break;
                }
            }
        });

        Box::new(TokioTaskHandle { cancelled, join })
    }
}

// == Tokio Task Handle ==
/// Handle to a job spawned by [`TokioScheduler`].
struct TokioTaskHandle {
    /// Set on cancel; checked before every firing
    cancelled: Arc<AtomicBool>,
    /// The backing tokio task
    join: JoinHandle<()>,
}

impl TaskHandle for TokioTaskHandle {
    fn cancel(&self, interrupt: bool) {
        self.cancelled.store(true, Ordering::Release);
        if interrupt {
            self.join.abort();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_job(counter: Arc<AtomicUsize>) -> Job {
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            JobOutcome::Reschedule
        })
    }

    #[test]
    fn test_once_fires_after_delay() {
        tokio_test::block_on(async {
            let scheduler = TokioScheduler::new();
            let counter = Arc::new(AtomicUsize::new(0));

            let _handle =
                scheduler.schedule_once(Duration::from_millis(10), counting_job(counter.clone()));

            tokio::time::sleep(Duration::from_millis(60)).await;
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn test_cancelled_once_never_fires() {
        tokio_test::block_on(async {
            let scheduler = TokioScheduler::new();
            let counter = Arc::new(AtomicUsize::new(0));

            let handle =
                scheduler.schedule_once(Duration::from_millis(10), counting_job(counter.clone()));
            handle.cancel(false);
            assert!(handle.is_cancelled());

            tokio::time::sleep(Duration::from_millis(60)).await;
            assert_eq!(counter.load(Ordering::SeqCst), 0);
        });
    }

    #[test]
    fn test_fixed_rate_fires_repeatedly() {
        tokio_test::block_on(async {
            let scheduler = TokioScheduler::new();
            let counter = Arc::new(AtomicUsize::new(0));

            let handle = scheduler
                .schedule_at_fixed_rate(Duration::from_millis(10), counting_job(counter.clone()));

            tokio::time::sleep(Duration::from_millis(100)).await;
            handle.cancel(false);

            assert!(counter.load(Ordering::SeqCst) >= 2);
        });
    }

    #[test]
    fn test_halt_stops_the_schedule() {
        tokio_test::block_on(async {
            let scheduler = TokioScheduler::new();
            let counter = Arc::new(AtomicUsize::new(0));
            let inner = Arc::clone(&counter);

            let _handle = scheduler.schedule_at_fixed_rate(
                Duration::from_millis(10),
                Box::new(move || {
                    inner.fetch_add(1, Ordering::SeqCst);
                    JobOutcome::Halt
                }),
            );

            tokio::time::sleep(Duration::from_millis(100)).await;
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn test_cancel_stops_future_firings() {
        tokio_test::block_on(async {
            let scheduler = TokioScheduler::new();
            let counter = Arc::new(AtomicUsize::new(0));

            let handle = scheduler
                .schedule_at_fixed_rate(Duration::from_millis(10), counting_job(counter.clone()));

            tokio::time::sleep(Duration::from_millis(45)).await;
            handle.cancel(false);
            let seen = counter.load(Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(60)).await;
            // one in-flight firing may still land after a non-interrupting cancel
            assert!(counter.load(Ordering::SeqCst) <= seen + 1);
        });
    }

    #[test]
    fn test_interrupting_cancel_aborts_immediately() {
        tokio_test::block_on(async {
            let scheduler = TokioScheduler::new();
            let counter = Arc::new(AtomicUsize::new(0));

            let handle = scheduler
                .schedule_at_fixed_rate(Duration::from_millis(10), counting_job(counter.clone()));
            handle.cancel(true);

            tokio::time::sleep(Duration::from_millis(60)).await;
            assert_eq!(counter.load(Ordering::SeqCst), 0);
        });
    }
}
