//! Test Doubles for the Cache Cell
//!
//! A hand-fired scheduler port and a recording storage connector. The
//! scheduler keeps every scheduled job and lets tests fire callbacks
//! manually, including ones whose handles were already cancelled, to model
//! firings that were in flight when the cell died.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{CacheError, Result};
use crate::sched::{Job, JobOutcome, Scheduler, TaskHandle};
use crate::storage::StorageConnector;

// == Task Kind ==
/// Which scheduling entry point produced a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskKind {
    Once,
    FixedRate,
}

// == Manual Scheduler ==
struct ManualTask {
    kind: TaskKind,
    period: Duration,
    job: Mutex<Job>,
    cancelled: Arc<AtomicBool>,
}

/// Scheduler port whose jobs only run when a test fires them.
pub(crate) struct ManualScheduler {
    tasks: Mutex<Vec<Arc<ManualTask>>>,
}

impl ManualScheduler {
    pub(crate) fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, kind: TaskKind, period: Duration, job: Job) -> Box<dyn TaskHandle> {
        let task = Arc::new(ManualTask {
            kind,
            period,
            job: Mutex::new(job),
            cancelled: Arc::new(AtomicBool::new(false)),
        });
        self.tasks.lock().unwrap().push(Arc::clone(&task));
        Box::new(ManualHandle {
            cancelled: Arc::clone(&task.cancelled),
        })
    }

    fn snapshot(&self) -> Vec<Arc<ManualTask>> {
        self.tasks.lock().unwrap().clone()
    }

    /// Number of scheduled-and-not-cancelled tasks of a kind.
    pub(crate) fn live_count(&self, kind: TaskKind) -> usize {
        self.snapshot()
            .iter()
            .filter(|t| t.kind == kind && !t.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Periods of every task of a kind, in scheduling order.
    pub(crate) fn periods(&self, kind: TaskKind) -> Vec<Duration> {
        self.snapshot()
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.period)
            .collect()
    }

    /// Fires every task of a kind once, cancelled or not, and returns the
    /// last outcome. Cancelled tasks model callbacks already in flight.
    pub(crate) fn fire_kind(&self, kind: TaskKind) -> Option<JobOutcome> {
        let mut last = None;
        for task in self.snapshot() {
            if task.kind == kind {
                let mut job = task.job.lock().unwrap();
                last = Some((*job)());
            }
        }
        last
    }

    /// Fires every task once and returns the outcomes in scheduling order.
    pub(crate) fn fire_all(&self) -> Vec<JobOutcome> {
        self.snapshot()
            .iter()
            .map(|task| {
                let mut job = task.job.lock().unwrap();
                (*job)()
            })
            .collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, job: Job) -> Box<dyn TaskHandle> {
        self.push(TaskKind::Once, delay, job)
    }

    fn schedule_at_fixed_rate(&self, period: Duration, job: Job) -> Box<dyn TaskHandle> {
        self.push(TaskKind::FixedRate, period, job)
    }
}

struct ManualHandle {
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle for ManualHandle {
    fn cancel(&self, _interrupt: bool) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// == Recording Connector ==
/// Storage connector that records writes and serves a configurable read
/// value, with injectable failures for both directions.
pub(crate) struct RecordingConnector {
    written: Mutex<Vec<Option<i64>>>,
    read_value: Mutex<Option<i64>>,
    read_count: AtomicUsize,
    write_failure: AtomicBool,
    read_failure: AtomicBool,
}

impl RecordingConnector {
    pub(crate) fn new() -> Self {
        Self {
            written: Mutex::new(Vec::new()),
            read_value: Mutex::new(None),
            read_count: AtomicUsize::new(0),
            write_failure: AtomicBool::new(false),
            read_failure: AtomicBool::new(false),
        }
    }

    /// Every write observed so far, oldest first.
    pub(crate) fn writes(&self) -> Vec<Option<i64>> {
        self.written.lock().unwrap().clone()
    }

    /// Number of reads observed so far.
    pub(crate) fn reads(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }

    /// Sets the value every subsequent read reports.
    pub(crate) fn set_read_value(&self, value: Option<i64>) {
        *self.read_value.lock().unwrap() = value;
    }

    /// Makes subsequent writes fail (or succeed again).
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.write_failure.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent reads fail (or succeed again).
    pub(crate) fn fail_reads(&self, fail: bool) {
        self.read_failure.store(fail, Ordering::SeqCst);
    }

    /// Forgets all recorded traffic.
    pub(crate) fn clear(&self) {
        self.written.lock().unwrap().clear();
        self.read_count.store(0, Ordering::SeqCst);
    }
}

impl StorageConnector<i64> for RecordingConnector {
    fn write(&self, value: Option<&i64>) -> Result<()> {
        if self.write_failure.load(Ordering::SeqCst) {
            return Err(CacheError::Storage("injected write failure".to_string()));
        }
        self.written.lock().unwrap().push(value.copied());
        Ok(())
    }

    fn read(&self) -> Result<Option<i64>> {
        if self.read_failure.load(Ordering::SeqCst) {
            return Err(CacheError::Storage("injected read failure".to_string()));
        }
        self.read_count.fetch_add(1, Ordering::SeqCst);
        Ok(*self.read_value.lock().unwrap())
    }
}
