//! Cache Cell
//!
//! A self-managing, single-value in-memory cache. Each cell owns one value
//! slot and up to three scheduled activities: a one-shot lifespan timer that
//! expires the cell, a periodic write-back that persists the value through
//! the storage connector, and a periodic read-refresh that replaces the
//! value with whatever the connector reports.
//!
//! Every access to the slot, from timer callbacks and callers alike, runs
//! under one per-cell lock. Connector I/O happens outside the lock, so a
//! slow backend never blocks `get` or the other activities.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::sched::{JobOutcome, Scheduler, TaskHandle};
use crate::storage::StorageConnector;

// == Slot ==
/// Mutable state guarded by the cell lock.
struct Slot<T> {
    /// The cached value; None is the absent value
    value: Option<T>,
    /// False once the cell has died; never true again
    alive: bool,
    /// Pending lifespan activity, at most one
    lifespan_task: Option<Box<dyn TaskHandle>>,
    /// Pending write-back activity, at most one
    write_task: Option<Box<dyn TaskHandle>>,
    /// Pending read-refresh activity, at most one
    read_task: Option<Box<dyn TaskHandle>>,
}

// == Cell Inner ==
/// State shared between the cell and its scheduled activities.
struct CellInner<T> {
    slot: Mutex<Slot<T>>,
    connector: Arc<dyn StorageConnector<T>>,
}

impl<T> CellInner<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().expect("cell lock poisoned")
    }

    /// Terminal transition shared by explicit kill and lifespan expiry.
    ///
    /// Marks the slot dead and clears the value under the lock, then cancels
    /// every pending handle outside it. Idempotent; a callback firing after
    /// this observes `alive == false` and performs no side effect.
    fn die(&self, interrupt: bool) {
        let handles = {
            let mut slot = self.lock();
            slot.alive = false;
            slot.value = None;
            [
                slot.lifespan_task.take(),
                slot.write_task.take(),
                slot.read_task.take(),
            ]
        };
        for handle in handles.into_iter().flatten() {
            handle.cancel(interrupt);
        }
    }
}

impl<T: Clone> CellInner<T> {
    /// One firing of the write-back activity.
    fn write_tick(&self) -> JobOutcome {
        let snapshot = {
            let slot = self.lock();
            if !slot.alive {
                return JobOutcome::Halt;
            }
            slot.value.clone()
        };

        if let Err(err) = self.connector.write(snapshot.as_ref()) {
            // a transient backend failure must not end the activity
            warn!(error = %err, "periodic write-back failed, keeping schedule");
        }
        JobOutcome::Reschedule
    }

    /// One firing of the read-refresh activity.
    fn read_tick(&self) -> JobOutcome {
        if !self.lock().alive {
            return JobOutcome::Halt;
        }

        match self.connector.read() {
            Ok(fresh) => {
                let mut slot = self.lock();
                if !slot.alive {
                    // died while the read was in flight; drop the result
                    return JobOutcome::Halt;
                }
                slot.value = fresh;
                JobOutcome::Reschedule
            }
            Err(err) => {
                warn!(error = %err, "periodic read-refresh failed, keeping schedule");
                JobOutcome::Reschedule
            }
        }
    }
}

// == Cache Cell ==
/// A single-value cache with an optional lifespan, periodic write-back, and
/// periodic read-refresh.
///
/// A cell is alive from construction until its lifespan elapses or
/// [`CacheCell::kill`] is called; death is terminal and clears the value.
/// Dropping the cell kills it, so background activities never outlive their
/// owner.
pub struct CacheCell<T> {
    inner: Arc<CellInner<T>>,
}

impl<T> CacheCell<T>
where
    T: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates a cell and arms every activity whose period is enabled.
    ///
    /// A period `<= 0` in `config` disables that activity; disabling all
    /// three yields a cell that only changes through forced reads and only
    /// dies through [`CacheCell::kill`].
    pub fn new(
        initial: Option<T>,
        config: Config,
        connector: Arc<dyn StorageConnector<T>>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let inner = Arc::new(CellInner {
            slot: Mutex::new(Slot {
                value: initial,
                alive: true,
                lifespan_task: None,
                write_task: None,
                read_task: None,
            }),
            connector,
        });

        if let Some(lifespan) = config.lifespan() {
            Self::arm_lifespan(&inner, scheduler.as_ref(), lifespan);
        }
        if let Some(period) = config.write_period() {
            Self::arm_write(&inner, scheduler.as_ref(), period);
        }
        if let Some(period) = config.read_period() {
            Self::arm_read(&inner, scheduler.as_ref(), period);
        }

        Self { inner }
    }

    /// Creates a simple cell: no lifespan, no write-back, no read-refresh.
    ///
    /// The value never changes on its own and the cell never expires except
    /// through [`CacheCell::kill`].
    pub fn simple(initial: Option<T>, connector: Arc<dyn StorageConnector<T>>) -> Self {
        Self {
            inner: Arc::new(CellInner {
                slot: Mutex::new(Slot {
                    value: initial,
                    alive: true,
                    lifespan_task: None,
                    write_task: None,
                    read_task: None,
                }),
                connector,
            }),
        }
    }

    // == Arming ==
    fn arm_lifespan(inner: &Arc<CellInner<T>>, scheduler: &dyn Scheduler, lifespan: Duration) {
        let cell = Arc::clone(inner);
        let handle = scheduler.schedule_once(
            lifespan,
            Box::new(move || {
                debug!("cell lifespan elapsed");
                cell.die(false);
                JobOutcome::Halt
            }),
        );

        let mut slot = inner.lock();
        if let Some(prev) = slot.lifespan_task.take() {
            prev.cancel(false);
        }
        slot.lifespan_task = Some(handle);
    }

    fn arm_write(inner: &Arc<CellInner<T>>, scheduler: &dyn Scheduler, period: Duration) {
        debug!(period_ms = period.as_millis() as u64, "arming write-back");
        let cell = Arc::clone(inner);
        let handle =
            scheduler.schedule_at_fixed_rate(period, Box::new(move || cell.write_tick()));

        let mut slot = inner.lock();
        if let Some(prev) = slot.write_task.take() {
            prev.cancel(false);
        }
        slot.write_task = Some(handle);
    }

    fn arm_read(inner: &Arc<CellInner<T>>, scheduler: &dyn Scheduler, period: Duration) {
        debug!(period_ms = period.as_millis() as u64, "arming read-refresh");
        let cell = Arc::clone(inner);
        let handle = scheduler.schedule_at_fixed_rate(period, Box::new(move || cell.read_tick()));

        let mut slot = inner.lock();
        if let Some(prev) = slot.read_task.take() {
            prev.cancel(false);
        }
        slot.read_task = Some(handle);
    }

    // == Get ==
    /// Returns the current value, or `None` once the cell is dead.
    ///
    /// Never touches the storage connector.
    pub fn get(&self) -> Option<T> {
        let slot = self.inner.lock();
        if !slot.alive {
            return None;
        }
        slot.value.clone()
    }

    /// Returns the current value, optionally forcing storage traffic first.
    ///
    /// On a dead cell this returns `Ok(None)` immediately with no side
    /// effects. Otherwise the order is: write the current value (if
    /// `force_write`), then replace it with the connector's value (if
    /// `force_read`), then return the slot. Requesting both is a
    /// read-through, not read-your-write: the returned value is whatever the
    /// store reported, which may differ from what was just written. Storage
    /// failures propagate to the caller.
    pub fn get_with(&self, force_write: bool, force_read: bool) -> Result<Option<T>> {
        let snapshot = {
            let slot = self.inner.lock();
            if !slot.alive {
                return Ok(None);
            }
            slot.value.clone()
        };

        if force_write {
            self.inner.connector.write(snapshot.as_ref())?;
        }

        if force_read {
            let fresh = self.inner.connector.read()?;
            let mut slot = self.inner.lock();
            if !slot.alive {
                return Ok(None);
            }
            slot.value = fresh;
            return Ok(slot.value.clone());
        }

        if force_write {
            // the slot may have moved while the lock was released for I/O
            let slot = self.inner.lock();
            if !slot.alive {
                return Ok(None);
            }
            return Ok(slot.value.clone());
        }

        Ok(snapshot)
    }

    // == Kill ==
    /// Kills the cell: the value becomes absent, every pending activity is
    /// cancelled, and the cell can never be revived.
    ///
    /// `interrupt` forcibly stops in-flight activity executions where the
    /// scheduler supports it; otherwise they finish and then observe death.
    /// Idempotent.
    pub fn kill(&self, interrupt: bool) {
        self.inner.die(interrupt);
    }

    /// Whether the cell is still alive.
    pub fn is_alive(&self) -> bool {
        self.inner.lock().alive
    }
}

impl<T> Drop for CacheCell<T> {
    fn drop(&mut self) {
        self.inner.die(false);
    }
}
