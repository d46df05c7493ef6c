//! memcell - self-expiring single-value cache cells
//!
//! A cache cell owns one value and keeps it synchronized with durable
//! storage on its own schedule: periodic write-back, periodic read-refresh,
//! and an optional lifespan after which the cell expires itself. Storage and
//! scheduling are ports supplied by the caller.

pub mod cache;
pub mod config;
pub mod error;
pub mod fifo;
pub mod sched;
pub mod storage;
pub mod wire;

pub use cache::{CacheCell, CellBuilder};
pub use config::Config;
pub use error::{CacheError, Result};
pub use fifo::{FifoList, FifoMap};
pub use sched::{Job, JobOutcome, Scheduler, TaskHandle, TokioScheduler};
pub use storage::{JsonFileConnector, MemoryConnector, StorageConnector};
pub use wire::{Wire, WireValue};
