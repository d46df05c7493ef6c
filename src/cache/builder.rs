//! Cell Builder Module
//!
//! Fluent construction of cache cells.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::cache::CacheCell;
use crate::config::Config;
use crate::sched::Scheduler;
use crate::storage::StorageConnector;

/// Builder collecting the timing configuration for a [`CacheCell`].
///
/// Every period defaults to disabled, so an unconfigured builder produces
/// the same cell as [`CacheCell::simple`].
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use memcell::{CellBuilder, MemoryConnector, TokioScheduler};
///
/// let cell = CellBuilder::new()
///     .lifespan_ms(60_000)
///     .write_ms(5_000)
///     .build(
///         Some(42i64),
///         Arc::new(MemoryConnector::new()),
///         Arc::new(TokioScheduler::new()),
///     );
/// ```
pub struct CellBuilder<T> {
    config: Config,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CellBuilder<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a builder with every activity disabled.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            _marker: PhantomData,
        }
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            _marker: PhantomData,
        }
    }

    /// Total lifetime of the cell in milliseconds; `<= 0` never expires.
    pub fn lifespan_ms(mut self, millis: i64) -> Self {
        self.config.lifespan_ms = millis;
        self
    }

    /// Write-back period in milliseconds; `<= 0` disables write-back.
    pub fn write_ms(mut self, millis: i64) -> Self {
        self.config.write_ms = millis;
        self
    }

    /// Read-refresh period in milliseconds; `<= 0` disables read-refresh.
    pub fn read_ms(mut self, millis: i64) -> Self {
        self.config.read_ms = millis;
        self
    }

    /// Creates the cell from the collected configuration.
    pub fn build(
        self,
        initial: Option<T>,
        connector: Arc<dyn StorageConnector<T>>,
        scheduler: Arc<dyn Scheduler>,
    ) -> CacheCell<T> {
        CacheCell::new(initial, self.config, connector, scheduler)
    }
}

impl<T> Default for CellBuilder<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::{ManualScheduler, RecordingConnector, TaskKind};
    use std::time::Duration;

    #[test]
    fn test_unconfigured_builder_arms_nothing() {
        let scheduler = Arc::new(ManualScheduler::new());
        let cell = CellBuilder::new().build(
            Some(1i64),
            Arc::new(RecordingConnector::new()),
            scheduler.clone(),
        );

        assert_eq!(scheduler.live_count(TaskKind::Once), 0);
        assert_eq!(scheduler.live_count(TaskKind::FixedRate), 0);
        assert_eq!(cell.get(), Some(1));
    }

    #[test]
    fn test_configured_periods_flow_through() {
        let scheduler = Arc::new(ManualScheduler::new());
        let _cell = CellBuilder::new()
            .lifespan_ms(500)
            .write_ms(100)
            .read_ms(200)
            .build(
                Some(1i64),
                Arc::new(RecordingConnector::new()),
                scheduler.clone(),
            );

        assert_eq!(
            scheduler.periods(TaskKind::Once),
            vec![Duration::from_millis(500)]
        );
        assert_eq!(
            scheduler.periods(TaskKind::FixedRate),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[test]
    fn test_from_config_round_trips() {
        let config = Config {
            lifespan_ms: 9,
            write_ms: -1,
            read_ms: 3,
        };
        let scheduler = Arc::new(ManualScheduler::new());
        let _cell = CellBuilder::from_config(config).build(
            Some(1i64),
            Arc::new(RecordingConnector::new()),
            scheduler.clone(),
        );

        assert_eq!(scheduler.live_count(TaskKind::Once), 1);
        assert_eq!(scheduler.live_count(TaskKind::FixedRate), 1);
    }
}
