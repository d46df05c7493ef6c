//! Configuration Module
//!
//! Timing configuration for cache cells, loadable from environment variables.

use std::env;
use std::time::Duration;

/// Timing configuration for a cache cell.
///
/// Every period is expressed in milliseconds; a value `<= 0` disables the
/// corresponding activity entirely. Disabled is the default and is never an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Total lifetime of the cell in milliseconds; the cell expires on its
    /// own once this elapses. `<= 0` means the cell never expires.
    pub lifespan_ms: i64,
    /// Period of the background write-back activity in milliseconds
    pub write_ms: i64,
    /// Period of the background read-refresh activity in milliseconds
    pub read_ms: i64,
}

impl Config {
    /// Creates a Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMCELL_LIFESPAN_MS` - Cell lifespan in milliseconds (default: -1, disabled)
    /// - `MEMCELL_WRITE_MS` - Write-back period in milliseconds (default: -1, disabled)
    /// - `MEMCELL_READ_MS` - Read-refresh period in milliseconds (default: -1, disabled)
    pub fn from_env() -> Self {
        Self {
            lifespan_ms: env::var("MEMCELL_LIFESPAN_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(-1),
            write_ms: env::var("MEMCELL_WRITE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(-1),
            read_ms: env::var("MEMCELL_READ_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(-1),
        }
    }

    /// Lifespan as a duration, or None if the cell never expires.
    pub fn lifespan(&self) -> Option<Duration> {
        period(self.lifespan_ms)
    }

    /// Write-back period as a duration, or None if write-back is disabled.
    pub fn write_period(&self) -> Option<Duration> {
        period(self.write_ms)
    }

    /// Read-refresh period as a duration, or None if read-refresh is disabled.
    pub fn read_period(&self) -> Option<Duration> {
        period(self.read_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lifespan_ms: -1,
            write_ms: -1,
            read_ms: -1,
        }
    }
}

fn period(millis: i64) -> Option<Duration> {
    if millis > 0 {
        Some(Duration::from_millis(millis as u64))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.lifespan_ms, -1);
        assert_eq!(config.write_ms, -1);
        assert_eq!(config.read_ms, -1);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("MEMCELL_LIFESPAN_MS");
        env::remove_var("MEMCELL_WRITE_MS");
        env::remove_var("MEMCELL_READ_MS");

        let config = Config::from_env();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_disabled_periods_yield_none() {
        let config = Config {
            lifespan_ms: 0,
            write_ms: -5,
            read_ms: -1,
        };
        assert_eq!(config.lifespan(), None);
        assert_eq!(config.write_period(), None);
        assert_eq!(config.read_period(), None);
    }

    #[test]
    fn test_positive_periods_yield_durations() {
        let config = Config {
            lifespan_ms: 50,
            write_ms: 20,
            read_ms: 30,
        };
        assert_eq!(config.lifespan(), Some(Duration::from_millis(50)));
        assert_eq!(config.write_period(), Some(Duration::from_millis(20)));
        assert_eq!(config.read_period(), Some(Duration::from_millis(30)));
    }
}
