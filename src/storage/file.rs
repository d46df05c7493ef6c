//! JSON File Connector Module
//!
//! Storage connector persisting the wire value as a JSON document on disk.

use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::storage::StorageConnector;
use crate::wire::{Wire, WireValue};

// == Stored Record ==
/// On-disk document: the wire value plus the time it was written.
#[derive(Debug, Serialize, Deserialize)]
struct Record {
    /// Persisted wire value
    value: WireValue,
    /// When the value was written (UTC)
    written_at: DateTime<Utc>,
}

// == JSON File Connector ==
/// Persists a single wire value as JSON at a fixed path.
///
/// A missing file reads as the absent value. Writes replace the whole
/// document and stamp it with the write time.
#[derive(Debug)]
pub struct JsonFileConnector<T> {
    /// Path of the JSON document
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileConnector<T> {
    // == Constructor ==
    /// Creates a connector storing its document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl<T> StorageConnector<T> for JsonFileConnector<T>
where
    T: Wire + Send + Sync,
{
    fn write(&self, value: Option<&T>) -> Result<()> {
        let record = Record {
            value: match value {
                Some(v) => v.to_wire(),
                None => WireValue::Null,
            },
            written_at: Utc::now(),
        };

        let json = serde_json::to_string(&record)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "wrote cache document");
        Ok(())
    }

    fn read(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let record: Record = serde_json::from_str(&json)?;
        if record.value.is_null() {
            return Ok(None);
        }
        T::from_wire(record.value).map(Some)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_absent() {
        let dir = tempdir().unwrap();
        let connector: JsonFileConnector<i64> =
            JsonFileConnector::new(dir.path().join("missing.json"));

        assert_eq!(connector.read().unwrap(), None);
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempdir().unwrap();
        let connector = JsonFileConnector::new(dir.path().join("cell.json"));

        connector.write(Some(&"persisted".to_string())).unwrap();
        assert_eq!(connector.read().unwrap(), Some("persisted".to_string()));
    }

    #[test]
    fn test_write_absence_reads_absent() {
        let dir = tempdir().unwrap();
        let connector = JsonFileConnector::new(dir.path().join("cell.json"));

        connector.write(Some(&7i32)).unwrap();
        connector.write(None).unwrap();
        assert_eq!(connector.read().unwrap(), None);
    }

    #[test]
    fn test_document_carries_write_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cell.json");
        let connector = JsonFileConnector::new(path.clone());

        connector.write(Some(&true)).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        let record: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(record.value, WireValue::Bool(true));
        assert!(record.written_at <= Utc::now());
    }
}
