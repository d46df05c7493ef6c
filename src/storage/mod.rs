//! Storage Module
//!
//! The storage port: connectors move a cell's value between memory and a
//! durable backend, converting through the wire layer on the way.
//!
//! # Connectors
//! - `MemoryConnector` - keeps the latest wire value in memory
//! - `JsonFileConnector` - persists the wire value as JSON on disk

mod file;
mod memory;

// Re-export public types
pub use file::JsonFileConnector;
pub use memory::MemoryConnector;

use crate::error::Result;

// == Storage Connector ==
/// Connects an in-memory value to durable storage.
///
/// A connector is a dumb write-through/read-through port: `write` persists
/// the current value (including absence), `read` retrieves the latest
/// persisted value or `None` if nothing was ever stored. No transactional or
/// versioning contract is assumed; calls may be slow and may fail.
pub trait StorageConnector<T>: Send + Sync {
    /// Persists the value. `None` persists absence.
    fn write(&self, value: Option<&T>) -> Result<()>;

    /// Retrieves the latest persisted value, or `None` if none exists.
    fn read(&self) -> Result<Option<T>>;
}
