//! Error types for the memcell crate
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache cells and storage connectors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Storage backend failed during a read or write
    #[error("storage error: {0}")]
    Storage(String),

    /// Value could not be converted to/from its wire representation
    #[error("wire conversion error: expected {expected}, found {found}")]
    Wire {
        /// The wire type the conversion needed
        expected: &'static str,
        /// The wire type actually present
        found: &'static str,
    },

    /// I/O failure in a file-backed connector
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the memcell crate.
pub type Result<T> = std::result::Result<T, CacheError>;
