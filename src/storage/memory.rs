//! In-Memory Connector Module
//!
//! Storage connector backed by process memory. Values still round-trip
//! through the wire layer, so it behaves like a real backend minus the I/O.

use std::marker::PhantomData;
use std::sync::Mutex;

use crate::error::Result;
use crate::storage::StorageConnector;
use crate::wire::{Wire, WireValue};

// == Memory Connector ==
/// Keeps the latest written wire value in memory.
///
/// Useful as a stand-in backend in tests and for cells whose durability
/// requirements end at the process boundary.
#[derive(Debug)]
pub struct MemoryConnector<T> {
    /// Latest persisted wire value
    stored: Mutex<WireValue>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemoryConnector<T> {
    // == Constructor ==
    /// Creates a connector holding the absent value.
    pub fn new() -> Self {
        Self {
            stored: Mutex::new(WireValue::Null),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for MemoryConnector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StorageConnector<T> for MemoryConnector<T>
where
    T: Wire + Send + Sync,
{
    fn write(&self, value: Option<&T>) -> Result<()> {
        let wire = match value {
            Some(v) => v.to_wire(),
            None => WireValue::Null,
        };
        *self.stored.lock().expect("connector lock poisoned") = wire;
        Ok(())
    }

    fn read(&self) -> Result<Option<T>> {
        let wire = self.stored.lock().expect("connector lock poisoned").clone();
        if wire.is_null() {
            return Ok(None);
        }
        T::from_wire(wire).map(Some)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_before_any_write_is_absent() {
        let connector: MemoryConnector<i64> = MemoryConnector::new();
        assert_eq!(connector.read().unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let connector = MemoryConnector::new();

        connector.write(Some(&42i64)).unwrap();
        assert_eq!(connector.read().unwrap(), Some(42));
    }

    #[test]
    fn test_write_absence_clears_value() {
        let connector = MemoryConnector::new();

        connector.write(Some(&"hello".to_string())).unwrap();
        connector.write(None).unwrap();
        assert_eq!(connector.read().unwrap(), None);
    }
}
