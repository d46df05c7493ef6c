//! FIFO Containers Module
//!
//! Capacity-bounded collections that discard the oldest element on overflow.
//! These carry no concurrency or temporal behavior; cells layer scheduling on
//! top of them when a whole collection is cached as one value.

mod list;
mod map;


// Re-export public types
pub use list::FifoList;
pub use map::FifoMap;
