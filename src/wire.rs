//! Wire Value Module
//!
//! Database-safe scalar representation used at the storage boundary.
//!
//! Connectors never persist arbitrary in-memory types directly; values cross
//! the storage boundary as [`WireValue`] scalars. The [`Wire`] trait is the
//! compile-time bound that restricts cacheable-to-storage types to that
//! scalar set, so an unsupported type is a build failure rather than a
//! runtime check.

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Wire Value ==
/// A single database-safe scalar value.
///
/// `Null` represents the absent value and is a first-class citizen: a
/// connector that has never been written to reads back as `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    /// The absent value
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar; all integer widths travel as i64
    Int(i64),
    /// Floating-point scalar
    Float(f64),
    /// String scalar
    Str(String),
}

impl WireValue {
    /// Name of the variant, used in conversion error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Null => "Null",
            WireValue::Bool(_) => "Bool",
            WireValue::Int(_) => "Int",
            WireValue::Float(_) => "Float",
            WireValue::Str(_) => "Str",
        }
    }

    /// Whether this is the absent value.
    pub fn is_null(&self) -> bool {
        matches!(self, WireValue::Null)
    }
}

// == Wire Trait ==
/// Conversion between an in-memory value and its wire scalar.
///
/// Implemented for the scalar types a connector may persist. Conversion from
/// a mismatched wire variant fails with [`CacheError::Wire`].
pub trait Wire: Sized {
    /// Converts the in-memory value to its wire scalar.
    fn to_wire(&self) -> WireValue;

    /// Converts a wire scalar back to the in-memory value.
    fn from_wire(wire: WireValue) -> Result<Self>;
}

macro_rules! wire_int {
    ($($ty:ty),*) => {
        $(
            impl Wire for $ty {
                fn to_wire(&self) -> WireValue {
                    WireValue::Int(*self as i64)
                }

                fn from_wire(wire: WireValue) -> Result<Self> {
                    match wire {
                        WireValue::Int(n) => {
                            <$ty>::try_from(n).map_err(|_| CacheError::Wire {
                                expected: concat!("Int in ", stringify!($ty), " range"),
                                found: "Int",
                            })
                        }
                        other => Err(CacheError::Wire {
                            expected: "Int",
                            found: other.kind(),
                        }),
                    }
                }
            }
        )*
    };
}

wire_int!(i8, i16, i32, i64, u8, u16, u32);

impl Wire for f64 {
    fn to_wire(&self) -> WireValue {
        WireValue::Float(*self)
    }

    fn from_wire(wire: WireValue) -> Result<Self> {
        match wire {
            WireValue::Float(f) => Ok(f),
            // integers widen losslessly enough for storage round-trips
            WireValue::Int(n) => Ok(n as f64),
            other => Err(CacheError::Wire {
                expected: "Float",
                found: other.kind(),
            }),
        }
    }
}

impl Wire for bool {
    fn to_wire(&self) -> WireValue {
        WireValue::Bool(*self)
    }

    fn from_wire(wire: WireValue) -> Result<Self> {
        match wire {
            WireValue::Bool(b) => Ok(b),
            other => Err(CacheError::Wire {
                expected: "Bool",
                found: other.kind(),
            }),
        }
    }
}

impl Wire for String {
    fn to_wire(&self) -> WireValue {
        WireValue::Str(self.clone())
    }

    fn from_wire(wire: WireValue) -> Result<Self> {
        match wire {
            WireValue::Str(s) => Ok(s),
            other => Err(CacheError::Wire {
                expected: "Str",
                found: other.kind(),
            }),
        }
    }
}
