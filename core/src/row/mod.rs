//! Row access and typed extraction.
//!
//! The execution layer hands the materializer rows that are indexable by
//! ordinal; the materializer hands back [`Value`]s that callers convert with
//! [`FromValue`] / [`FromRecord`].
//!
//! ```text
//! driver row   → Row::get(ordinal)        (raw cells)
//! Materializer → Value::Record(Record)    (object graph)
//! FromRecord   → user struct              (typed)
//! ```

use chrono::NaiveDateTime;

use crate::error::{QuarryError, Result};
use crate::value::{Record, Value};

// =============================================================================
// Row — ordinal access to one result row
// =============================================================================

/// One flat result row.
pub trait Row {
    /// Number of columns in the row.
    fn width(&self) -> usize;

    /// Raw cell at `ordinal`, `None` past the end.
    fn get(&self, ordinal: usize) -> Option<&Value>;

    /// Like [`Row::get`], failing with a shape error past the end.
    fn cell(&self, ordinal: usize) -> Result<&Value> {
        self.get(ordinal).ok_or(QuarryError::RowShape {
            ordinal,
            width: self.width(),
        })
    }
}

impl Row for [Value] {
    fn width(&self) -> usize {
        self.len()
    }

    fn get(&self, ordinal: usize) -> Option<&Value> {
        <[Value]>::get(self, ordinal)
    }
}

impl Row for Vec<Value> {
    fn width(&self) -> usize {
        self.len()
    }

    fn get(&self, ordinal: usize) -> Option<&Value> {
        self.as_slice().get(ordinal)
    }
}

impl<const N: usize> Row for [Value; N] {
    fn width(&self) -> usize {
        N
    }

    fn get(&self, ordinal: usize) -> Option<&Value> {
        self.as_slice().get(ordinal)
    }
}

impl<R: Row + ?Sized> Row for &R {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn get(&self, ordinal: usize) -> Option<&Value> {
        (**self).get(ordinal)
    }
}

// =============================================================================
// FromValue — one value into a Rust type
// =============================================================================

/// Converts a materialized value into a Rust type.
#[diagnostic::on_unimplemented(
    message = "cannot convert a quarry `Value` into `{Self}`",
    label = "this type does not implement FromValue"
)]
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch<T>(expected: &'static str, value: &Value) -> Result<T> {
    Err(QuarryError::Conversion {
        expected,
        found: value.type_name(),
    })
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_bool().map_or_else(|| mismatch("bool", value), Ok)
    }
}

macro_rules! from_value_int {
    ($($t:ty),+) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self> {
                    match value.as_i64() {
                        Some(i) => <$t>::try_from(i).or_else(|_| mismatch(stringify!($t), value)),
                        None => mismatch(stringify!($t), value),
                    }
                }
            }
        )+
    };
}

// `u8` is left out so `Vec<u8>` can mean bytes.
from_value_int!(i8, i16, i32, i64, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_f64().map_or_else(|| mismatch("f64", value), Ok)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            _ => mismatch("String", value),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            _ => mismatch("Vec<u8>", value),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::Text(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .or_else(|_| mismatch("NaiveDateTime", value)),
            _ => mismatch("NaiveDateTime", value),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => mismatch("Vec<T>", value),
        }
    }
}

// =============================================================================
// FromRecord — a whole object
// =============================================================================

/// Builds a Rust struct from a materialized record.
///
/// Nested members read through [`Nested`], so a `Vec<Nested<Order>>`
/// member converts once `Order: FromRecord`.
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(record.clone())
    }
}

/// Adapter that lets a [`FromRecord`] type be read out of a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub struct Nested<T>(pub T);

impl<T: FromRecord> FromValue for Nested<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Record(record) => T::from_record(record).map(Nested),
            _ => mismatch("record", value),
        }
    }
}
