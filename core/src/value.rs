//! Runtime values flowing in (literals, variables, row cells) and out
//! (materialized records) of the engine.

use chrono::NaiveDateTime;
use compact_str::CompactString;
use quarry_types::ScalarKind;
use smallvec::SmallVec;

use crate::error::{QuarryError, Result};
use crate::row::FromValue;

/// A dynamically typed SQL-side value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    /// A collection: `IN` operands, to-many navigation contents, structured
    /// values produced by type handlers.
    List(Vec<Value>),
    /// A materialized object.
    Record(Box<Record>),
}

impl Value {
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in conversion errors.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Storable kind of the value, `None` for null and composite values.
    pub const fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Value::Bool(_) => Some(ScalarKind::Bool),
            Value::Int(_) => Some(ScalarKind::Int),
            Value::Float(_) => Some(ScalarKind::Float),
            Value::Text(_) => Some(ScalarKind::Text),
            Value::Bytes(_) => Some(ScalarKind::Bytes),
            Value::DateTime(_) => Some(ScalarKind::DateTime),
            Value::Null | Value::List(_) | Value::Record(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(&**record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Value::Record(record) => Some(*record),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )+
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(Box::new(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

macro_rules! impl_from_vec {
    ($($t:ty),+) => {
        $(
            impl From<Vec<$t>> for Value {
                fn from(value: Vec<$t>) -> Self {
                    Value::List(value.into_iter().map(Into::into).collect())
                }
            }
        )+
    };
}

// `Vec<u8>` maps to `Value::Bytes` above.
impl_from_vec!(i16, i32, i64, u16, u32, f64, bool, &str, String, Value, Record);

/// A materialized entity or projection: ordered member/value pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// Entity type the record was built for, `None` for anonymous projections.
    pub entity: Option<CompactString>,
    pub fields: SmallVec<[(CompactString, Value); 8]>,
}

impl Record {
    pub fn new(entity: Option<CompactString>) -> Self {
        Self {
            entity,
            fields: SmallVec::new(),
        }
    }

    /// Creates an anonymous record from member/value pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<CompactString>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            entity: None,
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, member: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, member: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(name, _)| name == member)
            .map(|(_, value)| value)
    }

    /// Sets a member, replacing an existing value of the same name.
    pub fn set(&mut self, member: impl Into<CompactString>, value: impl Into<Value>) {
        let member = member.into();
        let value = value.into();
        match self.get_mut(&member) {
            Some(slot) => *slot = value,
            None => self.fields.push((member, value)),
        }
    }

    /// Reads a member and converts it to a Rust type.
    pub fn get_as<T: FromValue>(&self, member: &str) -> Result<T> {
        let value = self.get(member).ok_or_else(|| QuarryError::ShapeMismatch {
            entity: self.entity.clone().unwrap_or_else(|| "<projection>".into()),
            member: member.into(),
        })?;
        T::from_value(value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_maps_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(3)), Value::Int(3));
    }

    #[test]
    fn test_bytes_stay_bytes() {
        assert_eq!(Value::from(vec![1u8, 2]), Value::Bytes(vec![1, 2]));
        assert_eq!(
            Value::from(vec![1i32, 2]),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_record_set_replaces() {
        let mut record = Record::from_pairs([("id", 1)]);
        record.set("id", 2);
        record.set("name", "x");
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("id"), Some(&Value::Int(2)));
        assert_eq!(record.get_as::<String>("name").unwrap(), "x");
        assert!(record.get_as::<i64>("missing").is_err());
    }
}
