//! Type handlers: converters for members whose in-memory value is not
//! directly storable.

use std::fmt;
use std::sync::Arc;

use quarry_types::ScalarKind;

use crate::value::Value;

/// Outcome of a handler conversion; the error names what went wrong and is
/// wrapped with the member name by the caller.
pub type HandlerResult = std::result::Result<Value, String>;

/// Converts between an in-memory value and its storable representation.
pub trait TypeHandler: fmt::Debug + Send + Sync {
    /// Kind of the stored representation.
    fn store_kind(&self) -> ScalarKind;

    fn to_store(&self, value: &Value) -> HandlerResult;

    fn from_store(&self, value: &Value) -> HandlerResult;
}

type ConvertFn = Arc<dyn Fn(&Value) -> HandlerResult + Send + Sync>;

/// Type handler assembled from two closures.
///
/// ```ignore
/// let csv = FnTypeHandler::new(
///     ScalarKind::Text,
///     |v| Ok(join_csv(v)),
///     |v| Ok(split_csv(v)),
/// );
/// ```
#[derive(Clone)]
pub struct FnTypeHandler {
    store_kind: ScalarKind,
    to_store: ConvertFn,
    from_store: ConvertFn,
}

impl FnTypeHandler {
    pub fn new<T, F>(store_kind: ScalarKind, to_store: T, from_store: F) -> Self
    where
        T: Fn(&Value) -> HandlerResult + Send + Sync + 'static,
        F: Fn(&Value) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            store_kind,
            to_store: Arc::new(to_store),
            from_store: Arc::new(from_store),
        }
    }
}

impl fmt::Debug for FnTypeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTypeHandler")
            .field("store_kind", &self.store_kind)
            .finish_non_exhaustive()
    }
}

impl TypeHandler for FnTypeHandler {
    fn store_kind(&self) -> ScalarKind {
        self.store_kind
    }

    fn to_store(&self, value: &Value) -> HandlerResult {
        (self.to_store)(value)
    }

    fn from_store(&self, value: &Value) -> HandlerResult {
        (self.from_store)(value)
    }
}

/// Stores structured values (lists, records, scalars) as JSON text.
///
/// JSON has no datetime type: a [`Value::DateTime`] is written as
/// `YYYY-MM-DD HH:MM:SS[.fff]` text and reads back as [`Value::Text`].
/// Reading it as `NaiveDateTime` through [`FromValue`](crate::row::FromValue)
/// recovers the original value.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTypeHandler;

#[cfg(feature = "serde")]
mod json {
    use compact_str::CompactString;
    use serde_json::{Map, Number, Value as Json};

    use super::{HandlerResult, JsonTypeHandler, ScalarKind, TypeHandler};
    use crate::value::{Record, Value};

    fn to_json(value: &Value) -> Result<Json, String> {
        Ok(match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::Number(Number::from(*i)),
            Value::Float(f) => Number::from_f64(*f)
                .map(Json::Number)
                .ok_or_else(|| format!("{f} is not representable in JSON"))?,
            Value::Text(s) => Json::String(s.clone()),
            Value::Bytes(_) => return Err("bytes are not representable in JSON".into()),
            Value::DateTime(dt) => Json::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            Value::List(items) => Json::Array(items.iter().map(to_json).collect::<Result<_, _>>()?),
            Value::Record(record) => {
                let mut map = Map::new();
                for (name, value) in &record.fields {
                    map.insert(name.to_string(), to_json(value)?);
                }
                Json::Object(map)
            }
        })
    }

    fn from_json(json: Json) -> Value {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or(Value::Null),
            Json::String(s) => Value::Text(s),
            Json::Array(items) => Value::List(items.into_iter().map(from_json).collect()),
            Json::Object(map) => Value::from(Record {
                entity: None,
                fields: map
                    .into_iter()
                    .map(|(k, v)| (CompactString::from(k), from_json(v)))
                    .collect(),
            }),
        }
    }

    impl TypeHandler for JsonTypeHandler {
        fn store_kind(&self) -> ScalarKind {
            ScalarKind::Text
        }

        fn to_store(&self, value: &Value) -> HandlerResult {
            if value.is_null() {
                return Ok(Value::Null);
            }
            let json = to_json(value)?;
            serde_json::to_string(&json)
                .map(Value::Text)
                .map_err(|e| e.to_string())
        }

        fn from_store(&self, value: &Value) -> HandlerResult {
            match value {
                Value::Null => Ok(Value::Null),
                Value::Text(text) => serde_json::from_str::<Json>(text)
                    .map(from_json)
                    .map_err(|e| e.to_string()),
                other => Err(format!("expected JSON text, found {}", other.type_name())),
            }
        }
    }
}
