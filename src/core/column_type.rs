use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use super::{DataType, Value};

/// A Rust type that can back a mapped member.
///
/// `to_value` produces the raw form handed to outbound transforms and
/// `from_value` accepts the value left after inbound transforms. A value of
/// the wrong shape is handed back so the mutator can report it.
pub trait ColumnType: Sized + 'static {
    fn data_type() -> DataType;

    fn to_value(&self) -> anyhow::Result<Value>;

    fn from_value(value: Value) -> Result<Self, Value>;
}

impl ColumnType for i32 {
    fn data_type() -> DataType {
        DataType::Integer
    }

    fn to_value(&self) -> anyhow::Result<Value> {
        Ok(Value::Integer(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Integer(i) => Ok(i),
            other => Err(other),
        }
    }
}

impl ColumnType for i64 {
    fn data_type() -> DataType {
        DataType::BigInt
    }

    fn to_value(&self) -> anyhow::Result<Value> {
        Ok(Value::BigInt(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::BigInt(i) => Ok(i),
            other => Err(other),
        }
    }
}

impl ColumnType for f64 {
    fn data_type() -> DataType {
        DataType::Float
    }

    fn to_value(&self) -> anyhow::Result<Value> {
        Ok(Value::Float(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float(f) => Ok(f),
            other => Err(other),
        }
    }
}

impl ColumnType for bool {
    fn data_type() -> DataType {
        DataType::Boolean
    }

    fn to_value(&self) -> anyhow::Result<Value> {
        Ok(Value::Boolean(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl ColumnType for String {
    fn data_type() -> DataType {
        DataType::Text
    }

    fn to_value(&self) -> anyhow::Result<Value> {
        Ok(Value::Text(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl ColumnType for Uuid {
    fn data_type() -> DataType {
        DataType::Uuid
    }

    fn to_value(&self) -> anyhow::Result<Value> {
        Ok(Value::Uuid(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Uuid(u) => Ok(u),
            Value::Text(s) => Uuid::parse_str(&s).map_err(|_| Value::Text(s)),
            other => Err(other),
        }
    }
}

impl ColumnType for DateTime<Utc> {
    fn data_type() -> DataType {
        DataType::Timestamp
    }

    fn to_value(&self) -> anyhow::Result<Value> {
        Ok(Value::Timestamp(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Timestamp(t) => Ok(t),
            Value::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|_| Value::Text(s)),
            other => Err(other),
        }
    }
}

impl ColumnType for NaiveDate {
    fn data_type() -> DataType {
        DataType::Date
    }

    fn to_value(&self) -> anyhow::Result<Value> {
        Ok(Value::Date(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Date(d) => Ok(d),
            Value::Text(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| Value::Text(s)),
            other => Err(other),
        }
    }
}

impl ColumnType for serde_json::Value {
    fn data_type() -> DataType {
        DataType::Json
    }

    fn to_value(&self) -> anyhow::Result<Value> {
        Ok(Value::Json(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Json(j) => Ok(j),
            other => Err(other),
        }
    }
}

impl<T: ColumnType> ColumnType for Option<T> {
    fn data_type() -> DataType {
        T::data_type()
    }

    fn to_value(&self) -> anyhow::Result<Value> {
        match self {
            Some(value) => value.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Wraps any serde type so it can back a member; its raw form is
/// [`Value::Json`]. Pair it with a serializer to store it as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> ColumnType for Json<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn data_type() -> DataType {
        DataType::Json
    }

    fn to_value(&self) -> anyhow::Result<Value> {
        Ok(Value::Json(serde_json::to_value(&self.0)?))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Json(j) => serde_json::from_value(j.clone())
                .map(Json)
                .map_err(|_| Value::Json(j)),
            other => Err(other),
        }
    }
}
