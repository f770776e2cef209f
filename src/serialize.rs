use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, bail};

use crate::core::{DataType, Value};

/// Custom conversion for one property, used instead of the built-in enum and
/// numeric rules.
pub trait DbSerializer: Send + Sync {
    /// Raw member value to its stored form.
    fn serialize(&self, value: &Value) -> anyhow::Result<Value>;

    /// Stored form back to a raw value acceptable by a member of `data_type`.
    fn deserialize(&self, stored: &Value, data_type: &DataType) -> anyhow::Result<Value>;
}

/// Deferred construction of a serializer, invoked once during catalog build.
#[derive(Clone)]
pub struct SerializerFactory {
    name: &'static str,
    create: Arc<dyn Fn() -> anyhow::Result<Arc<dyn DbSerializer>> + Send + Sync>,
}

impl SerializerFactory {
    pub fn of<S: DbSerializer + Default + 'static>() -> Self {
        Self::from_fn(std::any::type_name::<S>(), || Ok(S::default()))
    }

    pub fn from_fn<S, F>(name: &'static str, create: F) -> Self
    where
        S: DbSerializer + 'static,
        F: Fn() -> anyhow::Result<S> + Send + Sync + 'static,
    {
        Self {
            name,
            create: Arc::new(move || {
                let serializer: Arc<dyn DbSerializer> = Arc::new(create()?);
                Ok(serializer)
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn instantiate(&self) -> anyhow::Result<Arc<dyn DbSerializer>> {
        (self.create)()
    }
}

impl fmt::Debug for SerializerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerFactory")
            .field("name", &self.name)
            .finish()
    }
}

/// Stores JSON members as compact JSON text.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonTextSerializer;

impl DbSerializer for JsonTextSerializer {
    fn serialize(&self, value: &Value) -> anyhow::Result<Value> {
        match value {
            Value::Json(json) => Ok(Value::Text(serde_json::to_string(json)?)),
            other => Err(anyhow!(
                "JSON text serializer cannot store {} values",
                other.type_name()
            )),
        }
    }

    fn deserialize(&self, stored: &Value, data_type: &DataType) -> anyhow::Result<Value> {
        if *data_type != DataType::Json {
            bail!("JSON text serializer cannot produce {} members", data_type);
        }
        match stored {
            Value::Text(text) => Ok(Value::Json(serde_json::from_str(text)?)),
            Value::Json(json) => Ok(Value::Json(json.clone())),
            other => Err(anyhow!(
                "JSON text serializer cannot read {} values",
                other.type_name()
            )),
        }
    }
}
