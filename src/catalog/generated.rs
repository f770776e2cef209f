use crate::codec::numeric;
use crate::core::{DataType, MapError, Result, Value};

use super::Catalog;

/// Values generated by the store for an inserted row, e.g. the generated
/// keys returned by a statement. Only the first value is used.
pub trait GeneratedKeySource {
    fn next_key(&mut self) -> Option<Value>;
}

impl<I> GeneratedKeySource for I
where
    I: Iterator<Item = Value>,
{
    fn next_key(&mut self) -> Option<Value> {
        self.next()
    }
}

impl<T> Catalog<T> {
    /// Writes the first generated key into the generated property of
    /// `instance`, sized to the property's integer width.
    pub fn populate_generated_key<K>(&self, keys: &mut K, instance: &mut T) -> Result<()>
    where
        K: GeneratedKeySource + ?Sized,
    {
        let column = self
            .generated_column()
            .ok_or_else(|| MapError::MissingGeneratedColumn(self.type_name().to_string()))?;

        let first = keys
            .next_key()
            .filter(|key| !key.is_null())
            .ok_or_else(|| MapError::NoGeneratedKey(self.type_name().to_string()))?;

        let descriptor = self
            .property(column)
            .map_err(|source| wrap_generated(column, source))?;
        let key = coerce_key(column, descriptor.data_type(), first)
            .map_err(|source| wrap_generated(column, source))?;

        tracing::trace!(property = column, key = %key, "populating generated key");
        self.write(instance, column, key)
            .map_err(|source| wrap_generated(column, source))
    }
}

fn wrap_generated(property: &str, source: MapError) -> MapError {
    MapError::GeneratedKey {
        property: property.to_string(),
        source: Box::new(source),
    }
}

fn coerce_key(property: &str, data_type: &DataType, key: Value) -> Result<Value> {
    let wide = match &key {
        Value::Integer(_) | Value::BigInt(_) => key.as_i64(),
        Value::Text(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| MapError::WriteFailed {
        property: property.to_string(),
        target_type: data_type.to_string(),
        value: format!("{} ({})", key, key.type_name()),
    })?;

    if data_type.accepts_i32() {
        numeric::narrow(property, wide).map(Value::Integer)
    } else {
        Ok(Value::BigInt(wide))
    }
}
