use tracing::trace;

use crate::core::{MapError, Result, Value};

use super::{Catalog, Mapped};

impl<T: Mapped> Catalog<T> {
    /// Reads every property of `instance` in catalog order. Dynamic rows
    /// yield their own entries instead.
    pub fn to_row(&self, instance: &T) -> Result<Vec<(String, Value)>> {
        if self.is_dynamic() {
            return self.dynamic_entries(instance);
        }
        self.properties()
            .iter()
            .map(|descriptor| {
                let value = self.read(instance, descriptor.name())?;
                Ok((descriptor.name().to_string(), value))
            })
            .collect()
    }

    /// Values bound to an insert, in the order of
    /// [`ColumnPlan::insert_columns`](super::ColumnPlan::insert_columns).
    pub fn insert_values(&self, instance: &T) -> Result<Vec<Value>> {
        if self.is_dynamic() {
            return Ok(self
                .dynamic_entries(instance)?
                .into_iter()
                .map(|(_, value)| value)
                .collect());
        }
        self.properties()
            .iter()
            .filter(|descriptor| self.is_insert_column(descriptor))
            .map(|descriptor| self.read(instance, descriptor.name()))
            .collect()
    }

    /// Update values followed by the primary key value.
    pub fn update_values(&self, instance: &T) -> Result<Vec<Value>> {
        let mut values = self
            .properties()
            .iter()
            .filter(|descriptor| self.is_update_column(descriptor))
            .map(|descriptor| self.read(instance, descriptor.name()))
            .collect::<Result<Vec<_>>>()?;
        if let Some(primary_key) = self.primary_key() {
            values.push(self.read(instance, primary_key)?);
        }
        Ok(values)
    }

    /// Writes each `(column, value)` pair into `instance`. Stops at the
    /// first failure, leaving earlier columns written.
    pub fn apply_row<I, S>(&self, instance: &mut T, row: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        for (column, value) in row {
            let column = column.as_ref();
            if self.is_dynamic() {
                if !instance.set_dynamic_entry(column, value) {
                    return Err(MapError::NoSuchProperty(column.to_string()));
                }
                continue;
            }
            self.write(instance, column, value)?;
        }
        Ok(())
    }

    /// Builds a fresh instance from a row.
    pub fn materialize<I, S>(&self, row: I) -> Result<T>
    where
        T: Default,
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        trace!(type_name = self.type_name(), "materializing row");
        let mut instance = T::default();
        self.apply_row(&mut instance, row)?;
        Ok(instance)
    }

    fn dynamic_entries(&self, instance: &T) -> Result<Vec<(String, Value)>> {
        instance
            .dynamic_entries()
            .ok_or_else(|| MapError::NoDynamicEntries(self.type_name().to_string()))
    }
}
