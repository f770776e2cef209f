use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{DataType, EnumEncoding, MapError, Result, Value};
use crate::serialize::DbSerializer;

pub(crate) type ReadFn<T> = Arc<dyn Fn(&T) -> anyhow::Result<Value> + Send + Sync>;
pub(crate) type WriteFn<T> = Arc<dyn Fn(&mut T, Value) -> std::result::Result<(), Value> + Send + Sync>;

/// How a property reaches its member.
pub enum StorageKind<T> {
    /// Direct member storage; always writable.
    FieldBacked { read: ReadFn<T>, write: WriteFn<T> },
    /// Getter plus optional setter. No setter means read-only.
    AccessorBacked {
        read: ReadFn<T>,
        write: Option<WriteFn<T>>,
    },
}

impl<T> StorageKind<T> {
    pub fn is_field_backed(&self) -> bool {
        matches!(self, Self::FieldBacked { .. })
    }

    pub fn is_writable(&self) -> bool {
        match self {
            Self::FieldBacked { .. } => true,
            Self::AccessorBacked { write, .. } => write.is_some(),
        }
    }

    pub(crate) fn reader(&self) -> &ReadFn<T> {
        match self {
            Self::FieldBacked { read, .. } | Self::AccessorBacked { read, .. } => read,
        }
    }

    pub(crate) fn writer(&self) -> Option<&WriteFn<T>> {
        match self {
            Self::FieldBacked { write, .. } => Some(write),
            Self::AccessorBacked { write, .. } => write.as_ref(),
        }
    }
}

impl<T> fmt::Debug for StorageKind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldBacked { .. } => write!(f, "FieldBacked"),
            Self::AccessorBacked { write, .. } => f
                .debug_struct("AccessorBacked")
                .field("writable", &write.is_some())
                .finish(),
        }
    }
}

/// Column metadata kept for statement generation. The mapping core only
/// interprets `name`; the column plan also honours `insertable` and
/// `updatable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: Option<String>,
    pub nullable: bool,
    pub unique: bool,
    pub insertable: bool,
    pub updatable: bool,
    pub length: Option<u32>,
    pub definition: Option<String>,
}

impl Default for ColumnMeta {
    fn default() -> Self {
        Self {
            name: None,
            nullable: true,
            unique: false,
            insertable: true,
            updatable: true,
            length: None,
            definition: None,
        }
    }
}

impl ColumnMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn insertable(mut self, insertable: bool) -> Self {
        self.insertable = insertable;
        self
    }

    pub fn updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    /// The name override, trimmed, if it is not blank.
    pub fn name_override(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Immutable metadata for one mapped member.
pub struct PropertyDescriptor<T> {
    pub(crate) name: String,
    pub(crate) member: String,
    pub(crate) storage: StorageKind<T>,
    pub(crate) data_type: DataType,
    pub(crate) is_primary_key: bool,
    pub(crate) is_generated: bool,
    pub(crate) enum_encoding: Option<EnumEncoding>,
    pub(crate) serializer: Option<Arc<dyn DbSerializer>>,
    pub(crate) column: Option<ColumnMeta>,
}

impl<T> PropertyDescriptor<T> {
    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member name as registered, before any column override.
    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn storage(&self) -> &StorageKind<T> {
        &self.storage
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }

    pub fn is_generated(&self) -> bool {
        self.is_generated
    }

    pub fn is_enum(&self) -> bool {
        self.enum_encoding.is_some()
    }

    pub fn enum_encoding(&self) -> Option<EnumEncoding> {
        self.enum_encoding
    }

    pub fn serializer(&self) -> Option<&Arc<dyn DbSerializer>> {
        self.serializer.as_ref()
    }

    pub fn column(&self) -> Option<&ColumnMeta> {
        self.column.as_ref()
    }

    pub fn is_read_only(&self) -> bool {
        !self.storage.is_writable()
    }

    pub(crate) fn read_raw(&self, instance: &T) -> Result<Value> {
        let read = self.storage.reader();
        (**read)(instance).map_err(|source| MapError::serialization(&self.name, source))
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("member", &self.member)
            .field("storage", &self.storage)
            .field("data_type", &self.data_type)
            .field("is_primary_key", &self.is_primary_key)
            .field("is_generated", &self.is_generated)
            .field("enum_encoding", &self.enum_encoding)
            .field("serializer", &self.serializer.is_some())
            .field("column", &self.column)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_meta_name_override() {
        assert_eq!(ColumnMeta::named("  user_name ").name_override(), Some("user_name"));
        assert_eq!(ColumnMeta::named("   ").name_override(), None);
        assert_eq!(ColumnMeta::default().name_override(), None);
    }

    #[test]
    fn test_column_meta_builder() {
        let meta = ColumnMeta::named("email")
            .not_null()
            .unique()
            .length(320)
            .updatable(false);

        assert!(!meta.nullable);
        assert!(meta.unique);
        assert!(meta.insertable);
        assert!(!meta.updatable);
        assert_eq!(meta.length, Some(320));
    }

    #[test]
    fn test_storage_kind_writability() {
        let read: ReadFn<i32> =
            Arc::new(|n: &i32| -> anyhow::Result<Value> { Ok(Value::Integer(*n)) });
        let accessor = StorageKind::AccessorBacked {
            read: read.clone(),
            write: None,
        };
        assert!(!accessor.is_writable());
        assert!(accessor.writer().is_none());

        let write: WriteFn<i32> =
            Arc::new(|_: &mut i32, _: Value| -> std::result::Result<(), Value> { Ok(()) });
        let field = StorageKind::FieldBacked { read, write };
        assert!(field.is_writable());
        assert!(field.is_field_backed());
    }
}
