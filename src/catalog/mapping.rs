use std::sync::Arc;

use crate::core::{ColumnType, DataType, EnumEncoding, Value};
use crate::serialize::{DbSerializer, SerializerFactory};

use super::descriptor::{ColumnMeta, ReadFn, StorageKind, WriteFn};

/// A type whose instances map to table rows.
///
/// `map` registers the persisted members in order; catalog discovery turns
/// the registration into a [`Catalog`](super::Catalog). Usually derived with
/// `#[derive(Mapped)]`.
pub trait Mapped: Sized + 'static {
    fn map(mapping: &mut Mapping<Self>);

    /// Identifier used as the default table name.
    fn type_name() -> &'static str {
        short_type_name::<Self>()
    }

    /// Entries of a dynamic key-value row. Only consulted for types that
    /// call [`Mapping::dynamic`].
    fn dynamic_entries(&self) -> Option<Vec<(String, Value)>> {
        None
    }

    /// Stores one entry of a dynamic key-value row. Returns `false` when the
    /// type cannot hold dynamic entries.
    fn set_dynamic_entry(&mut self, _column: &str, _value: Value) -> bool {
        false
    }
}

/// Last path segment of the Rust type name, without generic arguments.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Ordered registration of a type's members and type-level metadata.
pub struct Mapping<T> {
    pub(crate) table: Option<String>,
    pub(crate) dynamic: bool,
    pub(crate) members: Vec<MemberDecl<T>>,
}

impl<T: 'static> Mapping<T> {
    pub(crate) fn new() -> Self {
        Self {
            table: None,
            dynamic: false,
            members: Vec::new(),
        }
    }

    /// Table-name override.
    pub fn table(&mut self, name: impl Into<String>) -> &mut Self {
        self.table = Some(name.into());
        self
    }

    /// Marks the type as a dynamic key-value container. Its catalog stays
    /// empty whatever members are registered.
    pub fn dynamic(&mut self) -> &mut Self {
        self.dynamic = true;
        self
    }

    /// Registers a directly stored member.
    pub fn field<V, G, M>(&mut self, name: impl Into<String>, get: G, get_mut: M) -> &mut MemberDecl<T>
    where
        V: ColumnType,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        let read: ReadFn<T> = Arc::new(move |row: &T| -> anyhow::Result<Value> { get(row).to_value() });
        let write: WriteFn<T> = Arc::new(move |row: &mut T, value: Value| -> Result<(), Value> {
            *get_mut(row) = V::from_value(value)?;
            Ok(())
        });
        self.push(MemberDecl::new(
            name.into(),
            V::data_type(),
            StorageKind::FieldBacked { read, write },
        ))
    }

    /// Registers a getter/setter pair.
    pub fn property<V, G, S>(&mut self, name: impl Into<String>, getter: G, setter: S) -> &mut MemberDecl<T>
    where
        V: ColumnType,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let read = Self::getter(getter);
        let write: WriteFn<T> = Arc::new(move |row: &mut T, value: Value| -> Result<(), Value> {
            setter(row, V::from_value(value)?);
            Ok(())
        });
        self.push(MemberDecl::new(
            name.into(),
            V::data_type(),
            StorageKind::AccessorBacked {
                read,
                write: Some(write),
            },
        ))
    }

    /// Registers a getter without a setter.
    pub fn read_only_property<V, G>(&mut self, name: impl Into<String>, getter: G) -> &mut MemberDecl<T>
    where
        V: ColumnType,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        let read = Self::getter(getter);
        self.push(MemberDecl::new(
            name.into(),
            V::data_type(),
            StorageKind::AccessorBacked { read, write: None },
        ))
    }

    fn getter<V, G>(getter: G) -> ReadFn<T>
    where
        V: ColumnType,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        Arc::new(move |row: &T| -> anyhow::Result<Value> { getter(row).to_value() })
    }

    fn push(&mut self, decl: MemberDecl<T>) -> &mut MemberDecl<T> {
        let index = self.members.len();
        self.members.push(decl);
        &mut self.members[index]
    }
}

/// One registered member plus its markers.
pub struct MemberDecl<T> {
    pub(crate) member: String,
    pub(crate) data_type: DataType,
    pub(crate) storage: StorageKind<T>,
    pub(crate) column: Option<ColumnMeta>,
    pub(crate) primary_key: bool,
    pub(crate) generated: bool,
    pub(crate) transient: bool,
    pub(crate) encoding: Option<EnumEncoding>,
    pub(crate) serializer: Option<SerializerFactory>,
}

impl<T> MemberDecl<T> {
    fn new(member: String, data_type: DataType, storage: StorageKind<T>) -> Self {
        Self {
            member,
            data_type,
            storage,
            column: None,
            primary_key: false,
            generated: false,
            transient: false,
            encoding: None,
            serializer: None,
        }
    }

    /// Column-name override. Blank names are ignored at discovery.
    pub fn column(&mut self, name: impl Into<String>) -> &mut Self {
        self.column.get_or_insert_with(ColumnMeta::default).name = Some(name.into());
        self
    }

    /// Full column metadata, replacing any earlier `column` call.
    pub fn column_meta(&mut self, meta: ColumnMeta) -> &mut Self {
        self.column = Some(meta);
        self
    }

    pub fn id(&mut self) -> &mut Self {
        self.primary_key = true;
        self
    }

    pub fn generated(&mut self) -> &mut Self {
        self.generated = true;
        self
    }

    /// Excludes the member from the catalog.
    pub fn transient(&mut self) -> &mut Self {
        self.transient = true;
        self
    }

    pub fn enumerated(&mut self, encoding: EnumEncoding) -> &mut Self {
        self.encoding = Some(encoding);
        self
    }

    /// Attaches a serializer built with `S::default()` at discovery.
    pub fn serializer<S: DbSerializer + Default + 'static>(&mut self) -> &mut Self {
        self.serializer = Some(SerializerFactory::of::<S>());
        self
    }

    pub fn serializer_with(&mut self, factory: SerializerFactory) -> &mut Self {
        self.serializer = Some(factory);
        self
    }

    pub(crate) fn is_field(&self) -> bool {
        self.storage.is_field_backed()
    }
}
