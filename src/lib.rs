// ============================================================================
// rowmap Library
// ============================================================================
//
// Maps plain Rust types to table rows: a per-type property catalog built once
// from an explicit registration, value access in both directions, enum and
// integer-width conversion, custom serializers and generated keys.

extern crate self as rowmap;

pub mod core;
pub mod codec;
pub mod serialize;
pub mod config;
pub mod catalog;
pub mod registry;

// Re-export main types for convenience
pub use self::core::{ColumnType, DataType, EnumConstant, EnumDef, EnumEncoding, Json, MapError, Result, Value};
pub use codec::MappedEnum;
pub use serialize::{DbSerializer, JsonTextSerializer, SerializerFactory};
pub use config::{MapperConfig, MarkerPolicy, TableNaming};
pub use catalog::{
    Catalog, ColumnMeta, ColumnPlan, GeneratedKeySource, Mapped, Mapping, MemberDecl,
    PropertyDescriptor, StorageKind,
};
pub use registry::{CatalogRegistry, catalog_for};

// Derive macros share their names with the traits they implement
pub use rowmap_derive::{Mapped, MappedEnum};

#[doc(hidden)]
pub mod __private {
    pub use anyhow;
}
