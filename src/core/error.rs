use thiserror::Error;

/// Boxed underlying cause carried by wrapping variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Failed to build catalog for '{type_name}': {source}")]
    Discovery {
        type_name: String,
        #[source]
        source: BoxError,
    },

    #[error("No such property: {0}")]
    NoSuchProperty(String),

    #[error("Property '{0}' is read-only")]
    ReadOnlyProperty(String),

    #[error("Provided value {value} for property '{property}' has overflown a 32-bit integer")]
    Overflow { property: String, value: i64 },

    #[error("Provided value {value} for property '{property}' has underflown a 32-bit integer")]
    Underflow { property: String, value: i64 },

    #[error("Invalid ordinal number {ordinal} for enum {enum_name}")]
    InvalidOrdinal { enum_name: &'static str, ordinal: i64 },

    #[error("Enum value does not exist. enum: {enum_name}, value: {value}")]
    UnknownEnumValue { enum_name: &'static str, value: String },

    #[error("Enum {enum_name} stored by ordinal expects an integer, got {found}")]
    EnumTypeMismatch {
        enum_name: &'static str,
        found: &'static str,
    },

    #[error("Serializer failed for property '{property}': {source}")]
    Serialization {
        property: String,
        #[source]
        source: BoxError,
    },

    #[error("Could not write value into property '{property}' of type {target_type}. value: {value}")]
    WriteFailed {
        property: String,
        target_type: String,
        value: String,
    },

    #[error("Type '{0}' declares no generated column")]
    MissingGeneratedColumn(String),

    #[error("No generated key was returned for type '{0}'")]
    NoGeneratedKey(String),

    #[error("Could not populate generated key '{property}': {source}")]
    GeneratedKey {
        property: String,
        #[source]
        source: Box<MapError>,
    },

    #[error("Dynamic type '{0}' does not provide its row entries")]
    NoDynamicEntries(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MapError>;

impl MapError {
    pub(crate) fn discovery(type_name: &str, source: impl Into<BoxError>) -> Self {
        Self::Discovery {
            type_name: type_name.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn serialization(property: &str, source: anyhow::Error) -> Self {
        Self::Serialization {
            property: property.to_string(),
            source: source.into(),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for MapError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
