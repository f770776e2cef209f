use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{MapError, Value};

/// Static description of a mapped enumeration: its name and the canonical
/// string form of every constant, in declaration order.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct EnumDef {
    pub name: &'static str,
    pub constants: &'static [&'static str],
}

impl EnumDef {
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Position of the first constant whose canonical form equals `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.constants.iter().position(|constant| *constant == name)
    }
}

/// How an enum member is represented in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumEncoding {
    Ordinal,
    #[default]
    String,
}

impl FromStr for EnumEncoding {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordinal" => Ok(Self::Ordinal),
            "string" => Ok(Self::String),
            other => Err(MapError::Config(format!("Unknown enum encoding '{}'", other))),
        }
    }
}

impl fmt::Display for EnumEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordinal => write!(f, "ORDINAL"),
            Self::String => write!(f, "STRING"),
        }
    }
}

/// Static type of a mapped member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    BigInt,
    Float,
    Text,
    Boolean,
    Timestamp,
    Date,
    Uuid,
    Json,
    Enum(&'static EnumDef),
}

impl DataType {
    pub fn is_enum(&self) -> bool {
        matches!(self, Self::Enum(_))
    }

    pub fn enum_def(&self) -> Option<&'static EnumDef> {
        match self {
            Self::Enum(def) => Some(def),
            _ => None,
        }
    }

    /// Whether a 32-bit integer can be stored in a member of this type
    /// without conversion.
    pub fn accepts_i32(&self) -> bool {
        matches!(self, Self::Integer)
    }

    pub fn is_compatible(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::Integer, Value::Integer(_)) => true,
            (Self::BigInt, Value::BigInt(_)) => true,
            (Self::Float, Value::Float(_)) => true,
            (Self::Text, Value::Text(_)) => true,
            (Self::Boolean, Value::Boolean(_)) => true,
            (Self::Timestamp, Value::Timestamp(_)) => true,
            (Self::Date, Value::Date(_)) => true,
            (Self::Uuid, Value::Uuid(_)) => true,
            (Self::Json, Value::Json(_)) => true,
            (Self::Enum(def), Value::Enum(constant)) => constant.def() == *def,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "INTEGER"),
            Self::BigInt => write!(f, "BIGINT"),
            Self::Float => write!(f, "FLOAT"),
            Self::Text => write!(f, "TEXT"),
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Date => write!(f, "DATE"),
            Self::Uuid => write!(f, "UUID"),
            Self::Json => write!(f, "JSON"),
            Self::Enum(def) => write!(f, "ENUM {}", def.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static COLOR: EnumDef = EnumDef {
        name: "Color",
        constants: &["RED", "GREEN"],
    };

    #[test]
    fn test_enum_encoding_parse() {
        assert_eq!("ordinal".parse::<EnumEncoding>().unwrap(), EnumEncoding::Ordinal);
        assert_eq!(" STRING ".parse::<EnumEncoding>().unwrap(), EnumEncoding::String);
        assert!("roman".parse::<EnumEncoding>().is_err());
        assert_eq!(EnumEncoding::default(), EnumEncoding::String);
    }

    #[test]
    fn test_type_compatibility() {
        assert!(DataType::Integer.is_compatible(&Value::Integer(1)));
        assert!(!DataType::Integer.is_compatible(&Value::BigInt(1)));
        assert!(DataType::BigInt.is_compatible(&Value::Null));
        assert!(DataType::Enum(&COLOR).is_enum());
        assert_eq!(COLOR.position("GREEN"), Some(1));
        assert_eq!(DataType::Enum(&COLOR).to_string(), "ENUM Color");
    }
}
