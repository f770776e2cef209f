use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{EnumEncoding, MapError, Result};

pub const ENV_TABLE_NAMING: &str = "ROWMAP_TABLE_NAMING";
pub const ENV_MARKER_POLICY: &str = "ROWMAP_MARKER_POLICY";
pub const ENV_ENUM_ENCODING: &str = "ROWMAP_ENUM_ENCODING";

/// How a table name is derived from the type identifier when no explicit
/// table name is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableNaming {
    /// The identifier, verbatim.
    #[default]
    TypeName,
    Lowercase,
    /// Lowercased, with every non-alphanumeric character replaced by `_`.
    Sanitized,
}

impl TableNaming {
    pub fn apply(&self, type_name: &str) -> String {
        match self {
            Self::TypeName => type_name.to_string(),
            Self::Lowercase => type_name.to_lowercase(),
            Self::Sanitized => sanitize_sql_identifier(type_name),
        }
    }
}

impl FromStr for TableNaming {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "type_name" | "typename" => Ok(Self::TypeName),
            "lowercase" => Ok(Self::Lowercase),
            "sanitized" => Ok(Self::Sanitized),
            other => Err(MapError::Config(format!("Unknown table naming '{}'", other))),
        }
    }
}

/// What discovery does when more than one member carries the primary-key or
/// generated marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPolicy {
    /// The last discovered member keeps the marker.
    #[default]
    LastWins,
    /// Catalog construction fails.
    Reject,
}

impl FromStr for MarkerPolicy {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last_wins" | "lastwins" => Ok(Self::LastWins),
            "reject" => Ok(Self::Reject),
            other => Err(MapError::Config(format!("Unknown marker policy '{}'", other))),
        }
    }
}

/// Catalog discovery configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Table naming for types without an explicit table name
    pub table_naming: TableNaming,

    /// Handling of duplicate primary-key / generated markers
    pub marker_policy: MarkerPolicy,

    /// Encoding for enum members that do not request one
    pub default_enum_encoding: EnumEncoding,
}

impl MapperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set table naming
    pub fn table_naming(mut self, naming: TableNaming) -> Self {
        self.table_naming = naming;
        self
    }

    /// Set marker policy
    pub fn marker_policy(mut self, policy: MarkerPolicy) -> Self {
        self.marker_policy = policy;
        self
    }

    /// Set default enum encoding
    pub fn default_enum_encoding(mut self, encoding: EnumEncoding) -> Self {
        self.default_enum_encoding = encoding;
        self
    }

    /// Read overrides from `ROWMAP_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a key lookup, starting from defaults. Unset keys keep the
    /// default; unparsable values are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_TABLE_NAMING) {
            config.table_naming = raw.parse()?;
        }
        if let Some(raw) = lookup(ENV_MARKER_POLICY) {
            config.marker_policy = raw.parse()?;
        }
        if let Some(raw) = lookup(ENV_ENUM_ENCODING) {
            config.default_enum_encoding = raw.parse()?;
        }
        Ok(config)
    }

    /// Parse from a JSON document, e.g. `{"marker_policy": "reject"}`
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MapError::Config(e.to_string()))
    }
}

/// Converts non-alphanumeric characters to underscores and lowercases the
/// result.
pub fn sanitize_sql_identifier(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
        } else {
            sanitized.push('_');
        }
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = MapperConfig::new();
        assert_eq!(config.table_naming, TableNaming::TypeName);
        assert_eq!(config.marker_policy, MarkerPolicy::LastWins);
        assert_eq!(config.default_enum_encoding, EnumEncoding::String);
    }

    #[test]
    fn test_builder() {
        let config = MapperConfig::new()
            .table_naming(TableNaming::Sanitized)
            .marker_policy(MarkerPolicy::Reject)
            .default_enum_encoding(EnumEncoding::Ordinal);

        assert_eq!(config.table_naming.apply("OrderLine"), "orderline");
        assert_eq!(config.marker_policy, MarkerPolicy::Reject);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_TABLE_NAMING, "lowercase"),
            (ENV_ENUM_ENCODING, "ORDINAL"),
        ]);
        let config = MapperConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.table_naming, TableNaming::Lowercase);
        assert_eq!(config.marker_policy, MarkerPolicy::LastWins);
        assert_eq!(config.default_enum_encoding, EnumEncoding::Ordinal);
    }

    #[test]
    fn test_from_lookup_rejects_unknown_values() {
        let err = MapperConfig::from_lookup(|key| {
            (key == ENV_MARKER_POLICY).then(|| "first_wins".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
    }

    #[test]
    fn test_from_json() {
        let config = MapperConfig::from_json(r#"{"marker_policy": "reject"}"#).unwrap();
        assert_eq!(config.marker_policy, MarkerPolicy::Reject);
        assert_eq!(config.table_naming, TableNaming::TypeName);
        assert!(MapperConfig::from_json("{").is_err());
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_sql_identifier("Order-Line 2"), "order_line_2");
        assert_eq!(TableNaming::TypeName.apply("Order"), "Order");
    }
}
