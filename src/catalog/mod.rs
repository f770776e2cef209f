//! Property catalogs: one-time discovery of a type's mapped members.

mod access;
mod descriptor;
mod dynamic;
mod generated;
mod mapping;
mod plan;
mod row;

use std::collections::HashMap;

use log::warn;
use tracing::{debug, debug_span, trace};

use crate::config::{MapperConfig, MarkerPolicy};
use crate::core::{MapError, Result};

pub use descriptor::{ColumnMeta, PropertyDescriptor, StorageKind};
pub use generated::GeneratedKeySource;
pub use mapping::{Mapped, Mapping, MemberDecl, short_type_name};
pub use plan::ColumnPlan;

/// Immutable, name-indexed property table for one mapped type.
///
/// Properties keep the position of the first member registered under their
/// name; a later member with the same name replaces the entry in place.
pub struct Catalog<T> {
    type_name: &'static str,
    table: String,
    dynamic: bool,
    properties: Vec<PropertyDescriptor<T>>,
    index: HashMap<String, usize>,
    primary_key: Option<String>,
    generated_column: Option<String>,
}

impl<T: Mapped> Catalog<T> {
    /// Builds the catalog with the default configuration.
    pub fn build() -> Result<Self> {
        Self::build_with(&MapperConfig::default())
    }

    pub fn build_with(config: &MapperConfig) -> Result<Self> {
        let type_name = T::type_name();
        let span = debug_span!("catalog_build", type_name);
        let _guard = span.enter();

        let mut mapping = Mapping::new();
        T::map(&mut mapping);

        let table = mapping
            .table
            .as_deref()
            .map(str::trim)
            .filter(|table| !table.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| config.table_naming.apply(type_name));

        let mut discovery = Discovery::new(type_name, config);

        if mapping.dynamic {
            debug!(table = %table, "dynamic row type, member discovery skipped");
        } else {
            // Field-backed members first so accessor pairs replace them.
            let (fields, accessors): (Vec<_>, Vec<_>) =
                mapping.members.into_iter().partition(MemberDecl::is_field);
            for decl in fields.into_iter().chain(accessors) {
                discovery.discover(decl)?;
            }
        }

        debug!(
            table = %table,
            properties = discovery.properties.len(),
            primary_key = ?discovery.primary_key,
            generated_column = ?discovery.generated_column,
            "catalog built"
        );

        Ok(Self {
            type_name,
            table,
            dynamic: mapping.dynamic,
            properties: discovery.properties,
            index: discovery.index,
            primary_key: discovery.primary_key,
            generated_column: discovery.generated_column,
        })
    }
}

impl<T> Catalog<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    pub fn generated_column(&self) -> Option<&str> {
        self.generated_column.as_deref()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor<T>> {
        self.index.get(name).map(|&idx| &self.properties[idx])
    }

    pub fn property(&self, name: &str) -> Result<&PropertyDescriptor<T>> {
        self.get(name)
            .ok_or_else(|| MapError::NoSuchProperty(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptors in catalog order.
    pub fn properties(&self) -> &[PropertyDescriptor<T>] {
        &self.properties
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(PropertyDescriptor::name)
    }
}

impl<T> std::fmt::Debug for Catalog<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("type_name", &self.type_name)
            .field("table", &self.table)
            .field("dynamic", &self.dynamic)
            .field("properties", &self.properties)
            .field("primary_key", &self.primary_key)
            .field("generated_column", &self.generated_column)
            .finish()
    }
}

#[derive(Clone, Copy)]
enum Marker {
    PrimaryKey,
    Generated,
}

impl Marker {
    fn label(self) -> &'static str {
        match self {
            Self::PrimaryKey => "primary key",
            Self::Generated => "generated value",
        }
    }
}

/// Working state of one catalog build.
struct Discovery<'a, T> {
    type_name: &'static str,
    config: &'a MapperConfig,
    properties: Vec<PropertyDescriptor<T>>,
    index: HashMap<String, usize>,
    primary_key: Option<String>,
    generated_column: Option<String>,
}

impl<'a, T> Discovery<'a, T> {
    fn new(type_name: &'static str, config: &'a MapperConfig) -> Self {
        Self {
            type_name,
            config,
            properties: Vec::new(),
            index: HashMap::new(),
            primary_key: None,
            generated_column: None,
        }
    }

    fn discover(&mut self, decl: MemberDecl<T>) -> Result<()> {
        if decl.transient {
            trace!(member = %decl.member, "transient member skipped");
            return Ok(());
        }
        let descriptor = self.describe(decl)?;
        debug!(
            property = %descriptor.name,
            data_type = %descriptor.data_type,
            storage = ?descriptor.storage,
            "property discovered"
        );
        self.insert(descriptor);
        Ok(())
    }

    fn describe(&mut self, decl: MemberDecl<T>) -> Result<PropertyDescriptor<T>> {
        let name = decl
            .column
            .as_ref()
            .and_then(ColumnMeta::name_override)
            .unwrap_or_else(|| decl.member.trim())
            .to_string();
        if name.is_empty() {
            return Err(MapError::discovery(
                self.type_name,
                "a member was registered with a blank name",
            ));
        }

        if decl.primary_key {
            self.mark(Marker::PrimaryKey, &name)?;
        }
        if decl.generated {
            self.mark(Marker::Generated, &name)?;
        }

        let enum_encoding = if decl.data_type.is_enum() {
            Some(decl.encoding.unwrap_or(self.config.default_enum_encoding))
        } else {
            if let Some(encoding) = decl.encoding {
                warn!(
                    "Enum encoding {} ignored for non-enum property '{}' of {}",
                    encoding, name, self.type_name
                );
            }
            None
        };

        let serializer = match &decl.serializer {
            Some(factory) => Some(factory.instantiate().map_err(|source| {
                MapError::discovery(
                    self.type_name,
                    source.context(format!(
                        "could not instantiate serializer {} for property '{}'",
                        factory.name(),
                        name
                    )),
                )
            })?),
            None => None,
        };

        Ok(PropertyDescriptor {
            name,
            member: decl.member,
            storage: decl.storage,
            data_type: decl.data_type,
            is_primary_key: decl.primary_key,
            is_generated: decl.generated,
            enum_encoding,
            serializer,
            column: decl.column,
        })
    }

    fn mark(&mut self, marker: Marker, name: &str) -> Result<()> {
        let slot = match marker {
            Marker::PrimaryKey => &mut self.primary_key,
            Marker::Generated => &mut self.generated_column,
        };
        if let Some(previous) = slot.as_deref().filter(|previous| *previous != name) {
            match self.config.marker_policy {
                MarkerPolicy::LastWins => warn!(
                    "{} marker on '{}' replaces '{}' for {}",
                    marker.label(),
                    name,
                    previous,
                    self.type_name
                ),
                MarkerPolicy::Reject => {
                    return Err(MapError::discovery(
                        self.type_name,
                        format!(
                            "both '{}' and '{}' are marked as {}",
                            previous,
                            name,
                            marker.label()
                        ),
                    ));
                }
            }
        }
        *slot = Some(name.to_string());
        Ok(())
    }

    fn insert(&mut self, descriptor: PropertyDescriptor<T>) {
        match self.index.get(&descriptor.name) {
            Some(&idx) => {
                trace!(property = %descriptor.name, "replacing earlier member");
                self.properties[idx] = descriptor;
            }
            None => {
                self.index
                    .insert(descriptor.name.clone(), self.properties.len());
                self.properties.push(descriptor);
            }
        }
    }
}
