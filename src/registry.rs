use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;
use log::warn;
use tracing::debug;

use crate::catalog::{Catalog, Mapped};
use crate::config::MapperConfig;
use crate::core::{MapError, Result};

type SharedCatalog = Arc<dyn Any + Send + Sync>;

// Global registry, configured from the environment on first use
lazy_static! {
    static ref GLOBAL_REGISTRY: Arc<CatalogRegistry> = Arc::new(CatalogRegistry::new(
        MapperConfig::from_env().unwrap_or_else(|err| {
            warn!("Ignoring mapper environment configuration: {}", err);
            MapperConfig::default()
        })
    ));
}

/// Cache of built catalogs, one per mapped type.
///
/// Catalogs are built once and shared; entries are never invalidated except
/// by [`CatalogRegistry::clear`].
pub struct CatalogRegistry {
    config: MapperConfig,
    catalogs: RwLock<HashMap<TypeId, SharedCatalog>>,
}

impl CatalogRegistry {
    /// Get the process-wide registry
    pub fn global() -> &'static Arc<CatalogRegistry> {
        &GLOBAL_REGISTRY
    }

    pub fn new(config: MapperConfig) -> Self {
        Self {
            config,
            catalogs: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Returns the catalog of `T`, building it on first use.
    ///
    /// The build runs without holding the lock. When two callers race, the
    /// first inserted catalog is kept and returned to both.
    pub fn catalog<T: Mapped>(&self) -> Result<Arc<Catalog<T>>> {
        let key = TypeId::of::<T>();
        if let Some(entry) = self.catalogs.read()?.get(&key).cloned() {
            return Self::downcast(entry);
        }

        debug!(type_name = T::type_name(), "catalog cache miss");
        let built: SharedCatalog = Arc::new(Catalog::<T>::build_with(&self.config)?);

        let entry = self
            .catalogs
            .write()?
            .entry(key)
            .or_insert(built)
            .clone();
        Self::downcast(entry)
    }

    pub fn contains<T: Mapped>(&self) -> Result<bool> {
        Ok(self.catalogs.read()?.contains_key(&TypeId::of::<T>()))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.catalogs.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.catalogs.read()?.is_empty())
    }

    /// Drops every cached catalog. Catalogs already handed out stay valid.
    pub fn clear(&self) -> Result<()> {
        self.catalogs.write()?.clear();
        Ok(())
    }

    fn downcast<T: Mapped>(entry: SharedCatalog) -> Result<Arc<Catalog<T>>> {
        entry.downcast::<Catalog<T>>().map_err(|_| {
            MapError::discovery(T::type_name(), "cached catalog has an unexpected type")
        })
    }
}

impl Default for CatalogRegistry {
    fn default() -> Self {
        Self::new(MapperConfig::default())
    }
}

/// Catalog of `T` from the global registry.
pub fn catalog_for<T: Mapped>() -> Result<Arc<Catalog<T>>> {
    CatalogRegistry::global().catalog::<T>()
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::catalog::Mapping;
    use crate::config::TableNaming;

    #[derive(Default)]
    struct Widget {
        id: i64,
    }

    impl Mapped for Widget {
        fn map(m: &mut Mapping<Self>) {
            m.field("id", |w: &Widget| &w.id, |w: &mut Widget| &mut w.id).id();
        }
    }

    #[derive(Default)]
    struct Gadget {
        name: String,
    }

    impl Mapped for Gadget {
        fn map(m: &mut Mapping<Self>) {
            m.field("name", |g: &Gadget| &g.name, |g: &mut Gadget| &mut g.name);
        }
    }

    #[test]
    fn test_catalog_is_built_once() {
        let registry = CatalogRegistry::default();
        assert!(registry.is_empty().unwrap());

        let first = registry.catalog::<Widget>().unwrap();
        let second = registry.catalog::<Widget>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        registry.catalog::<Gadget>().unwrap();
        assert_eq!(registry.len().unwrap(), 2);
        assert!(registry.contains::<Gadget>().unwrap());
    }

    #[test]
    fn test_registry_uses_its_config() {
        let registry =
            CatalogRegistry::new(MapperConfig::new().table_naming(TableNaming::Lowercase));
        assert_eq!(registry.catalog::<Widget>().unwrap().table(), "widget");
    }

    #[test]
    fn test_clear_forces_rebuild() {
        let registry = CatalogRegistry::default();
        let before = registry.catalog::<Widget>().unwrap();
        registry.clear().unwrap();
        assert!(!registry.contains::<Widget>().unwrap());

        let after = registry.catalog::<Widget>().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.len(), 1);
    }

    #[test]
    fn test_concurrent_lookups_share_one_catalog() {
        let registry = Arc::new(CatalogRegistry::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.catalog::<Gadget>().unwrap())
            })
            .collect();

        let catalogs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for catalog in &catalogs[1..] {
            assert!(Arc::ptr_eq(&catalogs[0], catalog));
        }
    }
}
