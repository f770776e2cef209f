//! Key-value maps as dynamic rows.
//!
//! A map has no members to discover; its catalog is empty and row helpers
//! move entries in and out of the map directly.

use std::collections::{BTreeMap, HashMap};

use crate::core::Value;

use super::{Mapped, Mapping};

impl Mapped for BTreeMap<String, Value> {
    fn map(mapping: &mut Mapping<Self>) {
        mapping.dynamic();
    }

    fn type_name() -> &'static str {
        "BTreeMap"
    }

    fn dynamic_entries(&self) -> Option<Vec<(String, Value)>> {
        Some(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn set_dynamic_entry(&mut self, column: &str, value: Value) -> bool {
        self.insert(column.to_string(), value);
        true
    }
}

impl Mapped for HashMap<String, Value> {
    fn map(mapping: &mut Mapping<Self>) {
        mapping.dynamic();
    }

    fn type_name() -> &'static str {
        "HashMap"
    }

    // Iteration order of a HashMap is unspecified, so entries are sorted.
    fn dynamic_entries(&self) -> Option<Vec<(String, Value)>> {
        let mut entries: Vec<_> = self.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Some(entries)
    }

    fn set_dynamic_entry(&mut self, column: &str, value: Value) -> bool {
        self.insert(column.to_string(), value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::core::MapError;

    #[test]
    fn test_map_catalog_is_empty_and_dynamic() {
        let catalog = Catalog::<BTreeMap<String, Value>>::build().unwrap();
        assert!(catalog.is_dynamic());
        assert!(catalog.is_empty());
        assert_eq!(catalog.primary_key(), None);
        assert_eq!(catalog.table(), "BTreeMap");
        assert_eq!(catalog.column_plan().select_list(), "*");
    }

    #[test]
    fn test_map_rows_pass_through() {
        let catalog = Catalog::<HashMap<String, Value>>::build().unwrap();
        let row = catalog
            .materialize([("b", Value::Integer(2)), ("a", Value::Text("x".into()))])
            .unwrap();

        assert_eq!(row.get("b"), Some(&Value::Integer(2)));
        assert_eq!(
            catalog.to_row(&row).unwrap(),
            vec![
                ("a".to_string(), Value::Text("x".into())),
                ("b".to_string(), Value::Integer(2)),
            ]
        );
        assert_eq!(
            catalog.insert_values(&row).unwrap(),
            vec![Value::Text("x".into()), Value::Integer(2)]
        );
    }

    #[test]
    fn test_property_access_on_map_fails() {
        let catalog = Catalog::<BTreeMap<String, Value>>::build().unwrap();
        let mut row = BTreeMap::new();
        row.insert("a".to_string(), Value::Integer(1));

        assert!(matches!(catalog.read(&row, "a"), Err(MapError::NoSuchProperty(_))));
    }
}
