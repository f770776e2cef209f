use crate::codec::{enums, numeric};
use crate::core::{MapError, Result, Value};

use super::{Catalog, PropertyDescriptor};

impl<T> Catalog<T> {
    /// Reads a property for storage.
    ///
    /// A non-null raw value goes through exactly one outbound transform:
    /// the property's serializer if it has one, otherwise enum encoding for
    /// enum properties. Other values are returned as read.
    pub fn read(&self, instance: &T, property: &str) -> Result<Value> {
        let descriptor = self.property(property)?;
        let raw = descriptor.read_raw(instance)?;
        if raw.is_null() {
            return Ok(raw);
        }

        if let Some(serializer) = descriptor.serializer() {
            return serializer
                .serialize(&raw)
                .map_err(|source| MapError::serialization(descriptor.name(), source));
        }

        match descriptor.enum_encoding() {
            Some(encoding) => Ok(enums::encode(raw, encoding)),
            None => Ok(raw),
        }
    }

    /// Writes a stored value into a property.
    ///
    /// A non-null value goes through exactly one inbound transform:
    /// serializer, enum decoding, then integer widening or narrowing.
    pub fn write(&self, instance: &mut T, property: &str, value: Value) -> Result<()> {
        let descriptor = self.property(property)?;
        let writer = descriptor
            .storage()
            .writer()
            .ok_or_else(|| MapError::ReadOnlyProperty(descriptor.name().to_string()))?;

        let value = if value.is_null() {
            value
        } else {
            Self::inbound(descriptor, value)?
        };

        (**writer)(instance, value).map_err(|rejected| MapError::WriteFailed {
            property: descriptor.name().to_string(),
            target_type: descriptor.data_type().to_string(),
            value: format!("{} ({})", rejected, rejected.type_name()),
        })
    }

    fn inbound(descriptor: &PropertyDescriptor<T>, value: Value) -> Result<Value> {
        if let Some(serializer) = descriptor.serializer() {
            return serializer
                .deserialize(&value, descriptor.data_type())
                .map_err(|source| MapError::serialization(descriptor.name(), source));
        }

        if let (Some(encoding), Some(def)) =
            (descriptor.enum_encoding(), descriptor.data_type().enum_def())
        {
            return enums::decode(def, encoding, &value).map(Value::Enum);
        }

        numeric::coerce(descriptor.name(), value, descriptor.data_type())
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Catalog, Mapped, Mapping};
    use crate::core::{EnumEncoding, MapError, Value};
    use crate::serialize::JsonTextSerializer;
    use crate::{EnumDef, Json, MappedEnum};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Priority {
        Low,
        High,
    }

    impl MappedEnum for Priority {
        const DEF: &'static EnumDef = &EnumDef {
            name: "Priority",
            constants: &["LOW", "HIGH"],
        };

        fn ordinal(&self) -> usize {
            *self as usize
        }

        fn from_ordinal(ordinal: usize) -> Option<Self> {
            match ordinal {
                0 => Some(Self::Low),
                1 => Some(Self::High),
                _ => None,
            }
        }
    }

    impl crate::ColumnType for Priority {
        fn data_type() -> crate::DataType {
            crate::DataType::Enum(Self::DEF)
        }

        fn to_value(&self) -> anyhow::Result<Value> {
            crate::codec::enum_to_value(self)
        }

        fn from_value(value: Value) -> Result<Self, Value> {
            crate::codec::enum_from_value(value)
        }
    }

    #[derive(Default)]
    struct Task {
        id: i64,
        hours: i32,
        priority: Option<Priority>,
        rank: Option<Priority>,
        tags: Json<Vec<String>>,
        title: String,
    }

    impl Task {
        fn title(&self) -> String {
            self.title.clone()
        }

        fn set_title(&mut self, title: String) {
            self.title = title.trim().to_string();
        }

        fn summary(&self) -> String {
            format!("{}:{}", self.id, self.title)
        }
    }

    impl Mapped for Task {
        fn map(m: &mut Mapping<Self>) {
            m.field("id", |t: &Task| &t.id, |t: &mut Task| &mut t.id).id();
            m.field("hours", |t: &Task| &t.hours, |t: &mut Task| &mut t.hours);
            m.field("priority", |t: &Task| &t.priority, |t: &mut Task| &mut t.priority);
            m.field("rank", |t: &Task| &t.rank, |t: &mut Task| &mut t.rank)
                .enumerated(EnumEncoding::Ordinal);
            m.field("tags", |t: &Task| &t.tags, |t: &mut Task| &mut t.tags)
                .serializer::<JsonTextSerializer>();
            m.property("title", Task::title, Task::set_title);
            m.read_only_property("summary", Task::summary);
        }
    }

    #[test]
    fn test_enum_string_round_trip() {
        let catalog = Catalog::<Task>::build().unwrap();
        let mut task = Task::default();

        catalog.write(&mut task, "priority", Value::Text("HIGH".into())).unwrap();
        assert_eq!(task.priority, Some(Priority::High));
        assert_eq!(catalog.read(&task, "priority").unwrap(), Value::Text("HIGH".into()));
    }

    #[test]
    fn test_enum_ordinal_round_trip() {
        let catalog = Catalog::<Task>::build().unwrap();
        let mut task = Task::default();

        catalog.write(&mut task, "rank", Value::BigInt(1)).unwrap();
        assert_eq!(task.rank, Some(Priority::High));
        assert_eq!(catalog.read(&task, "rank").unwrap(), Value::Integer(1));

        let err = catalog.write(&mut task, "rank", Value::Integer(2)).unwrap_err();
        assert!(matches!(err, MapError::InvalidOrdinal { ordinal: 2, .. }));
    }

    #[test]
    fn test_null_passes_untransformed() {
        let catalog = Catalog::<Task>::build().unwrap();
        let mut task = Task {
            rank: Some(Priority::Low),
            ..Task::default()
        };

        catalog.write(&mut task, "rank", Value::Null).unwrap();
        assert_eq!(task.rank, None);
        assert_eq!(catalog.read(&task, "rank").unwrap(), Value::Null);
    }

    #[test]
    fn test_integer_width_coercion() {
        let catalog = Catalog::<Task>::build().unwrap();
        let mut task = Task::default();

        catalog.write(&mut task, "id", Value::Integer(7)).unwrap();
        assert_eq!(task.id, 7);

        catalog.write(&mut task, "hours", Value::BigInt(40)).unwrap();
        assert_eq!(task.hours, 40);

        let err = catalog
            .write(&mut task, "hours", Value::BigInt(i64::from(i32::MAX) + 1))
            .unwrap_err();
        assert!(matches!(err, MapError::Overflow { .. }));
        assert_eq!(task.hours, 40);
    }

    #[test]
    fn test_serializer_takes_priority() {
        let catalog = Catalog::<Task>::build().unwrap();
        let mut task = Task::default();

        catalog
            .write(&mut task, "tags", Value::Text(r#"["a","b"]"#.into()))
            .unwrap();
        assert_eq!(task.tags.0, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            catalog.read(&task, "tags").unwrap(),
            Value::Text(r#"["a","b"]"#.into())
        );

        let err = catalog
            .write(&mut task, "tags", Value::Text("not json".into()))
            .unwrap_err();
        assert!(matches!(err, MapError::Serialization { .. }));
    }

    #[test]
    fn test_accessor_write_goes_through_setter() {
        let catalog = Catalog::<Task>::build().unwrap();
        let mut task = Task::default();

        catalog.write(&mut task, "title", Value::Text("  Ship it ".into())).unwrap();
        assert_eq!(task.title, "Ship it");
        assert_eq!(catalog.read(&task, "summary").unwrap(), Value::Text("0:Ship it".into()));
    }

    #[test]
    fn test_read_only_and_mismatch_errors() {
        let catalog = Catalog::<Task>::build().unwrap();
        let mut task = Task::default();

        let err = catalog
            .write(&mut task, "summary", Value::Text("x".into()))
            .unwrap_err();
        assert!(matches!(err, MapError::ReadOnlyProperty(name) if name == "summary"));

        let err = catalog
            .write(&mut task, "title", Value::Integer(3))
            .unwrap_err();
        match err {
            MapError::WriteFailed {
                property,
                target_type,
                value,
            } => {
                assert_eq!(property, "title");
                assert_eq!(target_type, "TEXT");
                assert_eq!(value, "3 (INTEGER)");
            }
            other => panic!("expected WriteFailed, got {:?}", other),
        }

        let err = catalog.write(&mut task, "title", Value::Null).unwrap_err();
        assert!(matches!(err, MapError::WriteFailed { .. }));
    }

    #[test]
    fn test_unknown_property() {
        let catalog = Catalog::<Task>::build().unwrap();
        let mut task = Task::default();

        assert!(matches!(
            catalog.read(&task, "nonexistent"),
            Err(MapError::NoSuchProperty(_))
        ));
        assert!(matches!(
            catalog.write(&mut task, "nonexistent", Value::Integer(1)),
            Err(MapError::NoSuchProperty(_))
        ));
    }
}
