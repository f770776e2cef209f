use crate::core::{EnumConstant, EnumDef, EnumEncoding, MapError, Result, Value};

/// A unit-only Rust enum that can back a mapped member.
///
/// Usually derived with `#[derive(MappedEnum)]`, which also implements
/// [`ColumnType`](crate::ColumnType) through [`enum_to_value`] and
/// [`enum_from_value`].
pub trait MappedEnum: Sized + 'static {
    const DEF: &'static EnumDef;

    fn ordinal(&self) -> usize;

    fn from_ordinal(ordinal: usize) -> Option<Self>;
}

/// Raw form of an enum member.
pub fn enum_to_value<E: MappedEnum>(value: &E) -> anyhow::Result<Value> {
    EnumConstant::new(E::DEF, value.ordinal())
        .map(Value::Enum)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "ordinal {} is outside enum {}",
                value.ordinal(),
                E::DEF.name
            )
        })
}

/// Accepts only a constant of `E` itself.
pub fn enum_from_value<E: MappedEnum>(value: Value) -> std::result::Result<E, Value> {
    match value {
        Value::Enum(constant) if constant.def() == E::DEF => {
            E::from_ordinal(constant.ordinal()).ok_or(value)
        }
        other => Err(other),
    }
}

/// Decodes a stored value into a constant of `def`.
pub fn decode(def: &'static EnumDef, encoding: EnumEncoding, value: &Value) -> Result<EnumConstant> {
    match encoding {
        EnumEncoding::Ordinal => {
            let ordinal = value.as_i64().ok_or(MapError::EnumTypeMismatch {
                enum_name: def.name,
                found: value.type_name(),
            })?;
            usize::try_from(ordinal)
                .ok()
                .and_then(|index| EnumConstant::new(def, index))
                .ok_or(MapError::InvalidOrdinal {
                    enum_name: def.name,
                    ordinal,
                })
        }
        EnumEncoding::String => {
            let text = value.to_string();
            def.position(&text)
                .and_then(|index| EnumConstant::new(def, index))
                .ok_or(MapError::UnknownEnumValue {
                    enum_name: def.name,
                    value: text,
                })
        }
    }
}

/// Encodes a raw enum value for storage. Values that are not enum
/// constants pass through unchanged.
pub fn encode(raw: Value, encoding: EnumEncoding) -> Value {
    match raw {
        Value::Enum(constant) => match encoding {
            EnumEncoding::Ordinal => Value::Integer(constant.ordinal() as i32),
            EnumEncoding::String => Value::Text(constant.name().to_string()),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SUIT: EnumDef = EnumDef {
        name: "Suit",
        constants: &["HEARTS", "SPADES", "CLUBS"],
    };

    #[test]
    fn test_decode_ordinal() {
        let constant = decode(&SUIT, EnumEncoding::Ordinal, &Value::Integer(2)).unwrap();
        assert_eq!(constant.name(), "CLUBS");

        let constant = decode(&SUIT, EnumEncoding::Ordinal, &Value::BigInt(0)).unwrap();
        assert_eq!(constant.name(), "HEARTS");
    }

    #[test]
    fn test_decode_ordinal_out_of_range() {
        let err = decode(&SUIT, EnumEncoding::Ordinal, &Value::Integer(3)).unwrap_err();
        assert!(matches!(err, MapError::InvalidOrdinal { ordinal: 3, .. }));

        let err = decode(&SUIT, EnumEncoding::Ordinal, &Value::Integer(-1)).unwrap_err();
        assert!(matches!(err, MapError::InvalidOrdinal { ordinal: -1, .. }));

        let err = decode(&SUIT, EnumEncoding::Ordinal, &Value::Text("1".into())).unwrap_err();
        assert!(matches!(err, MapError::EnumTypeMismatch { found: "TEXT", .. }));
    }

    #[test]
    fn test_decode_string() {
        let constant = decode(&SUIT, EnumEncoding::String, &Value::Text("SPADES".into())).unwrap();
        assert_eq!(constant.ordinal(), 1);

        let err = decode(&SUIT, EnumEncoding::String, &Value::Text("spades".into())).unwrap_err();
        assert!(matches!(err, MapError::UnknownEnumValue { .. }));
    }

    #[test]
    fn test_encode() {
        let clubs = Value::Enum(EnumConstant::new(&SUIT, 2).unwrap());
        assert_eq!(encode(clubs.clone(), EnumEncoding::Ordinal), Value::Integer(2));
        assert_eq!(encode(clubs, EnumEncoding::String), Value::Text("CLUBS".into()));
        assert_eq!(encode(Value::Integer(9), EnumEncoding::String), Value::Integer(9));
    }
}
