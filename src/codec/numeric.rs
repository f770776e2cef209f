use crate::core::{DataType, MapError, Result, Value};

pub fn widen(value: i32) -> i64 {
    i64::from(value)
}

/// Narrows to 32 bits, rejecting values outside the signed range.
pub fn narrow(property: &str, value: i64) -> Result<i32> {
    if value > i64::from(i32::MAX) {
        return Err(MapError::Overflow {
            property: property.to_string(),
            value,
        });
    }
    if value < i64::from(i32::MIN) {
        return Err(MapError::Underflow {
            property: property.to_string(),
            value,
        });
    }
    Ok(value as i32)
}

/// Adjusts integer width to the member's declared type. Anything else is
/// returned unchanged.
pub fn coerce(property: &str, value: Value, target: &DataType) -> Result<Value> {
    match (value, target) {
        (Value::Integer(i), DataType::BigInt) => Ok(Value::BigInt(widen(i))),
        (Value::BigInt(i), DataType::Integer) => narrow(property, i).map(Value::Integer),
        (other, _) => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_preserves_value() {
        for v in [i32::MIN, -1, 0, 1, i32::MAX] {
            assert_eq!(
                coerce("n", Value::Integer(v), &DataType::BigInt).unwrap(),
                Value::BigInt(v as i64)
            );
        }
    }

    #[test]
    fn test_narrow_bounds() {
        assert_eq!(narrow("n", i32::MAX as i64).unwrap(), i32::MAX);
        assert_eq!(narrow("n", i32::MIN as i64).unwrap(), i32::MIN);

        let err = narrow("n", i32::MAX as i64 + 1).unwrap_err();
        assert!(matches!(err, MapError::Overflow { value: 2147483648, .. }));

        let err = narrow("n", i32::MIN as i64 - 1).unwrap_err();
        assert!(matches!(err, MapError::Underflow { value: -2147483649, .. }));
    }

    #[test]
    fn test_other_values_pass_through() {
        let value = coerce("n", Value::Text("9".into()), &DataType::Integer).unwrap();
        assert_eq!(value, Value::Text("9".into()));

        let value = coerce("n", Value::Integer(9), &DataType::Integer).unwrap();
        assert_eq!(value, Value::Integer(9));
    }
}
