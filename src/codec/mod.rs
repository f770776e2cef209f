//! Stateless value codecs used by the accessor and mutator.

pub mod enums;
pub mod numeric;

pub use enums::{MappedEnum, enum_from_value, enum_to_value};
