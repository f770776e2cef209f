pub mod column_type;
pub mod error;
pub mod types;
pub mod value;

pub use column_type::{ColumnType, Json};
pub use error::{BoxError, MapError, Result};
pub use types::{DataType, EnumDef, EnumEncoding};
pub use value::{EnumConstant, Value};
