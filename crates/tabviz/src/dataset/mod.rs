//! Typed in-memory datasets.

mod column;
mod export;
mod inference;
mod table;
mod value;

pub use column::Column;
pub use inference::{InferenceConfig, TypeInference, is_missing_token, parse_datetime, parse_number};
pub use table::Dataset;
pub use value::{ColumnKind, DATETIME_FORMAT, Value, format_number};
