//! Input loading and data source handling.

mod delimited;
mod encoding;
mod json;
mod loader;
mod source;
mod spreadsheet;

pub use delimited::{DELIMITERS, DelimitedConfig, detect_delimiter};
pub use encoding::{Decoded, EncodingConfig, decode};
pub use json::JsonShape;
pub use loader::{FileFormat, Loader, LoaderConfig};
pub use source::{RawTable, SourceMetadata};
