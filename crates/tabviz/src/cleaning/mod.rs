//! Cleaning stage: missing-value and outlier policies producing a new dataset.

mod engine;
mod policy;
mod summary;

pub use engine::Cleaner;
pub use policy::{CleaningPolicy, MissingPolicy, OutlierPolicy};
pub use summary::{CleaningResult, CleaningSummary, ColumnChange};
