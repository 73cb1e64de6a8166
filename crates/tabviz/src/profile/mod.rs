//! Dataset profiling: summary statistics, correlations, missing values, outliers.

mod correlation;
mod profiler;
pub mod stats;

pub use correlation::{
    CorrelationMatrix, CorrelationMethod, StrongCorrelation, correlation_matrix, pairwise,
};
pub use profiler::{
    ColumnMissing, ColumnProfile, DatasetProfile, DateTimeRange, MissingReport, OutlierReport,
    Profiler, ProfilerConfig, TextStatistics, ValueCount, missing_report,
};
pub use stats::NumericStatistics;
