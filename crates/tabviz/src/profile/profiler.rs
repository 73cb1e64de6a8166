//! Column and dataset profiling.

use chrono::NaiveDateTime;
use log::info;
use serde::{Deserialize, Serialize};

use crate::dataset::{Column, ColumnKind, Dataset};

use super::correlation::{CorrelationMatrix, CorrelationMethod, StrongCorrelation, correlation_matrix};
use super::stats::NumericStatistics;

/// Profiler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Correlation coefficient for the matrix.
    pub correlation: CorrelationMethod,
    /// Absolute coefficient above which a pair is reported as strong.
    pub strong_correlation_threshold: f64,
    /// IQR fence multiplier for the outlier report.
    pub iqr_multiplier: f64,
    /// Absolute z-score above which a value counts as an outlier.
    pub z_threshold: f64,
    /// Number of most frequent values kept per categorical/text column.
    pub top_categories: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            correlation: CorrelationMethod::Pearson,
            strong_correlation_threshold: 0.7,
            iqr_multiplier: 1.5,
            z_threshold: 3.0,
            top_categories: 10,
        }
    }
}

/// A distinct value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Length statistics for text columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStatistics {
    pub min_length: usize,
    pub max_length: usize,
    pub avg_length: f64,
}

/// Span of a datetime column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeRange {
    pub earliest: NaiveDateTime,
    pub latest: NaiveDateTime,
}

/// Summary of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    /// Total number of cells.
    pub count: usize,
    pub missing_count: usize,
    pub distinct_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStatistics>,
    /// Most frequent values, descending; ties keep first-appearance order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_values: Vec<ValueCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTimeRange>,
}

impl ColumnProfile {
    /// Number of present values.
    pub fn present_count(&self) -> usize {
        self.count - self.missing_count
    }
}

/// Missing cells in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub column: String,
    pub count: usize,
    pub percent: f64,
}

/// Dataset-wide missing value summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingReport {
    pub total_cells: usize,
    pub total_missing: usize,
    /// Missing fraction of all cells (0 for an empty dataset).
    pub ratio: f64,
    /// Only columns with at least one missing cell.
    pub columns: Vec<ColumnMissing>,
}

/// Outlier counts for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub column: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Values outside the IQR fences.
    pub iqr_count: usize,
    /// Values with an absolute z-score above the threshold.
    pub z_score_count: usize,
}

/// Full profile of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnProfile>,
    pub correlation: CorrelationMatrix,
    pub strong_correlations: Vec<StrongCorrelation>,
    pub missing: MissingReport,
    pub outliers: Vec<OutlierReport>,
}

impl DatasetProfile {
    /// Get a column profile by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Computes dataset profiles.
pub struct Profiler {
    config: ProfilerConfig,
}

impl Profiler {
    /// Create a profiler with default settings.
    pub fn new() -> Self {
        Self::with_config(ProfilerConfig::default())
    }

    pub fn with_config(config: ProfilerConfig) -> Self {
        Self { config }
    }

    /// Profile every column and compute the correlation, missing, and outlier reports.
    pub fn profile(&self, dataset: &Dataset) -> DatasetProfile {
        let columns: Vec<ColumnProfile> = dataset
            .columns()
            .iter()
            .map(|c| self.profile_column(c))
            .collect();

        let correlation = correlation_matrix(dataset, self.config.correlation);
        let strong_correlations = correlation.strong_pairs(self.config.strong_correlation_threshold);
        let missing = missing_report(dataset);
        let outliers = columns
            .iter()
            .filter_map(|p| self.outlier_report(dataset, p))
            .collect();

        info!(
            "Profiled {} columns x {} rows ({} strong correlations, {} missing cells)",
            dataset.column_count(),
            dataset.row_count(),
            strong_correlations.len(),
            missing.total_missing
        );

        DatasetProfile {
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            columns,
            correlation,
            strong_correlations,
            missing,
            outliers,
        }
    }

    /// Profile a single column.
    pub fn profile_column(&self, column: &Column) -> ColumnProfile {
        let counts = column.value_counts();

        let mut profile = ColumnProfile {
            name: column.name.clone(),
            kind: column.kind,
            count: column.len(),
            missing_count: column.missing_count(),
            distinct_count: counts.len(),
            numeric: None,
            top_values: Vec::new(),
            text: None,
            datetime: None,
        };

        match column.kind {
            ColumnKind::Numeric => {
                profile.numeric = NumericStatistics::from_values(&column.present_numbers());
            }
            ColumnKind::DateTime => {
                let mut dates = column.values.iter().filter_map(|v| v.as_datetime());
                profile.datetime = dates.next().map(|first| {
                    dates.fold(
                        DateTimeRange {
                            earliest: first,
                            latest: first,
                        },
                        |range, dt| DateTimeRange {
                            earliest: range.earliest.min(dt),
                            latest: range.latest.max(dt),
                        },
                    )
                });
            }
            ColumnKind::Categorical | ColumnKind::Text => {
                let mut ranked: Vec<(usize, String, usize)> = counts
                    .into_iter()
                    .enumerate()
                    .map(|(order, (value, count))| (order, value, count))
                    .collect();
                ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
                profile.top_values = ranked
                    .into_iter()
                    .take(self.config.top_categories)
                    .map(|(_, value, count)| ValueCount { value, count })
                    .collect();

                if column.kind == ColumnKind::Text {
                    profile.text = text_statistics(column);
                }
            }
        }

        profile
    }

    fn outlier_report(&self, dataset: &Dataset, profile: &ColumnProfile) -> Option<OutlierReport> {
        let stats = profile.numeric.as_ref()?;
        let values = dataset.column(&profile.name)?.present_numbers();
        let (lower, upper) = stats.iqr_bounds(self.config.iqr_multiplier);

        Some(OutlierReport {
            column: profile.name.clone(),
            lower_bound: lower,
            upper_bound: upper,
            iqr_count: values.iter().filter(|&&v| v < lower || v > upper).count(),
            z_score_count: values
                .iter()
                .filter(|&&v| stats.z_score(v).abs() > self.config.z_threshold)
                .count(),
        })
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

fn text_statistics(column: &Column) -> Option<TextStatistics> {
    let lengths: Vec<usize> = column
        .values
        .iter()
        .filter_map(|v| v.as_text())
        .map(|s| s.chars().count())
        .collect();

    if lengths.is_empty() {
        return None;
    }

    Some(TextStatistics {
        min_length: lengths.iter().copied().min().unwrap_or(0),
        max_length: lengths.iter().copied().max().unwrap_or(0),
        avg_length: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
    })
}

/// Summarize missing cells over the whole dataset.
pub fn missing_report(dataset: &Dataset) -> MissingReport {
    let rows = dataset.row_count();
    let total_cells = rows * dataset.column_count();

    let columns: Vec<ColumnMissing> = dataset
        .columns()
        .iter()
        .filter_map(|c| {
            let count = c.missing_count();
            (count > 0).then(|| ColumnMissing {
                column: c.name.clone(),
                count,
                percent: count as f64 / rows as f64 * 100.0,
            })
        })
        .collect();

    let total_missing = columns.iter().map(|c| c.count).sum();
    let ratio = if total_cells == 0 {
        0.0
    } else {
        total_missing as f64 / total_cells as f64
    };

    MissingReport {
        total_cells,
        total_missing,
        ratio,
        columns,
    }
}
