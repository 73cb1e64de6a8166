//! Cleaning results.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// A change made to one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnChange {
    /// Column affected.
    pub column: String,

    /// Description of the change.
    pub description: String,

    /// Number of values changed or flagged.
    pub values_changed: usize,
}

/// What a cleaning run did.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_dropped_missing: usize,
    pub rows_dropped_outliers: usize,
    pub values_filled: usize,

    /// Detailed changes per column.
    pub columns: Vec<ColumnChange>,

    /// Targeted columns the policy could not apply to.
    pub skipped_columns: Vec<String>,
}

impl CleaningSummary {
    pub fn new(rows_before: usize) -> Self {
        Self {
            rows_before,
            rows_after: rows_before,
            ..Self::default()
        }
    }

    /// Add a change; changes touching no values are not recorded.
    pub fn add_change(&mut self, column: &str, description: impl Into<String>, values_changed: usize) {
        if values_changed == 0 {
            return;
        }
        self.columns.push(ColumnChange {
            column: column.to_string(),
            description: description.into(),
            values_changed,
        });
    }

    pub fn skip(&mut self, column: &str) {
        if !self.skipped_columns.iter().any(|c| c == column) {
            self.skipped_columns.push(column.to_string());
        }
    }

    /// Returns true if the run changed nothing.
    pub fn is_noop(&self) -> bool {
        self.rows_after == self.rows_before && self.values_filled == 0
    }
}

/// The cleansed copy and the summary of how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningResult {
    pub dataset: Dataset,
    pub summary: CleaningSummary,
}
