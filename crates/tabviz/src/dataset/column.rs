//! A named, typed column.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::value::{ColumnKind, Value};

/// A single column of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its dataset.
    pub name: String,
    /// Inferred semantic type.
    pub kind: ColumnKind,
    /// Cell values in source row order.
    pub values: Vec<Value>,
}

impl Column {
    /// Create a column from already-typed values.
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Build a numeric column; `None` entries become missing.
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.map(Value::Number).unwrap_or(Value::Missing))
            .collect();
        Self::new(name, ColumnKind::Numeric, values)
    }

    /// Build a categorical column; `None` entries become missing.
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.map(|s| Value::Text(s.into())).unwrap_or(Value::Missing))
            .collect();
        Self::new(name, ColumnKind::Categorical, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a cell by row index.
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Axis position for every row (`None` where missing or non-continuous).
    pub fn axis_values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().map(Value::as_axis_value)
    }

    /// Present numeric values, in row order.
    pub fn present_numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_number).collect()
    }

    /// Label of every row (`None` where missing).
    pub fn labels(&self) -> impl Iterator<Item = Option<String>> + '_ {
        self.values
            .iter()
            .map(|v| if v.is_missing() { None } else { Some(v.to_string()) })
    }

    /// Counts of each distinct present value, in first-appearance order.
    pub fn value_counts(&self) -> IndexMap<String, usize> {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for label in self.labels().flatten() {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct present labels, in first-appearance order.
    pub fn categories(&self) -> Vec<String> {
        self.value_counts().into_keys().collect()
    }
}
