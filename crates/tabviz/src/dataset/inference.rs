//! Column type inference from raw text cells.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::input::RawTable;

use super::column::Column;
use super::table::Dataset;
use super::value::{ColumnKind, Value};

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================
// Cheap shape checks before handing a cell to chrono.

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d{4}-\d{1,2}-\d{1,2}", // ISO date
        r"^\d{1,2}/\d{1,2}/\d{4}", // US date
        r"^\d{1,2}\.\d{1,2}\.\d{4}", // European date
        r"^\d{4}/\d{1,2}/\d{1,2}", // Alt ISO
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Classification of a single raw cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CellClass {
    Number,
    Boolean,
    DateTime,
    String,
}

/// Type inference settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Maximum distinct values for a string column to count as categorical.
    pub categorical_threshold: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            categorical_threshold: 20,
        }
    }
}

/// Turns raw string tables into typed datasets.
pub struct TypeInference {
    config: InferenceConfig,
}

impl TypeInference {
    pub fn new() -> Self {
        Self::with_config(InferenceConfig::default())
    }

    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Type every column of a raw table.
    ///
    /// The raw table must already be rectangular with unique headers.
    pub fn build_dataset(&self, table: &RawTable) -> Result<Dataset> {
        let columns = table
            .headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let cells: Vec<&str> = table.column_values(idx).collect();
                self.infer_column(name, &cells)
            })
            .collect();

        Dataset::new(columns)
    }

    /// Infer the kind of one column and convert its cells.
    pub fn infer_column(&self, name: &str, cells: &[&str]) -> Column {
        let present: Vec<&str> = cells
            .iter()
            .map(|c| c.trim())
            .filter(|c| !is_missing_token(c))
            .collect();

        let kind = self.infer_kind(&present);
        let values = cells.iter().map(|c| convert_cell(c, kind)).collect();

        Column::new(name, kind, values)
    }

    /// Infer the column kind from present (non-missing) cells.
    fn infer_kind(&self, present: &[&str]) -> ColumnKind {
        if present.is_empty() {
            return ColumnKind::Text;
        }

        let mut class_counts: HashMap<CellClass, usize> = HashMap::new();
        for value in present {
            *class_counts.entry(classify(value)).or_insert(0) += 1;
        }

        let total = present.len();
        if class_counts.get(&CellClass::Number) == Some(&total) {
            return ColumnKind::Numeric;
        }
        if class_counts.get(&CellClass::DateTime) == Some(&total) {
            return ColumnKind::DateTime;
        }

        let distinct: IndexSet<&str> = present.iter().copied().collect();
        if distinct.len() <= self.config.categorical_threshold || distinct.len() * 2 <= total {
            ColumnKind::Categorical
        } else {
            ColumnKind::Text
        }
    }
}

impl Default for TypeInference {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a value represents a missing/null value.
pub fn is_missing_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
        || trimmed == "."
}

/// Parse a finite number.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a date or datetime in one of the accepted formats.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if !DATE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Detect the type of a single value.
fn classify(value: &str) -> CellClass {
    if matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "false" | "yes" | "no"
    ) {
        return CellClass::Boolean;
    }
    if parse_number(value).is_some() {
        return CellClass::Number;
    }
    if parse_datetime(value).is_some() {
        return CellClass::DateTime;
    }
    CellClass::String
}

/// Convert a raw cell into a value of the given kind.
fn convert_cell(raw: &str, kind: ColumnKind) -> Value {
    let trimmed = raw.trim();
    if is_missing_token(trimmed) {
        return Value::Missing;
    }
    match kind {
        ColumnKind::Numeric => parse_number(trimmed).map(Value::Number).unwrap_or(Value::Missing),
        ColumnKind::DateTime => parse_datetime(trimmed)
            .map(Value::DateTime)
            .unwrap_or(Value::Missing),
        ColumnKind::Categorical | ColumnKind::Text => Value::Text(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(cells: &[&str]) -> Column {
        TypeInference::new().infer_column("col", cells)
    }

    #[test]
    fn test_infer_numeric() {
        let col = infer(&["1", "2.5", "NA", "-3"]);
        assert_eq!(col.kind, ColumnKind::Numeric);
        assert_eq!(col.missing_count(), 1);
        assert_eq!(col.present_numbers(), vec![1.0, 2.5, -3.0]);
    }

    #[test]
    fn test_mixed_numbers_stay_text() {
        let col = infer(&["1", "2", "three"]);
        assert_eq!(col.kind, ColumnKind::Categorical);
        assert_eq!(col.values[0], Value::Text("1".into()));
    }

    #[test]
    fn test_infer_datetime() {
        let col = infer(&["2024-01-15", "2024-02-20 10:30:00", ""]);
        assert_eq!(col.kind, ColumnKind::DateTime);
        assert!(col.values[2].is_missing());
    }

    #[test]
    fn test_infer_categorical_vs_text() {
        let col = infer(&["a", "b", "a", "b"]);
        assert_eq!(col.kind, ColumnKind::Categorical);

        let inference = TypeInference::with_config(InferenceConfig {
            categorical_threshold: 2,
        });
        let names = ["w1", "w2", "w3", "w4", "w5"];
        let col = inference.infer_column("notes", &names);
        assert_eq!(col.kind, ColumnKind::Text);
    }

    #[test]
    fn test_booleans_are_categorical() {
        let col = infer(&["true", "false", "true"]);
        assert_eq!(col.kind, ColumnKind::Categorical);
    }

    #[test]
    fn test_all_missing_is_text() {
        let col = infer(&["", "NA"]);
        assert_eq!(col.kind, ColumnKind::Text);
        assert_eq!(col.missing_count(), 2);
    }

    #[test]
    fn test_missing_tokens() {
        assert!(is_missing_token(""));
        assert!(is_missing_token("NA"));
        assert!(is_missing_token("n/a"));
        assert!(is_missing_token("NaN"));
        assert!(is_missing_token("NULL"));
        assert!(is_missing_token("."));
        assert!(!is_missing_token("0"));
        assert!(!is_missing_token("-"));
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(" 4.5 "), Some(4.5));
    }
}
