//! The in-memory dataset.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabvizError};

use super::column::Column;
use super::value::ColumnKind;

/// An ordered set of equal-length, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Create a dataset, checking name uniqueness and equal column lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TabvizError::InvalidDataset(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(TabvizError::InvalidDataset(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name,
                    bad.len(),
                    expected
                )));
            }
        }

        Ok(Self { columns })
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get the position of a column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columns of the given kind, in dataset order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(move |c| c.kind == kind)
    }

    /// Copy of the dataset keeping only the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let values = rows
                    .iter()
                    .filter_map(|&r| c.values.get(r).cloned())
                    .collect();
                Column::new(c.name.clone(), c.kind, values)
            })
            .collect();
        Dataset { columns }
    }

    /// Consume the dataset and return its columns.
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_duplicate_names() {
        let result = Dataset::new(vec![
            Column::numeric("a", [Some(1.0)]),
            Column::numeric("a", [Some(2.0)]),
        ]);
        assert!(matches!(result, Err(TabvizError::InvalidDataset(_))));
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let result = Dataset::new(vec![
            Column::numeric("a", [Some(1.0), Some(2.0)]),
            Column::numeric("b", [Some(2.0)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_select_rows() {
        let ds = Dataset::new(vec![
            Column::numeric("a", [Some(1.0), Some(2.0), Some(3.0)]),
            Column::categorical("b", [Some("x"), Some("y"), Some("z")]),
        ])
        .unwrap();
        let subset = ds.select_rows(&[0, 2]);
        assert_eq!(subset.row_count(), 2);
        assert_eq!(subset.column_names(), vec!["a", "b"]);
        assert_eq!(subset.column("a").unwrap().present_numbers(), vec![1.0, 3.0]);
    }
}
