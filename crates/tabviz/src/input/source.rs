//! Data source abstraction and metadata.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, json-records, xlsx, ...).
    pub format: String,
    /// Encoding used to decode text formats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Delimiter used for delimited text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    /// Number of data rows kept (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// Whether the row limit cut the file short.
    pub truncated: bool,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been loaded.
    pub fn new(path: PathBuf, hash: String, size_bytes: u64, format: impl Into<String>) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format: format.into(),
            encoding: None,
            delimiter: None,
            row_count: 0,
            column_count: 0,
            truncated: false,
            loaded_at: Utc::now(),
        }
    }
}

/// Rectangular table of raw text cells, before typing.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
    /// Whether rows were dropped by a row limit.
    pub truncated: bool,
}

impl RawTable {
    /// Create a new raw table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            truncated: false,
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Keep at most `max_rows` rows, flagging truncation.
    pub fn truncate_rows(&mut self, max_rows: Option<usize>) {
        if let Some(max) = max_rows {
            if self.rows.len() > max {
                self.rows.truncate(max);
                self.truncated = true;
            }
        }
    }

    /// Fill blank headers and make every header unique.
    ///
    /// Blank headers become `column_N`; repeats get `.1`, `.2`, ... suffixes.
    pub fn normalize_headers(&mut self) {
        let mut seen: HashSet<String> = HashSet::new();
        for (idx, header) in self.headers.iter_mut().enumerate() {
            let base = if header.trim().is_empty() {
                format!("column_{}", idx + 1)
            } else {
                header.trim().to_string()
            };

            let mut candidate = base.clone();
            let mut suffix = 1;
            while seen.contains(&candidate) {
                candidate = format!("{}.{}", base, suffix);
                suffix += 1;
            }
            if candidate != *header {
                if candidate != base {
                    warn!("Renamed duplicate column '{}' to '{}'", base, candidate);
                }
                *header = candidate.clone();
            }
            seen.insert(candidate);
        }
    }
}
