//! File loading: format dispatch, decoding, and typing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::dataset::{Dataset, InferenceConfig, TypeInference};
use crate::error::{Result, TabvizError};

use super::delimited::{self, DelimitedConfig};
use super::encoding::{self, EncodingConfig};
use super::json;
use super::source::{RawTable, SourceMetadata};
use super::spreadsheet;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// Comma/semicolon/tab separated text.
    Delimited,
    /// JSON records or columns.
    Json,
    /// Excel or OpenDocument workbook.
    Spreadsheet,
}

impl FileFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "tsv" | "txt" | "tab" => Some(FileFormat::Delimited),
            "json" => Some(FileFormat::Json),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(FileFormat::Spreadsheet),
            _ => None,
        }
    }
}

impl std::str::FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" | "tsv" | "delimited" => Ok(FileFormat::Delimited),
            "json" => Ok(FileFormat::Json),
            "excel" | "xlsx" | "xls" | "spreadsheet" => Ok(FileFormat::Spreadsheet),
            _ => Err(format!("Unknown format: {}. Use csv, json, or excel.", s)),
        }
    }
}

/// Loader configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Format to use (None = detect from extension).
    pub format: Option<FileFormat>,
    /// Encoding detection for text formats.
    pub encoding: EncodingConfig,
    /// Delimited text options.
    pub delimited: DelimitedConfig,
    /// Worksheet to read (None = first sheet).
    pub sheet: Option<String>,
    /// Maximum rows to keep (None = all); extra rows are dropped and flagged.
    pub max_rows: Option<usize>,
    /// Column typing options.
    pub inference: InferenceConfig,
}

/// Loads data files into typed datasets.
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    /// Create a new loader with default configuration.
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    /// Create a loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load a file and return the dataset and its metadata.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();

        let format = match self.config.format.or_else(|| FileFormat::from_path(path)) {
            Some(f) => f,
            None => {
                return Err(TabvizError::UnsupportedFormat(format!(
                    "cannot infer format of '{}' from its extension",
                    path.display()
                )));
            }
        };

        let contents = read_file(path)?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let (mut table, mut source) = match format {
            FileFormat::Delimited => {
                let decoded = encoding::decode(&contents, &self.config.encoding)
                    .map_err(|m| TabvizError::encoding(path, m))?;
                let (table, delimiter) = delimited::parse_text(
                    &decoded.text,
                    &self.config.delimited,
                    self.config.max_rows,
                    path,
                )?;
                let mut source = SourceMetadata::new(
                    path.to_path_buf(),
                    hash,
                    contents.len() as u64,
                    delimited::format_label(delimiter),
                );
                source.encoding = Some(decoded.encoding.to_string());
                source.delimiter = Some(delimiter as char);
                (table, source)
            }
            FileFormat::Json => {
                let decoded = encoding::decode(&contents, &self.config.encoding)
                    .map_err(|m| TabvizError::encoding(path, m))?;
                let (table, shape) = json::parse_text(&decoded.text, self.config.max_rows, path)?;
                let mut source =
                    SourceMetadata::new(path.to_path_buf(), hash, contents.len() as u64, shape.label());
                source.encoding = Some(decoded.encoding.to_string());
                (table, source)
            }
            FileFormat::Spreadsheet => {
                let table = spreadsheet::read_workbook(
                    path,
                    self.config.sheet.as_deref(),
                    self.config.max_rows,
                )?;
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_ascii_lowercase())
                    .unwrap_or_else(|| "xlsx".to_string());
                let source = SourceMetadata::new(path.to_path_buf(), hash, contents.len() as u64, ext);
                (table, source)
            }
        };

        if table.column_count() == 0 {
            return Err(TabvizError::format(path, "no columns found"));
        }

        table.normalize_headers();
        if table.truncated {
            warn!(
                "Truncated '{}' to {} rows",
                path.display(),
                table.row_count()
            );
        }

        let dataset = self.build(&table)?;

        source.row_count = dataset.row_count();
        source.column_count = dataset.column_count();
        source.truncated = table.truncated;

        info!(
            "Loaded '{}' as {}: {} rows x {} columns",
            path.display(),
            source.format,
            source.row_count,
            source.column_count
        );

        Ok((dataset, source))
    }

    fn build(&self, table: &RawTable) -> Result<Dataset> {
        TypeInference::with_config(self.config.inference.clone()).build_dataset(table)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the whole file; the handle is dropped before returning.
fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| TabvizError::io(path, e))?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)
        .map_err(|e| TabvizError::io(path, e))?;
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnKind;
    use std::io::Write;
    use tempfile::Builder;

    fn create_test_file(suffix: &str, content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(FileFormat::from_path(Path::new("a.CSV")), Some(FileFormat::Delimited));
        assert_eq!(FileFormat::from_path(Path::new("a.json")), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_path(Path::new("a.xlsx")), Some(FileFormat::Spreadsheet));
        assert_eq!(FileFormat::from_path(Path::new("a.parquet")), None);
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_file(".csv", b"date,region,revenue\n2024-01-01,west,10\n2024-01-02,east,12.5\n");
        let (dataset, source) = Loader::new().load(file.path()).unwrap();

        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.column_count(), 3);
        assert_eq!(source.format, "csv");
        assert_eq!(source.encoding.as_deref(), Some("UTF-8"));
        assert!(source.hash.starts_with("sha256:"));
        assert_eq!(dataset.column("date").unwrap().kind, ColumnKind::DateTime);
        assert_eq!(dataset.column("revenue").unwrap().kind, ColumnKind::Numeric);
    }

    #[test]
    fn test_load_json() {
        let file = create_test_file(".json", br#"[{"x": 1, "y": "a"}, {"x": 2, "y": "b"}]"#);
        let (dataset, source) = Loader::new().load(file.path()).unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(source.format, "json-records");
    }

    #[test]
    fn test_unknown_extension() {
        let file = create_test_file(".parquet", b"x");
        assert!(matches!(
            Loader::new().load(file.path()),
            Err(TabvizError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_declared_format_overrides_extension() {
        let file = create_test_file(".dat", b"a;b\n1;2\n");
        let loader = Loader::with_config(LoaderConfig {
            format: Some(FileFormat::Delimited),
            ..LoaderConfig::default()
        });
        let (dataset, source) = loader.load(file.path()).unwrap();
        assert_eq!(dataset.column_names(), vec!["a", "b"]);
        assert_eq!(source.delimiter, Some(';'));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Loader::new().load("/nonexistent/data.csv"),
            Err(TabvizError::Io { .. })
        ));
    }

    #[test]
    fn test_row_limit() {
        let file = create_test_file(".csv", b"a\n1\n2\n3\n4\n");
        let loader = Loader::with_config(LoaderConfig {
            max_rows: Some(3),
            ..LoaderConfig::default()
        });
        let (dataset, source) = loader.load(file.path()).unwrap();
        assert_eq!(dataset.row_count(), 3);
        assert!(source.truncated);
    }
}
