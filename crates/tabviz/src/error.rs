//! Error types for the tabviz library.

use std::path::PathBuf;
use thiserror::Error;

use crate::chart::{ChartKind, Role};

/// Main error type for tabviz operations.
#[derive(Debug, Error)]
pub enum TabvizError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be read as the declared or detected format.
    #[error("Format error in '{path}': {message}")]
    Format { path: PathBuf, message: String },

    /// Text content could not be decoded with any candidate encoding.
    #[error("Encoding error in '{path}': {message}")]
    Encoding { path: PathBuf, message: String },

    /// The data does not form a rectangular table.
    #[error("Schema error in '{path}': {message}")]
    Schema { path: PathBuf, message: String },

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Columns assembled in memory break a dataset invariant.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// A chart request does not satisfy the roles its kind requires.
    #[error("Invalid {kind} chart: role {role}: {reason}")]
    InvalidChartSpec {
        kind: ChartKind,
        role: Role,
        reason: String,
    },

    /// The data cannot be drawn as requested.
    #[error("Failed to render {kind} chart: {reason}")]
    RenderFailure { kind: ChartKind, reason: String },

    /// A cleaning policy cannot be applied to this dataset.
    #[error("Invalid cleaning policy for column '{column}': {reason}")]
    InvalidPolicy { column: String, reason: String },

    /// Writing a figure to an image backend failed.
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TabvizError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TabvizError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        TabvizError::Format {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn encoding(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        TabvizError::Encoding {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn schema(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        TabvizError::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn chart_spec(kind: ChartKind, role: Role, reason: impl Into<String>) -> Self {
        TabvizError::InvalidChartSpec {
            kind,
            role,
            reason: reason.into(),
        }
    }

    pub(crate) fn render(kind: ChartKind, reason: impl Into<String>) -> Self {
        TabvizError::RenderFailure {
            kind,
            reason: reason.into(),
        }
    }
}

/// Result type alias for tabviz operations.
pub type Result<T> = std::result::Result<T, TabvizError>;
