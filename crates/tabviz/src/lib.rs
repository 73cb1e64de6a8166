//! Tabviz: load, profile, clean and chart tabular datasets.
//!
//! Tabviz reads delimited text, JSON and spreadsheets into a typed
//! [`Dataset`], summarizes it, applies declarative cleaning policies, and
//! renders validated chart requests into an owned [`Figure`] that can be
//! exported as SVG or PNG.
//!
//! # Core Principles
//!
//! - **Non-destructive**: cleaning returns a new dataset, the input is never modified
//! - **Validated requests**: chart specs are checked against the data before rendering
//! - **Deterministic output**: the same data and request always give the same figure
//!
//! # Example
//!
//! ```no_run
//! use tabviz::Tabviz;
//! use tabviz::chart::{ChartKind, ChartSpecBuilder};
//! use tabviz::render::ExportOptions;
//!
//! let tabviz = Tabviz::new();
//! let (data, source) = tabviz.load("sales_data.csv").unwrap();
//! println!("{} rows from {}", source.row_count, source.file);
//!
//! let request = ChartSpecBuilder::new(ChartKind::Line)
//!     .x("date")
//!     .y("revenue")
//!     .build(&data)
//!     .unwrap();
//! let figure = tabviz.render(&request, &data).unwrap();
//! figure.save("revenue.svg", &ExportOptions::default()).unwrap();
//! ```

pub mod chart;
pub mod cleaning;
pub mod dataset;
pub mod error;
pub mod input;
pub mod profile;
pub mod render;

mod pipeline;

pub use crate::pipeline::{ProfileReport, Tabviz, TabvizConfig};
pub use chart::{ChartKind, ChartRequest, ChartSpec, ChartSpecBuilder, Role, StyleConfig};
pub use cleaning::{CleaningPolicy, CleaningResult, MissingPolicy, OutlierPolicy};
pub use dataset::{Column, ColumnKind, Dataset, Value};
pub use error::{Result, TabvizError};
pub use input::{Loader, LoaderConfig, SourceMetadata};
pub use profile::{DatasetProfile, Profiler, ProfilerConfig};
pub use render::{ExportOptions, Figure, ImageFormat, RenderConfig};
