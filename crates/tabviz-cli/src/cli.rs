//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tabviz::chart::{ChartKind, PaletteName, Theme};
use tabviz::input::FileFormat;
use tabviz::profile::CorrelationMethod;

/// Tabviz: load, profile, clean and chart tabular data
#[derive(Parser)]
#[command(name = "tabviz")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file (loader, profiler and render settings)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Profile a data file: column statistics, correlations, missing values
    Profile {
        #[command(flatten)]
        input: InputArgs,

        /// Output the profile as JSON
        #[arg(long)]
        json: bool,

        /// Write the JSON profile to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Correlation coefficient (pearson, spearman)
        #[arg(long)]
        correlation: Option<CorrelationMethod>,
    },

    /// Clean a data file and export the result
    Clean {
        #[command(flatten)]
        input: InputArgs,

        /// Output path (.csv or .json; default: <file>_clean.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON cleaning policy file (overrides the policy flags)
        #[arg(long, value_name = "FILE")]
        policy: Option<PathBuf>,

        /// Missing-value handling
        #[arg(long, value_enum, default_value = "keep")]
        missing: MissingChoice,

        /// Constant used with --missing constant
        #[arg(long, required_if_eq("missing", "constant"))]
        fill_value: Option<String>,

        /// Outlier handling
        #[arg(long, value_enum, default_value = "none")]
        outliers: OutlierChoice,

        /// Z-score threshold or IQR multiplier (default: 3.0 or 1.5)
        #[arg(long)]
        threshold: Option<f64>,

        /// Restrict the policy to these columns
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Prefix CSV output with a UTF-8 byte-order mark
        #[arg(long)]
        bom: bool,
    },

    /// Render one chart to SVG or PNG
    Chart {
        #[command(flatten)]
        input: InputArgs,

        /// Chart kind (line, area, bar, scatter, pie, box, heatmap, distribution, violin, scatter3d, radar, sankey, pairplot)
        #[arg(short, long)]
        kind: Option<ChartKind>,

        /// JSON chart spec file (overrides kind and role flags)
        #[arg(long, value_name = "FILE")]
        spec: Option<PathBuf>,

        #[command(flatten)]
        roles: RoleArgs,

        #[command(flatten)]
        style: StyleArgs,

        /// Output image (.svg or .png)
        #[arg(short, long)]
        output: PathBuf,

        /// Output resolution in dots per inch
        #[arg(long)]
        dpi: Option<u32>,
    },

    /// Render a grid of charts described by a JSON layout file
    Grid {
        #[command(flatten)]
        input: InputArgs,

        /// JSON file holding an array of chart specs
        #[arg(short, long, value_name = "FILE")]
        layout: PathBuf,

        /// Panels per row
        #[arg(short = 'n', long, default_value = "2")]
        columns: usize,

        /// Output image (.svg or .png)
        #[arg(short, long)]
        output: PathBuf,

        /// Output resolution in dots per inch
        #[arg(long)]
        dpi: Option<u32>,
    },
}

/// Input file and loader overrides shared by every command.
#[derive(Args)]
pub struct InputArgs {
    /// Path to the data file (CSV/TSV, JSON, XLSX/XLS/ODS)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Declared format instead of the file extension (csv, json, excel)
    #[arg(long)]
    pub format: Option<FileFormat>,

    /// Declared text encoding (WHATWG label, e.g. utf-8, gbk, latin1)
    #[arg(long)]
    pub encoding: Option<String>,

    /// Field delimiter for delimited text
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Worksheet name for spreadsheets
    #[arg(long)]
    pub sheet: Option<String>,

    /// Maximum number of rows to load
    #[arg(long)]
    pub max_rows: Option<usize>,
}

#[derive(Args)]
pub struct RoleArgs {
    /// X column
    #[arg(short = 'x', long)]
    pub x: Option<String>,

    /// Y column
    #[arg(short = 'y', long)]
    pub y: Option<String>,

    /// Z column (scatter3d)
    #[arg(short = 'z', long)]
    pub z: Option<String>,

    /// Grouping column
    #[arg(short, long)]
    pub group: Option<String>,

    /// Value column (sankey flow weights)
    #[arg(long)]
    pub value: Option<String>,

    /// Columns for heatmap and radar charts
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Chart title
    #[arg(short, long)]
    pub title: Option<String>,

    /// X axis label
    #[arg(long)]
    pub x_label: Option<String>,

    /// Y axis label
    #[arg(long)]
    pub y_label: Option<String>,
}

#[derive(Args)]
pub struct StyleArgs {
    /// Theme (default, whitegrid, darkgrid, white, dark)
    #[arg(long)]
    pub theme: Option<Theme>,

    /// Palette (viridis, plasma, set1, set2, pastel1, husl)
    #[arg(long)]
    pub palette: Option<PaletteName>,

    /// Font family
    #[arg(long)]
    pub font: Option<String>,

    /// Font size in points
    #[arg(long)]
    pub font_size: Option<f64>,

    /// Figure width in inches
    #[arg(long)]
    pub width: Option<f64>,

    /// Figure height in inches
    #[arg(long)]
    pub height: Option<f64>,

    /// Line width in points
    #[arg(long)]
    pub line_width: Option<f64>,

    /// Marker size in points
    #[arg(long)]
    pub marker_size: Option<f64>,

    /// Fill and marker opacity (0-1)
    #[arg(long)]
    pub opacity: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MissingChoice {
    /// Leave missing values
    Keep,
    /// Drop rows with missing values
    Drop,
    /// Fill numeric columns with the mean
    Mean,
    /// Fill numeric columns with the median
    Median,
    /// Fill with --fill-value
    Constant,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutlierChoice {
    /// Keep outliers
    None,
    /// Drop rows whose |z| exceeds the threshold
    Zscore,
    /// Drop rows outside the IQR fences
    Iqr,
}
