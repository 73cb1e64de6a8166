//! The owned scene produced by rendering.

use serde::Serialize;

use crate::chart::{ChartKind, Color};

/// Logical units per inch; marks are stored in logical units.
pub const UNITS_PER_INCH: f64 = 100.0;

/// A position in logical units, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// A drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mark", rename_all = "lowercase")]
pub enum Mark {
    Line {
        points: Vec<Point>,
        color: Color,
        width: f64,
        opacity: f64,
    },
    Polygon {
        points: Vec<Point>,
        fill: Color,
        opacity: f64,
        stroke: Option<Color>,
    },
    Rect {
        bounds: Bounds,
        fill: Color,
        opacity: f64,
        stroke: Option<Color>,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Color,
        opacity: f64,
    },
    Text {
        position: Point,
        text: String,
        size: f64,
        color: Color,
        anchor: Anchor,
        /// Rotated to read bottom-to-top.
        vertical: bool,
    },
}

/// A data point in data space.
///
/// Datetime coordinates are seconds since the Unix epoch and categorical
/// coordinates are category positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl DataPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub const fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

/// The data a chart encodes, one entry per drawn series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub color: Color,
    pub points: Vec<DataPoint>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
}

/// One chart (or error placeholder) within a figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub bounds: Bounds,
    /// `None` for a grid entry that is not a readable chart spec.
    pub kind: Option<ChartKind>,
    pub title: String,
    pub marks: Vec<Mark>,
    pub series: Vec<Series>,
    pub legend: Vec<LegendEntry>,
}

/// A complete rendered figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    /// Width in logical units.
    pub width: f64,
    /// Height in logical units.
    pub height: f64,
    pub background: Color,
    pub font_family: String,
    pub panels: Vec<Panel>,
}

impl Figure {
    /// Figure size in inches.
    pub fn size_inches(&self) -> (f64, f64) {
        (self.width / UNITS_PER_INCH, self.height / UNITS_PER_INCH)
    }

    /// All marks, panel by panel.
    pub fn marks(&self) -> impl Iterator<Item = &Mark> {
        self.panels.iter().flat_map(|p| p.marks.iter())
    }

    /// All series, panel by panel.
    pub fn series(&self) -> impl Iterator<Item = &Series> {
        self.panels.iter().flat_map(|p| p.series.iter())
    }

    /// Total number of data points across all series.
    pub fn point_count(&self) -> usize {
        self.series().map(Series::len).sum()
    }
}
