//! SVG and PNG export through plotters.
//!
//! Export rescales the stored marks from logical units to pixels; it never
//! looks at the dataset again.

use std::path::Path;

use log::{info, warn};
use plotters::coord::Shift;
use plotters::prelude::{
    BitMapBackend, Circle, DrawingArea, DrawingBackend, IntoDrawingArea, IntoFont, PathElement,
    Polygon, RGBColor, Rectangle, SVGBackend, Text,
};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color as _, FontTransform, ShapeStyle};
use serde::{Deserialize, Serialize};

use crate::chart::Color;
use crate::error::{Result, TabvizError};

use super::figure::{Anchor, Figure, Mark, Point, UNITS_PER_INCH};

/// Largest exported image side, in pixels.
pub const MAX_EXPORT_PIXELS: u32 = 32_768;

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Svg,
    Png,
}

impl ImageFormat {
    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Some(ImageFormat::Svg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ImageFormat,
    /// Pixels per inch.
    pub dpi: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Svg,
            dpi: 100,
        }
    }
}

impl ExportOptions {
    pub fn new(format: ImageFormat, dpi: u32) -> Self {
        Self { format, dpi }
    }

    fn scale(&self) -> Result<f64> {
        if !(10..=2400).contains(&self.dpi) {
            return Err(TabvizError::Export(format!(
                "dpi must be between 10 and 2400, got {}",
                self.dpi
            )));
        }
        Ok(self.dpi as f64 / UNITS_PER_INCH)
    }
}

impl Figure {
    /// Pixel dimensions at the given DPI.
    pub fn pixel_size(&self, dpi: u32) -> (u32, u32) {
        let scale = dpi as f64 / UNITS_PER_INCH;
        (
            (self.width * scale).round().max(1.0) as u32,
            (self.height * scale).round().max(1.0) as u32,
        )
    }

    fn export_size(&self, options: &ExportOptions) -> Result<(u32, u32)> {
        let scale = options.scale()?;
        let (w, h) = (self.width * scale, self.height * scale);
        let limit = MAX_EXPORT_PIXELS as f64;
        if !(w.is_finite() && h.is_finite()) || w.round() > limit || h.round() > limit {
            return Err(TabvizError::Export(format!(
                "image of {:.0}x{:.0} px exceeds the {} px limit per side",
                w, h, MAX_EXPORT_PIXELS
            )));
        }
        Ok(self.pixel_size(options.dpi))
    }

    /// Render the figure as an SVG document.
    pub fn to_svg(&self, options: &ExportOptions) -> Result<String> {
        let scale = options.scale()?;
        let size = self.export_size(options)?;
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size)
                .into_drawing_area();
            paint(&root, self, scale, true).map_err(export_error)?;
            root.present().map_err(export_error)?;
        }
        Ok(svg)
    }

    /// Write the figure to `path` in the configured format.
    pub fn save(&self, path: impl AsRef<Path>, options: &ExportOptions) -> Result<()> {
        let path = path.as_ref();
        match options.format {
            ImageFormat::Svg => {
                let svg = self.to_svg(options)?;
                std::fs::write(path, svg).map_err(|e| TabvizError::io(path, e))?;
            }
            ImageFormat::Png => {
                let scale = options.scale()?;
                let size = self.export_size(options)?;
                let text = cfg!(feature = "ttf");
                if !text {
                    warn!("PNG export without the `ttf` feature omits text");
                }
                let root = BitMapBackend::new(path, size)
                    .into_drawing_area();
                paint(&root, self, scale, text).map_err(export_error)?;
                root.present().map_err(export_error)?;
            }
        }

        info!(
            "Saved {} figure to {} at {} dpi",
            options.format.extension(),
            path.display(),
            options.dpi
        );
        Ok(())
    }
}

fn export_error(err: impl std::fmt::Display) -> TabvizError {
    TabvizError::Export(err.to_string())
}

fn rgb(color: Color) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

fn px(point: Point, scale: f64) -> (i32, i32) {
    (
        (point.x * scale).round() as i32,
        (point.y * scale).round() as i32,
    )
}

fn stroke(width: f64, scale: f64) -> u32 {
    (width * scale).round().max(1.0) as u32
}

type PaintResult<DB> =
    std::result::Result<(), plotters::drawing::DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

fn paint<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    scale: f64,
    text: bool,
) -> PaintResult<DB> {
    root.fill(&rgb(figure.background))?;

    for mark in figure.marks() {
        match mark {
            Mark::Line {
                points,
                color,
                width,
                opacity,
            } => {
                let style = rgb(*color).mix(*opacity).stroke_width(stroke(*width, scale));
                let coords: Vec<(i32, i32)> = points.iter().map(|p| px(*p, scale)).collect();
                root.draw(&PathElement::new(coords, style))?;
            }
            Mark::Polygon {
                points,
                fill,
                opacity,
                stroke: outline,
            } => {
                let coords: Vec<(i32, i32)> = points.iter().map(|p| px(*p, scale)).collect();
                root.draw(&Polygon::new(coords.clone(), rgb(*fill).mix(*opacity).filled()))?;
                if let Some(outline) = outline {
                    let mut closed = coords;
                    if let Some(first) = closed.first().copied() {
                        closed.push(first);
                    }
                    root.draw(&PathElement::new(closed, rgb(*outline).stroke_width(1)))?;
                }
            }
            Mark::Rect {
                bounds,
                fill,
                opacity,
                stroke: outline,
            } => {
                let corners = [
                    px(Point::new(bounds.x, bounds.y), scale),
                    px(Point::new(bounds.right(), bounds.bottom()), scale),
                ];
                root.draw(&Rectangle::new(corners, rgb(*fill).mix(*opacity).filled()))?;
                if let Some(outline) = outline {
                    root.draw(&Rectangle::new(corners, rgb(*outline).stroke_width(1)))?;
                }
            }
            Mark::Circle {
                center,
                radius,
                fill,
                opacity,
            } => {
                let style: ShapeStyle = rgb(*fill).mix(*opacity).filled();
                let r = (radius * scale).round().max(1.0) as u32;
                root.draw(&Circle::new(px(*center, scale), r, style))?;
            }
            Mark::Text {
                position,
                text: content,
                size,
                color,
                anchor,
                vertical,
            } => {
                if !text || content.is_empty() {
                    continue;
                }
                let h = match anchor {
                    Anchor::Start => HPos::Left,
                    Anchor::Middle => HPos::Center,
                    Anchor::End => HPos::Right,
                };
                let mut font = (figure.font_family.as_str(), size * scale).into_font();
                if *vertical {
                    font = font.transform(FontTransform::Rotate270);
                }
                let style = font
                    .color(&rgb(*color))
                    .pos(Pos::new(h, if *vertical { VPos::Center } else { VPos::Bottom }));
                root.draw(&Text::new(content.clone(), px(*position, scale), style))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;
    use crate::render::figure::{Bounds, Panel};

    fn figure() -> Figure {
        Figure {
            width: 200.0,
            height: 100.0,
            background: Color::WHITE,
            font_family: "sans-serif".to_string(),
            panels: vec![Panel {
                bounds: Bounds::new(0.0, 0.0, 200.0, 100.0),
                kind: Some(ChartKind::Line),
                title: String::new(),
                marks: vec![
                    Mark::Line {
                        points: vec![Point::new(10.0, 10.0), Point::new(190.0, 90.0)],
                        color: Color::BLACK,
                        width: 2.0,
                        opacity: 1.0,
                    },
                    Mark::Text {
                        position: Point::new(100.0, 50.0),
                        text: "hello".to_string(),
                        size: 16.0,
                        color: Color::BLACK,
                        anchor: Anchor::Middle,
                        vertical: false,
                    },
                ],
                series: Vec::new(),
                legend: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ImageFormat::from_path(Path::new("a.SVG")), Some(ImageFormat::Svg));
        assert_eq!(ImageFormat::from_path(Path::new("a.png")), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_path(Path::new("a.pdf")), None);
    }

    #[test]
    fn test_pixel_size_follows_dpi() {
        let fig = figure();
        assert_eq!(fig.pixel_size(100), (200, 100));
        assert_eq!(fig.pixel_size(300), (600, 300));
    }

    #[test]
    fn test_svg_contains_text() {
        let svg = figure().to_svg(&ExportOptions::default()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("hello"));
    }

    #[test]
    fn test_svg_is_deterministic() {
        let fig = figure();
        let options = ExportOptions::new(ImageFormat::Svg, 150);
        assert_eq!(fig.to_svg(&options).unwrap(), fig.to_svg(&options).unwrap());
    }

    #[test]
    fn test_invalid_dpi() {
        let err = figure().to_svg(&ExportOptions::new(ImageFormat::Svg, 0)).unwrap_err();
        assert!(matches!(err, TabvizError::Export(_)));
    }

    #[test]
    fn test_oversized_export_is_rejected() {
        let mut fig = figure();
        fig.width = 2_000.0 * UNITS_PER_INCH;
        let err = fig
            .to_svg(&ExportOptions::new(ImageFormat::Svg, 2400))
            .unwrap_err();
        assert!(matches!(err, TabvizError::Export(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        assert!(fig.save(&path, &ExportOptions::new(ImageFormat::Png, 2400)).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.png");
        figure()
            .save(&path, &ExportOptions::new(ImageFormat::Png, 50))
            .unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
