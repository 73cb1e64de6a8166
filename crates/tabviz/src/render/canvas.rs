//! Panel drawing surface: plot area, axes, legend, and colour bar.

use crate::chart::{ChartKind, ChartRequest, Color, PaletteName, Style, ThemeColors};

use super::figure::{Anchor, Bounds, LegendEntry, Mark, Panel, Point, Series, UNITS_PER_INCH};
use super::scale::{BandScale, LinearScale, format_tick, format_time_tick};

/// Convert points (1/72 inch) to logical units.
pub(crate) fn pt(points: f64) -> f64 {
    points * UNITS_PER_INCH / 72.0
}

/// A positional axis.
#[derive(Debug, Clone)]
pub(crate) enum Axis {
    Linear { scale: LinearScale, time: bool },
    Band(BandScale),
}

impl Axis {
    pub fn linear(scale: LinearScale) -> Self {
        Axis::Linear { scale, time: false }
    }

    pub fn time(scale: LinearScale) -> Self {
        Axis::Linear { scale, time: true }
    }

    /// Logical position of a data coordinate.
    pub fn map(&self, value: f64) -> f64 {
        match self {
            Axis::Linear { scale, .. } => scale.map(value),
            Axis::Band(band) => band.map(value),
        }
    }

    /// Tick positions (logical) and labels.
    fn ticks(&self, count: usize) -> Vec<(f64, String)> {
        match self {
            Axis::Linear { scale, time } => {
                let span = scale.domain.1 - scale.domain.0;
                scale
                    .ticks(count)
                    .into_iter()
                    .map(|t| {
                        let label = if *time {
                            format_time_tick(t, span)
                        } else {
                            format_tick(t)
                        };
                        (scale.map(t), label)
                    })
                    .collect()
            }
            Axis::Band(band) => band
                .categories
                .iter()
                .enumerate()
                .map(|(i, c)| (band.center(i), c.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ColorBar {
    lo: f64,
    hi: f64,
    palette: PaletteName,
}

/// Collects marks and series for one panel.
pub(crate) struct Canvas<'a> {
    bounds: Bounds,
    kind: ChartKind,
    title: &'a str,
    x_label: &'a str,
    y_label: &'a str,
    pub style: &'a Style,
    pub colors: ThemeColors,
    marks: Vec<Mark>,
    series: Vec<Series>,
    legend: Vec<LegendEntry>,
    colorbar: Option<ColorBar>,
    reserve_right: bool,
}

impl<'a> Canvas<'a> {
    pub fn new(bounds: Bounds, request: &'a ChartRequest) -> Self {
        Self {
            bounds,
            kind: request.kind,
            title: &request.title,
            x_label: &request.x_label,
            y_label: &request.y_label,
            style: &request.style,
            colors: request.style.theme.colors(),
            marks: Vec::new(),
            series: Vec::new(),
            legend: Vec::new(),
            colorbar: None,
            reserve_right: false,
        }
    }

    /// Text height for the configured font size, scaled by `factor`.
    pub fn font(&self, factor: f64) -> f64 {
        pt(self.style.font_size) * factor
    }

    /// Inner area where data is drawn.
    pub fn plot(&self) -> Bounds {
        let f = self.font(1.0);
        let left = if self.y_label.is_empty() { 3.5 * f } else { 5.0 * f };
        let bottom = if self.x_label.is_empty() { 2.2 * f } else { 3.6 * f };
        let top = if self.title.is_empty() { 1.0 * f } else { 2.6 * f };
        let right = if self.reserve_right { 9.0 * f } else { 1.2 * f };

        let width = (self.bounds.width - left - right).max(1.0);
        let height = (self.bounds.height - top - bottom).max(1.0);
        Bounds::new(self.bounds.x + left, self.bounds.y + top, width, height)
    }

    /// Horizontal logical range of the plot area.
    pub fn x_range(&self) -> (f64, f64) {
        let plot = self.plot();
        (plot.x, plot.right())
    }

    /// Vertical logical range of the plot area, bottom to top.
    pub fn y_range(&self) -> (f64, f64) {
        let plot = self.plot();
        (plot.bottom(), plot.y)
    }

    /// Legend entries, drawn in the right margin.
    pub fn set_legend(&mut self, entries: Vec<LegendEntry>) {
        if !entries.is_empty() {
            self.reserve_right = true;
        }
        self.legend = entries;
    }

    /// Continuous colour scale, drawn in the right margin.
    pub fn set_colorbar(&mut self, lo: f64, hi: f64, palette: PaletteName) {
        self.reserve_right = true;
        self.colorbar = Some(ColorBar { lo, hi, palette });
    }

    /// Grid lines, axis lines, ticks and axis labels.
    pub fn draw_axes(&mut self, x: &Axis, y: &Axis) {
        let plot = self.plot();
        let tick_font = self.font(0.8);
        let tick_len = self.font(0.3);
        let axis = self.colors.axis;
        let text = self.colors.text;

        let x_ticks = x.ticks(6);
        let y_ticks = y.ticks(5);

        if let Some(grid) = self.colors.grid {
            for (pos, _) in &x_ticks {
                self.line(
                    vec![Point::new(*pos, plot.y), Point::new(*pos, plot.bottom())],
                    grid,
                    0.8,
                );
            }
            for (pos, _) in &y_ticks {
                self.line(
                    vec![Point::new(plot.x, *pos), Point::new(plot.right(), *pos)],
                    grid,
                    0.8,
                );
            }
        }

        self.line(
            vec![Point::new(plot.x, plot.bottom()), Point::new(plot.right(), plot.bottom())],
            axis,
            1.0,
        );
        self.line(
            vec![Point::new(plot.x, plot.y), Point::new(plot.x, plot.bottom())],
            axis,
            1.0,
        );
        if self.colors.frame {
            self.line(
                vec![Point::new(plot.x, plot.y), Point::new(plot.right(), plot.y)],
                axis,
                1.0,
            );
            self.line(
                vec![Point::new(plot.right(), plot.y), Point::new(plot.right(), plot.bottom())],
                axis,
                1.0,
            );
        }

        for (pos, label) in x_ticks {
            self.line(
                vec![Point::new(pos, plot.bottom()), Point::new(pos, plot.bottom() + tick_len)],
                axis,
                1.0,
            );
            self.text(
                Point::new(pos, plot.bottom() + tick_len + tick_font),
                label,
                tick_font,
                text,
                Anchor::Middle,
            );
        }
        for (pos, label) in y_ticks {
            self.line(
                vec![Point::new(plot.x - tick_len, pos), Point::new(plot.x, pos)],
                axis,
                1.0,
            );
            self.text(
                Point::new(plot.x - tick_len * 1.5, pos + tick_font * 0.35),
                label,
                tick_font,
                text,
                Anchor::End,
            );
        }

        let label_font = self.font(1.0);
        if !self.x_label.is_empty() {
            self.text(
                Point::new(plot.x + plot.width / 2.0, plot.bottom() + tick_font * 2.0 + label_font * 1.2),
                self.x_label.to_string(),
                label_font,
                text,
                Anchor::Middle,
            );
        }
        if !self.y_label.is_empty() {
            self.marks.push(Mark::Text {
                position: Point::new(self.bounds.x + label_font * 1.2, plot.y + plot.height / 2.0),
                text: self.y_label.to_string(),
                size: label_font,
                color: text,
                anchor: Anchor::Middle,
                vertical: true,
            });
        }
    }

    pub fn line(&mut self, points: Vec<Point>, color: Color, width: f64) {
        self.marks.push(Mark::Line {
            points,
            color,
            width,
            opacity: 1.0,
        });
    }

    pub fn polygon(&mut self, points: Vec<Point>, fill: Color, opacity: f64, stroke: Option<Color>) {
        self.marks.push(Mark::Polygon {
            points,
            fill,
            opacity,
            stroke,
        });
    }

    pub fn rect(&mut self, bounds: Bounds, fill: Color, opacity: f64, stroke: Option<Color>) {
        self.marks.push(Mark::Rect {
            bounds,
            fill,
            opacity,
            stroke,
        });
    }

    pub fn circle(&mut self, center: Point, radius: f64, fill: Color, opacity: f64) {
        self.marks.push(Mark::Circle {
            center,
            radius,
            fill,
            opacity,
        });
    }

    pub fn text(&mut self, position: Point, text: String, size: f64, color: Color, anchor: Anchor) {
        self.marks.push(Mark::Text {
            position,
            text,
            size,
            color,
            anchor,
            vertical: false,
        });
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    /// Add the panel background, title, legend and colour bar, and return the panel.
    pub fn finish(mut self) -> Panel {
        let plot = self.plot();
        let mut marks = vec![Mark::Rect {
            bounds: plot,
            fill: self.colors.panel,
            opacity: 1.0,
            stroke: None,
        }];
        marks.append(&mut self.marks);
        self.marks = marks;

        if !self.title.is_empty() {
            let size = self.font(1.2);
            self.text(
                Point::new(plot.x + plot.width / 2.0, self.bounds.y + size * 1.4),
                self.title.to_string(),
                size,
                self.colors.text,
                Anchor::Middle,
            );
        }

        let margin_x = plot.right() + self.font(1.0);
        let mut cursor = plot.y;
        let font = self.font(0.85);
        for entry in self.legend.clone() {
            self.rect(
                Bounds::new(margin_x, cursor, font, font),
                entry.color,
                1.0,
                None,
            );
            self.text(
                Point::new(margin_x + font * 1.5, cursor + font * 0.85),
                entry.label,
                font,
                self.colors.text,
                Anchor::Start,
            );
            cursor += font * 1.6;
        }

        if let Some(bar) = self.colorbar {
            let steps = 32;
            let height = plot.height * 0.8;
            let top = plot.y + (plot.height - height) / 2.0;
            let width = self.font(1.0);
            let step_h = height / steps as f64;
            for i in 0..steps {
                let t = 1.0 - (i as f64 + 0.5) / steps as f64;
                self.rect(
                    Bounds::new(margin_x, top + step_h * i as f64, width, step_h + 0.5),
                    bar.palette.sample(t),
                    1.0,
                    None,
                );
            }
            self.text(
                Point::new(margin_x + width * 1.4, top + font * 0.5),
                format_tick(bar.hi),
                font,
                self.colors.text,
                Anchor::Start,
            );
            self.text(
                Point::new(margin_x + width * 1.4, top + height),
                format_tick(bar.lo),
                font,
                self.colors.text,
                Anchor::Start,
            );
        }

        Panel {
            bounds: self.bounds,
            kind: Some(self.kind),
            title: self.title.to_string(),
            marks: self.marks,
            series: self.series,
            legend: self.legend,
        }
    }
}

/// A panel that reports a failure instead of a chart.
pub(crate) fn placeholder(
    bounds: Bounds,
    kind: Option<ChartKind>,
    style: &Style,
    message: &str,
) -> Panel {
    let colors = style.theme.colors();
    let size = pt(style.font_size);
    let inset = size;
    let inner = Bounds::new(
        bounds.x + inset,
        bounds.y + inset,
        (bounds.width - 2.0 * inset).max(1.0),
        (bounds.height - 2.0 * inset).max(1.0),
    );
    let center = inner.center();

    let marks = vec![
        Mark::Rect {
            bounds: inner,
            fill: colors.panel,
            opacity: 1.0,
            stroke: Some(colors.axis),
        },
        Mark::Text {
            position: Point::new(center.x, center.y - size * 0.8),
            text: match kind {
                Some(kind) => format!("{} chart unavailable", kind),
                None => "chart unavailable".to_string(),
            },
            size: size * 1.1,
            color: colors.text,
            anchor: Anchor::Middle,
            vertical: false,
        },
        Mark::Text {
            position: Point::new(center.x, center.y + size * 0.8),
            text: message.to_string(),
            size: size * 0.8,
            color: colors.text,
            anchor: Anchor::Middle,
            vertical: false,
        },
    ];

    Panel {
        bounds,
        kind,
        title: String::new(),
        marks,
        series: Vec::new(),
        legend: Vec::new(),
    }
}
