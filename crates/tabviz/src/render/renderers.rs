//! One renderer per chart kind.

use indexmap::IndexMap;
use log::debug;

use crate::chart::{ChartKind, ChartRequest, Color, Role};
use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{Result, TabvizError};
use crate::profile::NumericStatistics;
use crate::profile::pairwise;

use super::RenderConfig;
use super::canvas::{Axis, Canvas, pt};
use super::figure::{Anchor, Bounds, DataPoint, LegendEntry, Panel, Point, Series};
use super::scale::{
    BandScale, Bin, LinearScale, bin_edges, bin_index, extent, histogram_over, kde, linspace,
    silverman_bandwidth,
};

/// Number of evaluation points for density curves.
const KDE_POINTS: usize = 128;

/// Render one validated request into a panel occupying `bounds`.
pub(crate) fn render_panel(
    request: &ChartRequest,
    dataset: &Dataset,
    config: &RenderConfig,
    bounds: Bounds,
) -> Result<Panel> {
    let mut canvas = Canvas::new(bounds, request);
    let cx = Ctx {
        request,
        dataset,
        config,
    };

    match request.kind {
        ChartKind::Line => line(&cx, &mut canvas, false)?,
        ChartKind::Area => line(&cx, &mut canvas, true)?,
        ChartKind::Bar => bar(&cx, &mut canvas)?,
        ChartKind::Scatter => scatter(&cx, &mut canvas)?,
        ChartKind::Pie => pie(&cx, &mut canvas)?,
        ChartKind::BoxPlot => box_plot(&cx, &mut canvas)?,
        ChartKind::Heatmap => heatmap(&cx, &mut canvas)?,
        ChartKind::Distribution => distribution(&cx, &mut canvas)?,
        ChartKind::Violin => violin(&cx, &mut canvas)?,
        ChartKind::Scatter3d => scatter3d(&cx, &mut canvas)?,
        ChartKind::Radar => radar(&cx, &mut canvas)?,
        ChartKind::Sankey => sankey(&cx, &mut canvas)?,
        ChartKind::PairPlot => pair_plot(&cx, &mut canvas)?,
    }

    Ok(canvas.finish())
}

struct Ctx<'a> {
    request: &'a ChartRequest,
    dataset: &'a Dataset,
    config: &'a RenderConfig,
}

impl<'a> Ctx<'a> {
    fn kind(&self) -> ChartKind {
        self.request.kind
    }

    fn fail(&self, reason: impl Into<String>) -> TabvizError {
        TabvizError::render(self.kind(), reason)
    }

    /// The column bound to a role; the request must have been validated.
    fn column(&self, role: Role) -> Result<&'a Column> {
        let name = self
            .request
            .column(role)
            .ok_or_else(|| self.fail(format!("role {} is not bound", role)))?;
        self.named(name)
    }

    fn named(&self, name: &str) -> Result<&'a Column> {
        self.dataset
            .column(name)
            .ok_or_else(|| self.fail(format!("column '{}' not found", name)))
    }

    fn optional(&self, role: Role) -> Result<Option<&'a Column>> {
        match self.request.column(role) {
            Some(name) => self.named(name).map(Some),
            None => Ok(None),
        }
    }

    /// Rows split by the categories of the column bound to `role`.
    ///
    /// Unbound: a single group holding every row, named `fallback`.
    /// Rows with a missing category are left out.
    fn groups(&self, role: Role, fallback: &str) -> Result<Vec<(String, Vec<usize>)>> {
        let Some(column) = self.optional(role)? else {
            return Ok(vec![(
                fallback.to_string(),
                (0..self.dataset.row_count()).collect(),
            )]);
        };

        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (row, label) in column.labels().enumerate() {
            if let Some(label) = label {
                groups.entry(label).or_default().push(row);
            }
        }
        Ok(groups.into_iter().collect())
    }

    fn opacity(&self) -> f64 {
        self.request.style.opacity
    }

    fn palette(&self, n: usize) -> Vec<Color> {
        self.request.style.palette.colors(n)
    }
}

fn numbers(column: &Column) -> Vec<Option<f64>> {
    column.values.iter().map(|v| v.as_number()).collect()
}

/// Legend entries, only when a grouping column is bound.
fn legend_for(grouped: bool, names: &[String], colors: &[Color]) -> Vec<LegendEntry> {
    if !grouped {
        return Vec::new();
    }
    names
        .iter()
        .zip(colors)
        .map(|(label, color)| LegendEntry {
            label: label.clone(),
            color: *color,
        })
        .collect()
}

/// X coordinate per row: axis value for continuous columns, category position otherwise.
fn x_positions(column: &Column) -> (Vec<Option<f64>>, Option<Vec<String>>) {
    if column.kind.is_continuous() {
        (column.axis_values().collect(), None)
    } else {
        let categories = column.categories();
        let index: IndexMap<&str, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let positions = column
            .labels()
            .map(|l| l.and_then(|l| index.get(l.as_str()).map(|&i| i as f64)))
            .collect();
        (positions, Some(categories))
    }
}

fn x_axis(column: &Column, categories: Option<Vec<String>>, xs: &[f64], range: (f64, f64)) -> Axis {
    match categories {
        Some(categories) => Axis::Band(BandScale::new(categories, range, 0.0)),
        None => {
            let scale = LinearScale::padded(xs.iter().copied(), 0.03, range);
            if column.kind == ColumnKind::DateTime {
                Axis::time(scale)
            } else {
                Axis::linear(scale)
            }
        }
    }
}

/// Line and area charts: one point per complete row, in source order.
fn line(cx: &Ctx, canvas: &mut Canvas, area: bool) -> Result<()> {
    let x = cx.column(Role::X)?;
    let y = cx.column(Role::Y)?;
    let groups = cx.groups(Role::Group, &y.name)?;
    let (xs, categories) = x_positions(x);
    let ys = numbers(y);

    let series: Vec<(String, Vec<DataPoint>)> = groups
        .into_iter()
        .map(|(name, rows)| {
            let points = rows
                .into_iter()
                .filter_map(|r| Some(DataPoint::new(xs[r]?, ys[r]?)))
                .collect();
            (name, points)
        })
        .collect();

    let all: Vec<&DataPoint> = series.iter().flat_map(|(_, p)| p.iter()).collect();
    if all.is_empty() {
        return Err(cx.fail("no rows with both X and Y present"));
    }

    let names: Vec<String> = series.iter().map(|(n, _)| n.clone()).collect();
    let colors = cx.palette(series.len());
    let grouped = cx.request.column(Role::Group).is_some();
    canvas.set_legend(legend_for(grouped, &names, &colors));

    let all_x: Vec<f64> = all.iter().map(|p| p.x).collect();
    let x_axis = x_axis(x, categories, &all_x, canvas.x_range());
    let mut y_scale = LinearScale::padded(all.iter().map(|p| p.y), 0.05, canvas.y_range());
    if area {
        y_scale = y_scale.including(0.0);
    }
    let y_axis = Axis::linear(y_scale);
    canvas.draw_axes(&x_axis, &y_axis);

    let width = pt(canvas.style.line_width);
    let radius = pt(canvas.style.marker_size) / 2.0;
    for ((name, points), color) in series.into_iter().zip(colors) {
        let logical: Vec<Point> = points
            .iter()
            .map(|p| Point::new(x_axis.map(p.x), y_axis.map(p.y)))
            .collect();

        if area && !logical.is_empty() {
            let base = y_axis.map(0.0);
            let mut outline = logical.clone();
            if let (Some(first), Some(last)) = (logical.first(), logical.last()) {
                outline.push(Point::new(last.x, base));
                outline.push(Point::new(first.x, base));
            }
            canvas.polygon(outline, color, cx.opacity() * 0.5, None);
        }
        if logical.len() == 1 {
            canvas.circle(logical[0], radius, color, 1.0);
        }
        canvas.line(logical, color, width);
        canvas.add_series(Series {
            name,
            color,
            points,
        });
    }
    Ok(())
}

fn scatter(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    let x = cx.column(Role::X)?;
    let y = cx.column(Role::Y)?;
    let groups = cx.groups(Role::Group, &y.name)?;
    let xs: Vec<Option<f64>> = x.axis_values().collect();
    let ys = numbers(y);

    let series: Vec<(String, Vec<DataPoint>)> = groups
        .into_iter()
        .map(|(name, rows)| {
            let points = rows
                .into_iter()
                .filter_map(|r| Some(DataPoint::new(xs[r]?, ys[r]?)))
                .collect();
            (name, points)
        })
        .collect();

    let all: Vec<&DataPoint> = series.iter().flat_map(|(_, p)| p.iter()).collect();
    if all.is_empty() {
        return Err(cx.fail("no rows with both X and Y present"));
    }

    let names: Vec<String> = series.iter().map(|(n, _)| n.clone()).collect();
    let colors = cx.palette(series.len());
    canvas.set_legend(legend_for(
        cx.request.column(Role::Group).is_some(),
        &names,
        &colors,
    ));

    let all_x: Vec<f64> = all.iter().map(|p| p.x).collect();
    let x_axis = x_axis(x, None, &all_x, canvas.x_range());
    let y_axis = Axis::linear(LinearScale::padded(all.iter().map(|p| p.y), 0.05, canvas.y_range()));
    canvas.draw_axes(&x_axis, &y_axis);

    let radius = pt(canvas.style.marker_size) / 2.0;
    for ((name, points), color) in series.into_iter().zip(colors) {
        for p in &points {
            canvas.circle(
                Point::new(x_axis.map(p.x), y_axis.map(p.y)),
                radius,
                color,
                cx.opacity(),
            );
        }
        canvas.add_series(Series {
            name,
            color,
            points,
        });
    }
    Ok(())
}

/// Scatter of two numeric columns, picked during validation when unbound.
fn pair_plot(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    if cx.request.column(Role::X).is_none() || cx.request.column(Role::Y).is_none() {
        return Err(cx.fail("needs at least two numeric columns"));
    }
    scatter(cx, canvas)
}

/// Bar chart: mean of Y per X category, grouped side by side.
fn bar(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    let x = cx.column(Role::X)?;
    let y = cx.column(Role::Y)?;
    let groups = cx.groups(Role::Group, &y.name)?;
    let labels: Vec<Option<String>> = x.labels().collect();
    let ys = numbers(y);

    let mut categories: IndexMap<String, ()> = IndexMap::new();
    for (label, value) in labels.iter().zip(&ys) {
        if let (Some(label), Some(_)) = (label, value) {
            categories.entry(label.clone()).or_insert(());
        }
    }
    if categories.is_empty() {
        return Err(cx.fail("no rows with both X and Y present"));
    }
    let categories: Vec<String> = categories.into_keys().collect();

    let means: Vec<(String, Vec<Option<f64>>)> = groups
        .into_iter()
        .map(|(name, rows)| {
            let mut sums = vec![(0.0, 0usize); categories.len()];
            for r in rows {
                let (Some(label), Some(v)) = (&labels[r], ys[r]) else {
                    continue;
                };
                if let Some(i) = categories.iter().position(|c| c == label) {
                    sums[i].0 += v;
                    sums[i].1 += 1;
                }
            }
            let means = sums
                .into_iter()
                .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
                .collect();
            (name, means)
        })
        .collect();

    let names: Vec<String> = means.iter().map(|(n, _)| n.clone()).collect();
    let colors = cx.palette(means.len());
    canvas.set_legend(legend_for(
        cx.request.column(Role::Group).is_some(),
        &names,
        &colors,
    ));

    let values = means.iter().flat_map(|(_, m)| m.iter().flatten().copied());
    let y_scale = LinearScale::padded(values, 0.05, canvas.y_range()).including(0.0);
    let y_axis = Axis::linear(y_scale);
    let band = BandScale::new(categories, canvas.x_range(), 0.2);
    let x_axis = Axis::Band(band.clone());
    canvas.draw_axes(&x_axis, &y_axis);

    let n_groups = means.len().max(1);
    let sub = band.bandwidth() / n_groups as f64;
    let base = y_axis.map(0.0);
    for (g, ((name, group_means), color)) in means.into_iter().zip(colors).enumerate() {
        let mut points = Vec::new();
        for (i, mean) in group_means.iter().enumerate() {
            let Some(mean) = *mean else {
                continue;
            };
            let top = y_axis.map(mean);
            canvas.rect(
                Bounds::new(
                    band.start(i) + sub * g as f64,
                    top.min(base),
                    sub,
                    (base - top).abs(),
                ),
                color,
                cx.opacity(),
                None,
            );
            points.push(DataPoint::new(i as f64, mean));
        }
        canvas.add_series(Series {
            name,
            color,
            points,
        });
    }
    Ok(())
}

/// Pie chart: sum of Y per X category, clockwise from the top.
fn pie(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    let x = cx.column(Role::X)?;
    let y = cx.column(Role::Y)?;
    let ys = numbers(y);

    let mut sums: IndexMap<String, f64> = IndexMap::new();
    for (label, value) in x.labels().zip(&ys) {
        if let (Some(label), Some(v)) = (label, value) {
            *sums.entry(label).or_insert(0.0) += *v;
        }
    }
    if sums.is_empty() {
        return Err(cx.fail("no rows with both X and Y present"));
    }
    if let Some((label, _)) = sums.iter().find(|(_, v)| **v < 0.0) {
        return Err(cx.fail(format!("category '{}' has a negative total", label)));
    }
    let total: f64 = sums.values().sum();
    if total <= 0.0 {
        return Err(cx.fail("total of Y is not positive"));
    }

    let colors = cx.palette(sums.len());
    let names: Vec<String> = sums.keys().cloned().collect();
    canvas.set_legend(legend_for(true, &names, &colors));

    let plot = canvas.plot();
    let center = plot.center();
    let radius = plot.width.min(plot.height) * 0.45;
    let label_font = canvas.font(0.8);
    let background = canvas.colors.panel;

    let mut angle = -90.0_f64;
    let mut points = Vec::new();
    for (i, ((label, value), color)) in sums.iter().zip(&colors).enumerate() {
        points.push(DataPoint::new(i as f64, *value));
        let sweep = value / total * 360.0;
        if sweep <= 0.0 {
            continue;
        }

        let steps = (sweep / 2.0).ceil().max(2.0) as usize;
        let mut outline = vec![center];
        outline.extend(linspace(angle, angle + sweep, steps + 1).into_iter().map(|a| {
            let rad = a.to_radians();
            Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
        }));
        canvas.polygon(outline, *color, 1.0, Some(background));

        let fraction = value / total;
        if fraction >= 0.03 {
            let mid = (angle + sweep / 2.0).to_radians();
            let text_color = contrast(*color);
            canvas.text(
                Point::new(
                    center.x + radius * 0.65 * mid.cos(),
                    center.y + radius * 0.65 * mid.sin() + label_font * 0.35,
                ),
                format!("{:.1}%", fraction * 100.0),
                label_font,
                text_color,
                Anchor::Middle,
            );
        }
        debug!("Pie slice '{}': {:.1}%", label, fraction * 100.0);
        angle += sweep;
    }

    canvas.add_series(Series {
        name: y.name.clone(),
        color: colors.first().copied().unwrap_or(Color::BLACK),
        points,
    });
    Ok(())
}

/// Black or white, whichever reads better on `color`.
fn contrast(color: Color) -> Color {
    let luminance = 0.299 * color.r as f64 + 0.587 * color.g as f64 + 0.114 * color.b as f64;
    if luminance > 140.0 { Color::BLACK } else { Color::WHITE }
}

/// Present Y values per X category (or one group when X is unbound).
fn grouped_values(cx: &Ctx) -> Result<Vec<(String, Vec<f64>)>> {
    let y = cx.column(Role::Y)?;
    let ys = numbers(y);
    let groups = cx.groups(Role::X, &y.name)?;
    let values: Vec<(String, Vec<f64>)> = groups
        .into_iter()
        .map(|(name, rows)| (name, rows.into_iter().filter_map(|r| ys[r]).collect()))
        .collect();
    if values.iter().all(|(_, v)| v.is_empty()) {
        return Err(cx.fail("no numeric values in Y"));
    }
    Ok(values)
}

fn box_plot(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    let groups = grouped_values(cx)?;
    let colors = cx.palette(groups.len());

    let all = groups.iter().flat_map(|(_, v)| v.iter().copied());
    let y_axis = Axis::linear(LinearScale::padded(all, 0.05, canvas.y_range()));
    let names: Vec<String> = groups.iter().map(|(n, _)| n.clone()).collect();
    let band = BandScale::new(names, canvas.x_range(), 0.4);
    canvas.draw_axes(&Axis::Band(band.clone()), &y_axis);

    let stroke = canvas.colors.axis;
    let width = pt(canvas.style.line_width) * 0.6;
    let radius = pt(canvas.style.marker_size) / 2.0;
    for (i, ((name, values), color)) in groups.into_iter().zip(colors).enumerate() {
        let Some(stats) = NumericStatistics::from_values(&values) else {
            continue;
        };
        let (lower, upper) = stats.iqr_bounds(1.5);
        let inside = values.iter().copied().filter(|v| *v >= lower && *v <= upper);
        let (lo, hi) = extent(inside).unwrap_or((stats.q1, stats.q3));

        let center = band.center(i);
        let left = band.start(i);
        let bw = band.bandwidth();
        let cap = bw * 0.25;

        canvas.line(
            vec![Point::new(center, y_axis.map(lo)), Point::new(center, y_axis.map(stats.q1))],
            stroke,
            width,
        );
        canvas.line(
            vec![Point::new(center, y_axis.map(stats.q3)), Point::new(center, y_axis.map(hi))],
            stroke,
            width,
        );
        for v in [lo, hi] {
            canvas.line(
                vec![Point::new(center - cap, y_axis.map(v)), Point::new(center + cap, y_axis.map(v))],
                stroke,
                width,
            );
        }
        let top = y_axis.map(stats.q3);
        canvas.rect(
            Bounds::new(left, top, bw, (y_axis.map(stats.q1) - top).abs()),
            color,
            cx.opacity(),
            Some(stroke),
        );
        canvas.line(
            vec![
                Point::new(left, y_axis.map(stats.median)),
                Point::new(left + bw, y_axis.map(stats.median)),
            ],
            stroke,
            width * 1.5,
        );
        for v in values.iter().filter(|v| **v < lower || **v > upper) {
            canvas.circle(Point::new(center, y_axis.map(*v)), radius, color, cx.opacity());
        }

        canvas.add_series(Series {
            name,
            color,
            points: [lo, stats.q1, stats.median, stats.q3, hi]
                .into_iter()
                .map(|v| DataPoint::new(i as f64, v))
                .collect(),
        });
    }
    Ok(())
}

fn violin(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    let groups = grouped_values(cx)?;
    let colors = cx.palette(groups.len());

    let densities: Vec<(Vec<f64>, Vec<f64>)> = groups
        .iter()
        .map(|(_, values)| {
            let Some((lo, hi)) = extent(values.iter().copied()) else {
                return (Vec::new(), Vec::new());
            };
            let h = silverman_bandwidth(values);
            let grid = linspace(lo - 2.0 * h, hi + 2.0 * h, KDE_POINTS);
            let density = kde(values, h, &grid);
            (grid, density)
        })
        .collect();

    let grid_values = densities.iter().flat_map(|(g, _)| g.iter().copied());
    let y_axis = Axis::linear(LinearScale::padded(grid_values, 0.02, canvas.y_range()));
    let names: Vec<String> = groups.iter().map(|(n, _)| n.clone()).collect();
    let band = BandScale::new(names, canvas.x_range(), 0.2);
    canvas.draw_axes(&Axis::Band(band.clone()), &y_axis);

    let max_density = densities
        .iter()
        .flat_map(|(_, d)| d.iter().copied())
        .fold(0.0_f64, f64::max);
    let half = band.bandwidth() / 2.0;
    let stroke = canvas.colors.axis;

    for (i, (((name, values), (grid, density)), color)) in groups
        .into_iter()
        .zip(densities)
        .zip(colors)
        .enumerate()
    {
        if grid.is_empty() {
            continue;
        }
        let center = band.center(i);
        let offsets: Vec<f64> = density
            .iter()
            .map(|d| if max_density > 0.0 { d / max_density * half } else { 0.0 })
            .collect();

        let mut outline: Vec<Point> = grid
            .iter()
            .zip(&offsets)
            .map(|(y, w)| Point::new(center - w, y_axis.map(*y)))
            .collect();
        outline.extend(
            grid.iter()
                .zip(&offsets)
                .rev()
                .map(|(y, w)| Point::new(center + w, y_axis.map(*y))),
        );
        canvas.polygon(outline, color, cx.opacity(), Some(stroke));

        if let Some(stats) = NumericStatistics::from_values(&values) {
            canvas.line(
                vec![
                    Point::new(center, y_axis.map(stats.q1)),
                    Point::new(center, y_axis.map(stats.q3)),
                ],
                stroke,
                pt(canvas.style.line_width) * 1.5,
            );
            canvas.circle(
                Point::new(center, y_axis.map(stats.median)),
                pt(canvas.style.marker_size) / 2.0,
                Color::WHITE,
                1.0,
            );
        }

        canvas.add_series(Series {
            name,
            color,
            points: grid
                .into_iter()
                .zip(density)
                .map(|(y, d)| DataPoint::new(y, d))
                .collect(),
        });
    }
    Ok(())
}

fn heatmap(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    if cx.request.column(Role::X).is_some() {
        binned_heatmap(cx, canvas)
    } else {
        correlation_heatmap(cx, canvas)
    }
}

/// Correlation matrix of the Columns role.
fn correlation_heatmap(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    let columns: Vec<&Column> = cx
        .request
        .roles
        .columns
        .iter()
        .map(|name| cx.named(name))
        .collect::<Result<_>>()?;
    if columns.len() < 2 {
        return Err(cx.fail("needs at least two numeric columns"));
    }

    let series: Vec<Vec<Option<f64>>> = columns.iter().map(|c| numbers(c)).collect();
    let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let n = names.len();

    let palette = cx.request.style.palette;
    canvas.set_colorbar(-1.0, 1.0, palette);
    let x_band = BandScale::new(names.clone(), canvas.x_range(), 0.0);
    let plot = canvas.plot();
    let y_band = BandScale::new(names, (plot.y, plot.bottom()), 0.0);
    canvas.draw_axes(&Axis::Band(x_band.clone()), &Axis::Band(y_band.clone()));

    let font = canvas.font(0.75);
    let missing = Color::hex(0xbfbfbf);
    let mut points = Vec::new();
    for row in 0..n {
        for col in 0..n {
            let r = pairwise(&series[row], &series[col], cx.config.correlation);
            let fill = r.map(|r| palette.sample((r + 1.0) / 2.0)).unwrap_or(missing);
            canvas.rect(
                Bounds::new(
                    x_band.start(col),
                    y_band.start(row),
                    x_band.bandwidth(),
                    y_band.bandwidth(),
                ),
                fill,
                1.0,
                None,
            );
            let label = r.map(|r| format!("{:.2}", r)).unwrap_or_else(|| "n/a".to_string());
            canvas.text(
                Point::new(x_band.center(col), y_band.center(row) + font * 0.35),
                label,
                font,
                contrast(fill),
                Anchor::Middle,
            );
            if let Some(r) = r {
                points.push(DataPoint::with_z(col as f64, row as f64, r));
            }
        }
    }

    canvas.add_series(Series {
        name: "correlation".to_string(),
        color: palette.sample(1.0),
        points,
    });
    Ok(())
}

/// Two-dimensional histogram of X against Y.
fn binned_heatmap(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    let x = cx.column(Role::X)?;
    let y = cx.column(Role::Y)?;
    let pairs: Vec<(f64, f64)> = numbers(x)
        .into_iter()
        .zip(numbers(y))
        .filter_map(|(a, b)| Some((a?, b?)))
        .collect();
    if pairs.is_empty() {
        return Err(cx.fail("no rows with both X and Y present"));
    }

    let k = cx.config.bins.bin_count(pairs.len());
    let (x_lo, x_hi) = extent(pairs.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_lo, y_hi) = extent(pairs.iter().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (x_start, x_width) = bin_edges(x_lo, x_hi, k);
    let (y_start, y_width) = bin_edges(y_lo, y_hi, k);

    let mut counts = vec![vec![0usize; k]; k];
    for (a, b) in &pairs {
        counts[bin_index(*b, y_start, y_width, k)][bin_index(*a, x_start, x_width, k)] += 1;
    }
    let max = counts.iter().flatten().copied().max().unwrap_or(0).max(1);

    let palette = cx.request.style.palette;
    canvas.set_colorbar(0.0, max as f64, palette);
    let x_axis = Axis::linear(LinearScale::new(
        (x_start, x_start + x_width * k as f64),
        canvas.x_range(),
    ));
    let y_axis = Axis::linear(LinearScale::new(
        (y_start, y_start + y_width * k as f64),
        canvas.y_range(),
    ));

    let mut points = Vec::new();
    for (row, cells) in counts.iter().enumerate() {
        for (col, &count) in cells.iter().enumerate() {
            let x0 = x_start + x_width * col as f64;
            let y0 = y_start + y_width * row as f64;
            let left = x_axis.map(x0);
            let top = y_axis.map(y0 + y_width);
            canvas.rect(
                Bounds::new(
                    left,
                    top,
                    x_axis.map(x0 + x_width) - left,
                    y_axis.map(y0) - top,
                ),
                palette.sample(count as f64 / max as f64),
                1.0,
                None,
            );
            points.push(DataPoint::with_z(
                x0 + x_width / 2.0,
                y0 + y_width / 2.0,
                count as f64,
            ));
        }
    }
    canvas.draw_axes(&x_axis, &y_axis);

    canvas.add_series(Series {
        name: "count".to_string(),
        color: palette.sample(1.0),
        points,
    });
    Ok(())
}

/// Histogram with a density curve per group.
fn distribution(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    let x = cx.column(Role::X)?;
    let xs = numbers(x);
    let groups: Vec<(String, Vec<f64>)> = cx
        .groups(Role::Group, &x.name)?
        .into_iter()
        .map(|(name, rows)| (name, rows.into_iter().filter_map(|r| xs[r]).collect()))
        .collect();

    let total: usize = groups.iter().map(|(_, v)| v.len()).sum();
    let Some((lo, hi)) = extent(groups.iter().flat_map(|(_, v)| v.iter().copied())) else {
        return Err(cx.fail("no numeric values in X"));
    };

    let k = cx.config.bins.bin_count(total);
    let (start, width) = bin_edges(lo, hi, k);
    let end = start + width * k as f64;
    let grid = linspace(start, end, KDE_POINTS);

    struct Layer {
        name: String,
        bins: Vec<Bin>,
        density: Vec<f64>,
        curve: Vec<f64>,
    }

    let layers: Vec<Layer> = groups
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(name, values)| {
            let bins = histogram_over(&values, (lo, hi), k);
            let n = values.len() as f64;
            let density = bins.iter().map(|b| b.count as f64 / (n * b.width())).collect();
            let curve = kde(&values, silverman_bandwidth(&values), &grid);
            Layer {
                name,
                bins,
                density,
                curve,
            }
        })
        .collect();

    let names: Vec<String> = layers.iter().map(|l| l.name.clone()).collect();
    let colors = cx.palette(layers.len());
    canvas.set_legend(legend_for(
        cx.request.column(Role::Group).is_some(),
        &names,
        &colors,
    ));

    let peak = layers
        .iter()
        .flat_map(|l| l.density.iter().chain(l.curve.iter()).copied())
        .fold(0.0_f64, f64::max);
    let x_axis = Axis::linear(LinearScale::padded([start, end], 0.02, canvas.x_range()));
    let y_axis = Axis::linear(LinearScale::new((0.0, peak * 1.05), canvas.y_range()));
    canvas.draw_axes(&x_axis, &y_axis);

    let alpha = if layers.len() > 1 { cx.opacity() * 0.6 } else { cx.opacity() };
    let stroke = canvas.colors.panel;
    let line_width = pt(canvas.style.line_width);
    for (layer, color) in layers.into_iter().zip(colors) {
        for (bin, d) in layer.bins.iter().zip(&layer.density) {
            let left = x_axis.map(bin.start);
            let top = y_axis.map(*d);
            canvas.rect(
                Bounds::new(left, top, x_axis.map(bin.end) - left, y_axis.map(0.0) - top),
                color,
                alpha,
                Some(stroke),
            );
        }
        canvas.line(
            grid.iter()
                .zip(&layer.curve)
                .map(|(gx, gy)| Point::new(x_axis.map(*gx), y_axis.map(*gy)))
                .collect(),
            color,
            line_width,
        );

        canvas.add_series(Series {
            name: layer.name.clone(),
            color,
            points: layer
                .bins
                .iter()
                .map(|b| DataPoint::new(b.center(), b.count as f64))
                .collect(),
        });
        canvas.add_series(Series {
            name: format!("{} density", layer.name),
            color,
            points: grid
                .iter()
                .zip(&layer.curve)
                .map(|(gx, gy)| DataPoint::new(*gx, *gy))
                .collect(),
        });
    }
    Ok(())
}

/// Orthographic projection of the unit cube.
struct Projection {
    azimuth: f64,
    elevation: f64,
    center: Point,
    scale: f64,
}

impl Projection {
    /// Screen position and depth (larger is farther) of a normalized point.
    fn project(&self, x: f64, y: f64, z: f64) -> (Point, f64) {
        let (sa, ca) = self.azimuth.sin_cos();
        let (se, ce) = self.elevation.sin_cos();
        let rx = x * ca - y * sa;
        let ry = x * sa + y * ca;
        let up = z * ce - ry * se;
        let depth = ry * ce + z * se;
        (
            Point::new(self.center.x + rx * self.scale, self.center.y - up * self.scale),
            depth,
        )
    }
}

fn normalizer(values: impl IntoIterator<Item = f64>) -> impl Fn(f64) -> f64 {
    let (lo, hi) = extent(values).unwrap_or((0.0, 1.0));
    move |v| if hi > lo { (v - lo) / (hi - lo) * 2.0 - 1.0 } else { 0.0 }
}

fn scatter3d(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    let xs = numbers(cx.column(Role::X)?);
    let ys = numbers(cx.column(Role::Y)?);
    let zs = numbers(cx.column(Role::Z)?);
    let z_name = cx.column(Role::Z)?.name.clone();
    let groups = cx.groups(Role::Group, "points")?;

    let series: Vec<(String, Vec<DataPoint>)> = groups
        .into_iter()
        .map(|(name, rows)| {
            let points = rows
                .into_iter()
                .filter_map(|r| Some(DataPoint::with_z(xs[r]?, ys[r]?, zs[r]?)))
                .collect();
            (name, points)
        })
        .collect();

    let all: Vec<DataPoint> = series.iter().flat_map(|(_, p)| p.iter().copied()).collect();
    if all.is_empty() {
        return Err(cx.fail("no rows with X, Y and Z present"));
    }

    let names: Vec<String> = series.iter().map(|(n, _)| n.clone()).collect();
    let colors = cx.palette(series.len());
    canvas.set_legend(legend_for(
        cx.request.column(Role::Group).is_some(),
        &names,
        &colors,
    ));

    let nx = normalizer(all.iter().map(|p| p.x));
    let ny = normalizer(all.iter().map(|p| p.y));
    let nz = normalizer(all.iter().filter_map(|p| p.z));

    let plot = canvas.plot();
    let projection = Projection {
        azimuth: (-60.0_f64).to_radians(),
        elevation: 25.0_f64.to_radians(),
        center: plot.center(),
        scale: plot.width.min(plot.height) / 3.6,
    };

    let edge = canvas.colors.grid.unwrap_or(canvas.colors.axis);
    let corners = [-1.0, 1.0];
    for &a in &corners {
        for &b in &corners {
            let edges = [
                ((-1.0, a, b), (1.0, a, b)),
                ((a, -1.0, b), (a, 1.0, b)),
                ((a, b, -1.0), (a, b, 1.0)),
            ];
            for ((x0, y0, z0), (x1, y1, z1)) in edges {
                let (p0, _) = projection.project(x0, y0, z0);
                let (p1, _) = projection.project(x1, y1, z1);
                canvas.line(vec![p0, p1], edge, 0.8);
            }
        }
    }

    let font = canvas.font(0.9);
    let text = canvas.colors.text;
    let labels = [
        ((0.0, -1.25, -1.0), cx.request.x_label.clone()),
        ((1.25, 0.0, -1.0), cx.request.y_label.clone()),
        ((-1.0, -1.25, 0.0), z_name),
    ];
    for ((x, y, z), label) in labels {
        let (p, _) = projection.project(x, y, z);
        canvas.text(p, label, font, text, Anchor::Middle);
    }

    let radius = pt(canvas.style.marker_size) / 2.0;
    let mut drawn: Vec<(f64, usize, Point, Color)> = Vec::new();
    for ((_, points), color) in series.iter().zip(&colors) {
        for p in points {
            let (screen, depth) = projection.project(nx(p.x), ny(p.y), nz(p.z.unwrap_or(0.0)));
            drawn.push((depth, drawn.len(), screen, *color));
        }
    }
    drawn.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, _, screen, color) in drawn {
        canvas.circle(screen, radius, color, cx.opacity());
    }

    for ((name, points), color) in series.into_iter().zip(colors) {
        canvas.add_series(Series {
            name,
            color,
            points,
        });
    }
    Ok(())
}

/// Radar chart of per-group column means, each axis scaled to the column's range.
fn radar(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    let columns: Vec<&Column> = cx
        .request
        .roles
        .columns
        .iter()
        .map(|name| cx.named(name))
        .collect::<Result<_>>()?;
    if columns.len() < 3 {
        return Err(cx.fail("needs at least three numeric columns"));
    }

    let mut ranges = Vec::with_capacity(columns.len());
    for column in &columns {
        let range = extent(column.present_numbers())
            .ok_or_else(|| cx.fail(format!("column '{}' has no values", column.name)))?;
        ranges.push(range);
    }

    let groups = cx.groups(Role::Group, "mean")?;
    let values: Vec<Vec<Option<f64>>> = columns.iter().map(|c| numbers(c)).collect();

    let profiles: Vec<(String, Vec<(f64, f64)>)> = groups
        .into_iter()
        .map(|(name, rows)| {
            let axes = values
                .iter()
                .zip(&ranges)
                .map(|(col, &(lo, hi))| {
                    let present: Vec<f64> = rows.iter().filter_map(|&r| col[r]).collect();
                    if present.is_empty() {
                        return (0.0, lo);
                    }
                    let mean = present.iter().sum::<f64>() / present.len() as f64;
                    let scaled = if hi > lo { (mean - lo) / (hi - lo) } else { 0.5 };
                    (scaled, mean)
                })
                .collect();
            (name, axes)
        })
        .collect();

    let names: Vec<String> = profiles.iter().map(|(n, _)| n.clone()).collect();
    let colors = cx.palette(profiles.len());
    canvas.set_legend(legend_for(
        cx.request.column(Role::Group).is_some(),
        &names,
        &colors,
    ));

    let plot = canvas.plot();
    let center = plot.center();
    let radius = plot.width.min(plot.height) * 0.38;
    let n = columns.len();
    let angle = |i: usize| (-90.0 + 360.0 * i as f64 / n as f64).to_radians();
    let at = |i: usize, r: f64| {
        let a = angle(i);
        Point::new(center.x + radius * r * a.cos(), center.y + radius * r * a.sin())
    };

    let grid = canvas.colors.grid.unwrap_or(Color::hex(0xcccccc));
    for ring in [0.25, 0.5, 0.75, 1.0] {
        let mut outline: Vec<Point> = (0..n).map(|i| at(i, ring)).collect();
        outline.push(at(0, ring));
        canvas.line(outline, grid, 0.8);
    }
    let font = canvas.font(0.85);
    let text = canvas.colors.text;
    for (i, column) in columns.iter().enumerate() {
        canvas.line(vec![center, at(i, 1.0)], grid, 0.8);
        let cos = angle(i).cos();
        let anchor = if cos > 0.2 {
            Anchor::Start
        } else if cos < -0.2 {
            Anchor::End
        } else {
            Anchor::Middle
        };
        let p = at(i, 1.1);
        canvas.text(Point::new(p.x, p.y + font * 0.35), column.name.clone(), font, text, anchor);
    }

    let width = pt(canvas.style.line_width);
    for ((name, axes), color) in profiles.into_iter().zip(colors) {
        let outline: Vec<Point> = axes.iter().enumerate().map(|(i, (s, _))| at(i, *s)).collect();
        canvas.polygon(outline.clone(), color, cx.opacity() * 0.3, None);
        let mut closed = outline;
        if let Some(first) = closed.first().copied() {
            closed.push(first);
        }
        canvas.line(closed, color, width);

        canvas.add_series(Series {
            name,
            color,
            points: axes
                .into_iter()
                .enumerate()
                .map(|(i, (s, mean))| DataPoint::with_z(i as f64, s, mean))
                .collect(),
        });
    }
    Ok(())
}

/// Sankey diagram of flows from X categories to Y categories.
fn sankey(cx: &Ctx, canvas: &mut Canvas) -> Result<()> {
    let source = cx.column(Role::X)?;
    let target = cx.column(Role::Y)?;
    let weights: Option<Vec<Option<f64>>> = cx.optional(Role::Value)?.map(numbers);

    let mut flows: IndexMap<(String, String), f64> = IndexMap::new();
    let mut skipped = 0usize;
    for (row, (s, t)) in source.labels().zip(target.labels()).enumerate() {
        let (Some(s), Some(t)) = (s, t) else {
            continue;
        };
        let w = match &weights {
            Some(w) => match w[row] {
                Some(v) if v > 0.0 => v,
                _ => {
                    skipped += 1;
                    continue;
                }
            },
            None => 1.0,
        };
        *flows.entry((s, t)).or_insert(0.0) += w;
    }
    if skipped > 0 {
        debug!("Sankey skipped {} rows without a positive value", skipped);
    }
    if flows.is_empty() {
        return Err(cx.fail("no flows between X and Y"));
    }

    let mut sources: IndexMap<String, f64> = IndexMap::new();
    let mut targets: IndexMap<String, f64> = IndexMap::new();
    for ((s, t), w) in &flows {
        *sources.entry(s.clone()).or_insert(0.0) += w;
        *targets.entry(t.clone()).or_insert(0.0) += w;
    }
    let total: f64 = flows.values().sum();

    let colors = cx.palette(sources.len() + targets.len());
    let plot = canvas.plot();
    let node_w = plot.width * 0.04;
    let left_x = plot.x + plot.width * 0.2;
    let right_x = plot.right() - plot.width * 0.2 - node_w;

    let layout = |nodes: &IndexMap<String, f64>| -> Vec<(f64, f64)> {
        let gap = plot.height * 0.03;
        let usable = plot.height - gap * nodes.len().saturating_sub(1) as f64;
        let mut y = plot.y;
        nodes
            .values()
            .map(|w| {
                let h = w / total * usable;
                let top = y;
                y += h + gap;
                (top, h)
            })
            .collect()
    };
    let source_pos = layout(&sources);
    let target_pos = layout(&targets);
    let usable_scale = |w: f64, nodes: usize| {
        (plot.height - plot.height * 0.03 * nodes.saturating_sub(1) as f64) * w / total
    };

    let font = canvas.font(0.85);
    let text = canvas.colors.text;

    let mut source_offset = vec![0.0; sources.len()];
    let mut target_offset = vec![0.0; targets.len()];
    let mut points = Vec::new();
    for ((s, t), w) in &flows {
        let si = sources.get_index_of(s).unwrap_or(0);
        let ti = targets.get_index_of(t).unwrap_or(0);
        let sh = usable_scale(*w, sources.len());
        let th = usable_scale(*w, targets.len());
        let s_top = source_pos[si].0 + source_offset[si];
        let t_top = target_pos[ti].0 + target_offset[ti];
        source_offset[si] += sh;
        target_offset[ti] += th;

        let x0 = left_x + node_w;
        let x1 = right_x;
        let mut outline = bezier(Point::new(x0, s_top), Point::new(x1, t_top));
        let mut lower = bezier(Point::new(x1, t_top + th), Point::new(x0, s_top + sh));
        outline.append(&mut lower);
        canvas.polygon(outline, colors[si], cx.opacity() * 0.5, None);

        points.push(DataPoint::with_z(si as f64, ti as f64, *w));
    }

    for (i, ((name, _), (top, h))) in sources.iter().zip(&source_pos).enumerate() {
        canvas.rect(Bounds::new(left_x, *top, node_w, *h), colors[i], 1.0, None);
        canvas.text(
            Point::new(left_x - font * 0.5, top + h / 2.0 + font * 0.35),
            name.clone(),
            font,
            text,
            Anchor::End,
        );
    }
    for (i, ((name, _), (top, h))) in targets.iter().zip(&target_pos).enumerate() {
        canvas.rect(
            Bounds::new(right_x, *top, node_w, *h),
            colors[sources.len() + i],
            1.0,
            None,
        );
        canvas.text(
            Point::new(right_x + node_w + font * 0.5, top + h / 2.0 + font * 0.35),
            name.clone(),
            font,
            text,
            Anchor::Start,
        );
    }

    canvas.add_series(Series {
        name: "flows".to_string(),
        color: colors.first().copied().unwrap_or(Color::BLACK),
        points,
    });
    Ok(())
}

/// Horizontal S-curve from `a` to `b`.
fn bezier(a: Point, b: Point) -> Vec<Point> {
    let mid = (a.x + b.x) / 2.0;
    let (c1, c2) = (Point::new(mid, a.y), Point::new(mid, b.y));
    linspace(0.0, 1.0, 24)
        .into_iter()
        .map(|t| {
            let u = 1.0 - t;
            let x = u * u * u * a.x + 3.0 * u * u * t * c1.x + 3.0 * u * t * t * c2.x + t * t * t * b.x;
            let y = u * u * u * a.y + 3.0 * u * u * t * c1.y + 3.0 * u * t * t * c2.y + t * t * t * b.y;
            Point::new(x, y)
        })
        .collect()
}
