//! Rendering validated chart requests into figures.
//!
//! A [`Figure`] is an owned scene of marks in logical units plus the data
//! series it encodes. Rendering is deterministic: the same dataset and
//! request always give an equal figure, and export only rescales marks.

mod canvas;
mod export;
mod figure;
mod layout;
mod renderers;
pub mod scale;

use log::info;
use serde::{Deserialize, Serialize};

use crate::chart::ChartRequest;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::profile::CorrelationMethod;

pub use export::{ExportOptions, ImageFormat, MAX_EXPORT_PIXELS};
pub use figure::{
    Anchor, Bounds, DataPoint, Figure, LegendEntry, Mark, Panel, Point, Series, UNITS_PER_INCH,
};
pub use layout::{GridFigure, PanelOutcome, PanelStatus, render_grid, render_grid_json};
pub use scale::BinPolicy;

/// Render settings shared by every chart kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Histogram and 2-D heatmap bin count.
    pub bins: BinPolicy,
    /// Coefficient shown by correlation heatmaps.
    pub correlation: CorrelationMethod,
    /// Width and height of each grid panel, in inches.
    pub grid_panel_size: (f64, f64),
    pub export: ExportOptions,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bins: BinPolicy::default(),
            correlation: CorrelationMethod::default(),
            grid_panel_size: (5.0, 4.0),
            export: ExportOptions::default(),
        }
    }
}

/// Render one chart into a figure sized by its style.
pub fn render(request: &ChartRequest, dataset: &Dataset, config: &RenderConfig) -> Result<Figure> {
    let (w, h) = request.style.figure_size;
    let bounds = Bounds::new(0.0, 0.0, w * UNITS_PER_INCH, h * UNITS_PER_INCH);
    let panel = renderers::render_panel(request, dataset, config, bounds)?;

    let figure = Figure {
        width: bounds.width,
        height: bounds.height,
        background: request.style.theme.colors().background,
        font_family: request.style.font_family.clone(),
        panels: vec![panel],
    };
    info!(
        "Rendered {} chart: {} marks, {} points",
        request.kind,
        figure.marks().count(),
        figure.point_count()
    );
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartKind, ChartSpecBuilder, Color};
    use crate::dataset::{Column, ColumnKind, Value};
    use crate::error::TabvizError;
    use chrono::NaiveDate;

    fn sales() -> Dataset {
        let dates = (1..=6)
            .map(|d| {
                NaiveDate::from_ymd_opt(2024, 1, d)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(Value::DateTime)
                    .unwrap_or(Value::Missing)
            })
            .collect();
        Dataset::new(vec![
            Column::new("date", ColumnKind::DateTime, dates),
            Column::categorical(
                "region",
                [Some("north"), Some("south"), Some("north"), Some("south"), Some("east"), None],
            ),
            Column::numeric(
                "revenue",
                [Some(100.0), Some(80.0), None, Some(120.0), Some(90.0), Some(60.0)],
            ),
            Column::numeric(
                "units",
                [Some(10.0), Some(8.0), Some(11.0), Some(12.0), Some(9.0), Some(6.0)],
            ),
            Column::numeric(
                "cost",
                [Some(50.0), Some(45.0), Some(52.0), Some(70.0), Some(40.0), Some(30.0)],
            ),
        ])
        .unwrap()
    }

    fn draw(builder: ChartSpecBuilder) -> Result<Figure> {
        let data = sales();
        let request = builder.build(&data)?;
        render(&request, &data, &RenderConfig::default())
    }

    fn circles(figure: &Figure) -> usize {
        figure
            .marks()
            .filter(|m| matches!(m, Mark::Circle { .. }))
            .count()
    }

    #[test]
    fn test_line_series_skips_incomplete_rows() {
        let fig = draw(ChartSpecBuilder::new(ChartKind::Line).x("date").y("revenue")).unwrap();
        let series: Vec<&Series> = fig.series().collect();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].len(), 5);
        assert_eq!(series[0].points[0].x, 1_704_067_200.0);
        assert_eq!(fig.size_inches(), (8.0, 6.0));
    }

    #[test]
    fn test_line_groups_in_first_appearance_order() {
        let fig = draw(
            ChartSpecBuilder::new(ChartKind::Line)
                .x("date")
                .y("units")
                .group("region"),
        )
        .unwrap();
        let names: Vec<&str> = fig.series().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["north", "south", "east"]);
        assert_eq!(fig.panels[0].legend.len(), 3);
    }

    #[test]
    fn test_scatter_marker_per_point() {
        let fig = draw(ChartSpecBuilder::new(ChartKind::Scatter).x("units").y("cost")).unwrap();
        assert_eq!(circles(&fig), 6);
        assert_eq!(fig.point_count(), 6);
    }

    #[test]
    fn test_bar_means() {
        let fig = draw(ChartSpecBuilder::new(ChartKind::Bar).x("region").y("units")).unwrap();
        let series: Vec<&Series> = fig.series().collect();
        let means: Vec<f64> = series[0].points.iter().map(|p| p.y).collect();
        assert_eq!(means, [10.5, 10.0, 9.0]);
    }

    #[test]
    fn test_pie_sums() {
        let fig = draw(ChartSpecBuilder::new(ChartKind::Pie).x("region").y("units")).unwrap();
        let sums: Vec<f64> = fig.series().flat_map(|s| s.points.iter().map(|p| p.y)).collect();
        assert_eq!(sums, [21.0, 20.0, 9.0]);
        let polygons = fig
            .marks()
            .filter(|m| matches!(m, Mark::Polygon { .. }))
            .count();
        assert_eq!(polygons, 3);
    }

    #[test]
    fn test_pie_rejects_negative_totals() {
        let data = Dataset::new(vec![
            Column::categorical("k", [Some("a"), Some("b")]),
            Column::numeric("v", [Some(3.0), Some(-5.0)]),
        ])
        .unwrap();
        let request = ChartSpecBuilder::new(ChartKind::Pie)
            .x("k")
            .y("v")
            .build(&data)
            .unwrap();
        let err = render(&request, &data, &RenderConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TabvizError::RenderFailure {
                kind: ChartKind::Pie,
                ..
            }
        ));
    }

    #[test]
    fn test_box_five_number_summary() {
        let fig = draw(ChartSpecBuilder::new(ChartKind::BoxPlot).y("units")).unwrap();
        let series: Vec<&Series> = fig.series().collect();
        let summary: Vec<f64> = series[0].points.iter().map(|p| p.y).collect();
        assert_eq!(summary, [6.0, 8.25, 9.5, 10.75, 12.0]);
    }

    #[test]
    fn test_violin_per_group() {
        let fig = draw(ChartSpecBuilder::new(ChartKind::Violin).x("region").y("units")).unwrap();
        assert_eq!(fig.series().count(), 3);
    }

    #[test]
    fn test_distribution_uses_sturges_bins() {
        let fig = draw(ChartSpecBuilder::new(ChartKind::Distribution).x("units")).unwrap();
        let series: Vec<&Series> = fig.series().collect();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].len(), 4);
        let total: f64 = series[0].points.iter().map(|p| p.y).sum();
        assert_eq!(total, 6.0);
        assert_eq!(series[1].name, "units density");
    }

    #[test]
    fn test_fixed_bins() {
        let data = sales();
        let request = ChartSpecBuilder::new(ChartKind::Distribution)
            .x("units")
            .build(&data)
            .unwrap();
        let config = RenderConfig {
            bins: BinPolicy::Fixed(3),
            ..RenderConfig::default()
        };
        let fig = render(&request, &data, &config).unwrap();
        assert_eq!(fig.panels[0].series[0].len(), 3);
    }

    #[test]
    fn test_oversized_bin_count_is_clamped() {
        let data = sales();
        let request = ChartSpecBuilder::new(ChartKind::Distribution)
            .x("units")
            .build(&data)
            .unwrap();
        let config = RenderConfig {
            bins: BinPolicy::Fixed(100_000),
            ..RenderConfig::default()
        };
        let fig = render(&request, &data, &config).unwrap();
        assert_eq!(fig.panels[0].series[0].len(), scale::MAX_BINS);
        let total: f64 = fig.panels[0].series[0].points.iter().map(|p| p.y).sum();
        assert_eq!(total, 6.0);
    }

    #[test]
    fn test_correlation_heatmap() {
        let fig = draw(ChartSpecBuilder::new(ChartKind::Heatmap)).unwrap();
        let series: Vec<&Series> = fig.series().collect();
        // revenue, units, cost
        assert_eq!(series[0].len(), 9);
        let diagonal: Vec<f64> = series[0]
            .points
            .iter()
            .filter(|p| p.x == p.y)
            .filter_map(|p| p.z)
            .collect();
        assert!(diagonal.iter().all(|r| (r - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_binned_heatmap_counts_rows() {
        let fig = draw(ChartSpecBuilder::new(ChartKind::Heatmap).x("units").y("cost")).unwrap();
        let series: Vec<&Series> = fig.series().collect();
        assert_eq!(series[0].len(), 16);
        let total: f64 = series[0].points.iter().filter_map(|p| p.z).sum();
        assert_eq!(total, 6.0);
    }

    #[test]
    fn test_scatter3d_draws_every_point() {
        let fig = draw(
            ChartSpecBuilder::new(ChartKind::Scatter3d)
                .x("units")
                .y("cost")
                .z("revenue"),
        )
        .unwrap();
        assert_eq!(circles(&fig), 5);
        assert_eq!(fig.point_count(), 5);
    }

    #[test]
    fn test_radar_normalizes_means() {
        let fig = draw(
            ChartSpecBuilder::new(ChartKind::Radar)
                .columns(["revenue", "units", "cost"])
                .group("region"),
        )
        .unwrap();
        for series in fig.series() {
            assert_eq!(series.len(), 3);
            assert!(series.points.iter().all(|p| (0.0..=1.0).contains(&p.y)));
        }
    }

    #[test]
    fn test_sankey_counts_flows() {
        let data = Dataset::new(vec![
            Column::categorical("from", [Some("a"), Some("a"), Some("b"), Some("a")]),
            Column::categorical("to", [Some("x"), Some("y"), Some("x"), Some("x")]),
        ])
        .unwrap();
        let request = ChartSpecBuilder::new(ChartKind::Sankey)
            .x("from")
            .y("to")
            .build(&data)
            .unwrap();
        let fig = render(&request, &data, &RenderConfig::default()).unwrap();
        let flows: Vec<f64> = fig.series().flat_map(|s| s.points.iter().filter_map(|p| p.z)).collect();
        assert_eq!(flows, [2.0, 1.0, 1.0]);
    }

    #[test]
    fn test_pairplot_scatters_first_numeric_pair() {
        let fig = draw(ChartSpecBuilder::new(ChartKind::PairPlot).group("region")).unwrap();
        let names: Vec<&str> = fig.series().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["north", "south", "east"]);
        // revenue against units, rows with both present and a region
        assert_eq!(circles(&fig), 4);
        assert_eq!(fig.panels[0].legend.len(), 3);
    }

    #[test]
    fn test_pairplot_needs_two_numeric_columns() {
        let data = Dataset::new(vec![
            Column::numeric("v", [Some(1.0), Some(2.0)]),
            Column::categorical("k", [Some("a"), Some("b")]),
        ])
        .unwrap();
        let request = ChartSpecBuilder::new(ChartKind::PairPlot).build(&data).unwrap();
        let err = render(&request, &data, &RenderConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TabvizError::RenderFailure {
                kind: ChartKind::PairPlot,
                ..
            }
        ));
    }

    #[test]
    fn test_area_baseline() {
        let fig = draw(ChartSpecBuilder::new(ChartKind::Area).x("date").y("units")).unwrap();
        assert!(fig.marks().any(|m| matches!(m, Mark::Polygon { .. })));
        assert_eq!(fig.point_count(), 6);
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = draw(ChartSpecBuilder::new(ChartKind::Violin).x("region").y("cost")).unwrap();
        let b = draw(ChartSpecBuilder::new(ChartKind::Violin).x("region").y("cost")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_theme_background() {
        let style = crate::chart::StyleConfig {
            theme: Some(crate::chart::Theme::Dark),
            ..Default::default()
        };
        let fig = draw(
            ChartSpecBuilder::new(ChartKind::Scatter)
                .x("units")
                .y("cost")
                .style(style),
        )
        .unwrap();
        assert_ne!(fig.background, Color::WHITE);
    }
}
