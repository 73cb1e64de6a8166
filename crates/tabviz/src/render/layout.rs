//! Multi-panel grid rendering.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::chart::{ChartKind, ChartSpec, MAX_FIGURE_INCHES, Style, is_valid_figure_size};
use crate::dataset::Dataset;
use crate::error::{Result, TabvizError};

use super::RenderConfig;
use super::canvas::placeholder;
use super::figure::{Bounds, Figure, UNITS_PER_INCH};
use super::renderers::render_panel;

/// Result of one grid panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PanelStatus {
    Rendered,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelOutcome {
    /// Position of the spec in the input list.
    pub index: usize,
    /// `None` when the entry could not be read as a chart spec.
    pub kind: Option<ChartKind>,
    #[serde(flatten)]
    pub status: PanelStatus,
}

impl PanelOutcome {
    pub fn is_rendered(&self) -> bool {
        self.status == PanelStatus::Rendered
    }
}

/// A grid figure and what happened to each panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridFigure {
    pub figure: Figure,
    pub outcomes: Vec<PanelOutcome>,
}

impl GridFigure {
    pub fn failed(&self) -> impl Iterator<Item = &PanelOutcome> {
        self.outcomes.iter().filter(|o| !o.is_rendered())
    }
}

/// Render `specs` row by row into a grid with `columns` panels per row.
///
/// A panel that fails validation or rendering is replaced by a placeholder;
/// the remaining panels are unaffected.
pub fn render_grid(
    specs: &[ChartSpec],
    dataset: &Dataset,
    columns: usize,
    config: &RenderConfig,
) -> Result<GridFigure> {
    let entries: Vec<Entry> = specs.iter().map(Ok).collect();
    layout(&entries, dataset, columns, config)
}

/// Render a grid from raw JSON values, one chart spec each.
///
/// An element that is not a valid chart spec (an unknown `kind`, a missing
/// field) becomes a failed panel like any other.
pub fn render_grid_json(
    specs: &[serde_json::Value],
    dataset: &Dataset,
    columns: usize,
    config: &RenderConfig,
) -> Result<GridFigure> {
    let parsed: Vec<std::result::Result<ChartSpec, String>> = specs
        .iter()
        .map(|value| {
            ChartSpec::deserialize(value).map_err(|e| format!("invalid chart spec: {}", e))
        })
        .collect();
    let entries: Vec<Entry> = parsed
        .iter()
        .map(|p| p.as_ref().map_err(String::as_str))
        .collect();
    layout(&entries, dataset, columns, config)
}

type Entry<'a> = std::result::Result<&'a ChartSpec, &'a str>;

fn layout(
    entries: &[Entry],
    dataset: &Dataset,
    columns: usize,
    config: &RenderConfig,
) -> Result<GridFigure> {
    if entries.is_empty() {
        return Err(TabvizError::Config("grid needs at least one chart".to_string()));
    }
    if columns == 0 {
        return Err(TabvizError::Config("grid needs at least one column".to_string()));
    }
    if !is_valid_figure_size(config.grid_panel_size) {
        return Err(TabvizError::Config(format!(
            "grid panel size must be positive and at most {} inches, got {:?}",
            MAX_FIGURE_INCHES, config.grid_panel_size
        )));
    }

    let columns = columns.min(entries.len());
    let rows = entries.len().div_ceil(columns);
    let (panel_w, panel_h) = config.grid_panel_size;
    let (panel_w, panel_h) = (panel_w * UNITS_PER_INCH, panel_h * UNITS_PER_INCH);

    let first_style: Style = entries
        .iter()
        .find_map(|e| e.ok())
        .map(|spec| spec.style.normalize())
        .unwrap_or_default();
    let mut panels = Vec::with_capacity(entries.len());
    let mut outcomes = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let bounds = Bounds::new(
            (index % columns) as f64 * panel_w,
            (index / columns) as f64 * panel_h,
            panel_w,
            panel_h,
        );

        let (kind, rendered) = match entry {
            Ok(spec) => (
                Some(spec.kind),
                spec.validate(dataset)
                    .and_then(|request| render_panel(&request, dataset, config, bounds))
                    .map_err(|e| e.to_string()),
            ),
            Err(message) => (None, Err(message.to_string())),
        };

        match rendered {
            Ok(panel) => {
                panels.push(panel);
                outcomes.push(PanelOutcome {
                    index,
                    kind,
                    status: PanelStatus::Rendered,
                });
            }
            Err(message) => {
                let label = kind.map(|k| k.to_string()).unwrap_or_else(|| "?".to_string());
                warn!("Grid panel {} ({}) failed: {}", index, label, message);
                let style = match entry {
                    Ok(spec) => spec.style.normalize(),
                    Err(_) => first_style.clone(),
                };
                panels.push(placeholder(bounds, kind, &style, &message));
                outcomes.push(PanelOutcome {
                    index,
                    kind,
                    status: PanelStatus::Failed { message },
                });
            }
        }
    }

    let failed = outcomes.iter().filter(|o| !o.is_rendered()).count();
    info!(
        "Rendered {}x{} grid: {} panels, {} failed",
        rows,
        columns,
        entries.len(),
        failed
    );

    Ok(GridFigure {
        figure: Figure {
            width: panel_w * columns as f64,
            height: panel_h * rows as f64,
            background: first_style.theme.colors().background,
            font_family: first_style.font_family,
            panels,
        },
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Role;
    use crate::dataset::Column;

    fn data() -> Dataset {
        Dataset::new(vec![
            Column::numeric("a", [Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            Column::numeric("b", [Some(2.0), Some(4.0), Some(5.0), Some(9.0)]),
            Column::categorical("c", [Some("x"), Some("y"), Some("x"), Some("y")]),
        ])
        .unwrap()
    }

    fn scatter() -> ChartSpec {
        let mut spec = ChartSpec::new(ChartKind::Scatter);
        spec.roles.x = Some("a".to_string());
        spec.roles.y = Some("b".to_string());
        spec
    }

    #[test]
    fn test_grid_layout() {
        let specs = vec![scatter(), scatter(), scatter()];
        let grid = render_grid(&specs, &data(), 2, &RenderConfig::default()).unwrap();

        assert_eq!(grid.figure.panels.len(), 3);
        assert_eq!(grid.figure.width, 1000.0);
        assert_eq!(grid.figure.height, 800.0);
        assert_eq!(grid.figure.panels[2].bounds.x, 0.0);
        assert_eq!(grid.figure.panels[2].bounds.y, 400.0);
        assert_eq!(grid.failed().count(), 0);
    }

    #[test]
    fn test_failed_panel_is_isolated() {
        let mut broken = ChartSpec::new(ChartKind::Scatter);
        broken.roles.x = Some("a".to_string());
        let specs = vec![scatter(), broken, scatter()];

        let grid = render_grid(&specs, &data(), 3, &RenderConfig::default()).unwrap();
        assert_eq!(grid.figure.panels.len(), 3);
        assert!(grid.outcomes[0].is_rendered());
        assert!(grid.outcomes[2].is_rendered());

        match &grid.outcomes[1].status {
            PanelStatus::Failed { message } => assert!(message.contains(Role::Y.name())),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(grid.figure.panels[1].series.is_empty());
        assert_eq!(grid.figure.panels[0].series[0].len(), 4);
    }

    #[test]
    fn test_empty_grid() {
        assert!(render_grid(&[], &data(), 2, &RenderConfig::default()).is_err());
        assert!(render_grid(&[scatter()], &data(), 0, &RenderConfig::default()).is_err());
    }

    #[test]
    fn test_unreadable_json_entry_is_isolated() {
        let specs: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"kind": "scatter", "x": "a", "y": "b"},
                {"kind": "gantt", "x": "a"},
                {"kind": "box", "y": "b", "x": "c"}
            ]"#,
        )
        .unwrap();

        let grid = render_grid_json(&specs, &data(), 3, &RenderConfig::default()).unwrap();
        assert_eq!(grid.figure.panels.len(), 3);
        assert_eq!(grid.failed().count(), 1);
        assert_eq!(grid.outcomes[1].kind, None);
        assert!(grid.figure.panels[1].kind.is_none());
        match &grid.outcomes[1].status {
            PanelStatus::Failed { message } => assert!(message.contains("gantt")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(grid.outcomes[2].kind, Some(ChartKind::BoxPlot));
        assert!(grid.outcomes[2].is_rendered());
    }

    #[test]
    fn test_panel_size_is_validated() {
        for size in [(0.0, 4.0), (5.0, f64::NAN), (1000.0, 1000.0)] {
            let config = RenderConfig {
                grid_panel_size: size,
                ..RenderConfig::default()
            };
            let err = render_grid(&[scatter()], &data(), 1, &config).unwrap_err();
            assert!(matches!(err, TabvizError::Config(_)));
        }
    }
}
