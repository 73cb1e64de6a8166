//! Chart specs, the builder, and validated chart requests.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::dataset::{ColumnKind, Dataset};
use crate::error::{Result, TabvizError};

use super::kind::{ChartKind, Role};
use super::style::{Style, StyleConfig};

/// Column bindings by role.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnRoles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
}

impl ColumnRoles {
    /// Column names bound to a role.
    pub fn bound(&self, role: Role) -> Vec<&str> {
        fn single(v: &Option<String>) -> Vec<&str> {
            v.as_deref().into_iter().collect()
        }
        match role {
            Role::X => single(&self.x),
            Role::Y => single(&self.y),
            Role::Z => single(&self.z),
            Role::Group => single(&self.group),
            Role::Value => single(&self.value),
            Role::Columns => self.columns.iter().map(String::as_str).collect(),
        }
    }

    fn clear(&mut self, role: Role) {
        match role {
            Role::X => self.x = None,
            Role::Y => self.y = None,
            Role::Z => self.z = None,
            Role::Group => self.group = None,
            Role::Value => self.value = None,
            Role::Columns => self.columns.clear(),
        }
    }
}

/// Unvalidated description of one chart, as read from JSON or the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    #[serde(flatten)]
    pub roles: ColumnRoles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    #[serde(default)]
    pub style: StyleConfig,
}

impl ChartSpec {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            roles: ColumnRoles::default(),
            title: None,
            x_label: None,
            y_label: None,
            style: StyleConfig::default(),
        }
    }

    /// Check the spec against a dataset and produce a normalized request.
    pub fn validate(&self, dataset: &Dataset) -> Result<ChartRequest> {
        let kind = self.kind;
        let mut roles = self.roles.clone();

        for role in [Role::X, Role::Y, Role::Z, Role::Group, Role::Value, Role::Columns] {
            if kind.rule(role).is_none() && !roles.bound(role).is_empty() {
                warn!("Ignoring role {} for {} chart", role, kind);
                roles.clear(role);
            }
        }

        match kind {
            ChartKind::Heatmap => resolve_heatmap_roles(dataset, &mut roles)?,
            ChartKind::PairPlot => resolve_pair_roles(dataset, &mut roles),
            _ => {}
        }

        for rule in kind.rules() {
            let bound = roles.bound(rule.role);
            if bound.is_empty() {
                if rule.required {
                    return Err(TabvizError::chart_spec(kind, rule.role, "required role is not bound"));
                }
                continue;
            }
            if bound.len() < rule.min_columns {
                return Err(TabvizError::chart_spec(
                    kind,
                    rule.role,
                    format!(
                        "needs at least {} columns, got {}",
                        rule.min_columns,
                        bound.len()
                    ),
                ));
            }
            for name in bound {
                let column = dataset.column(name).ok_or_else(|| {
                    TabvizError::chart_spec(kind, rule.role, format!("column '{}' not found", name))
                })?;
                if !rule.accepts(column.kind) {
                    return Err(TabvizError::chart_spec(
                        kind,
                        rule.role,
                        format!(
                            "column '{}' is {}, expected {}",
                            name,
                            column.kind,
                            rule.accepted_label()
                        ),
                    ));
                }
            }
        }

        let x_label = self
            .x_label
            .clone()
            .or_else(|| roles.x.clone())
            .unwrap_or_default();
        let y_label = self
            .y_label
            .clone()
            .or_else(|| roles.y.clone())
            .unwrap_or_default();

        Ok(ChartRequest {
            kind,
            roles,
            title: self.title.clone().unwrap_or_default(),
            x_label,
            y_label,
            style: self.style.normalize(),
        })
    }
}

/// Heatmap X and Y bind together; with neither, Columns defaults to every numeric column.
fn resolve_heatmap_roles(dataset: &Dataset, roles: &mut ColumnRoles) -> Result<()> {
    match (&roles.x, &roles.y) {
        (Some(_), None) => Err(TabvizError::chart_spec(
            ChartKind::Heatmap,
            Role::Y,
            "X and Y must be bound together",
        )),
        (None, Some(_)) => Err(TabvizError::chart_spec(
            ChartKind::Heatmap,
            Role::X,
            "X and Y must be bound together",
        )),
        (Some(_), Some(_)) => {
            if !roles.columns.is_empty() {
                warn!("Heatmap with X and Y ignores Columns");
                roles.columns.clear();
            }
            Ok(())
        }
        (None, None) => {
            if roles.columns.is_empty() {
                roles.columns = dataset
                    .columns_of_kind(ColumnKind::Numeric)
                    .map(|c| c.name.clone())
                    .collect();
                if roles.columns.len() < 2 {
                    return Err(TabvizError::chart_spec(
                        ChartKind::Heatmap,
                        Role::Columns,
                        format!(
                            "needs at least 2 numeric columns, dataset has {}",
                            roles.columns.len()
                        ),
                    ));
                }
            }
            Ok(())
        }
    }
}

/// Unbound pair plot axes take the first numeric columns not already used.
///
/// With fewer than two numeric columns an axis stays unbound and rendering fails.
fn resolve_pair_roles(dataset: &Dataset, roles: &mut ColumnRoles) {
    let numeric: Vec<&str> = dataset
        .columns_of_kind(ColumnKind::Numeric)
        .map(|c| c.name.as_str())
        .collect();
    let unused = |other: &Option<String>| {
        numeric
            .iter()
            .find(|n| other.as_deref() != Some(**n))
            .map(|n| n.to_string())
    };

    if roles.x.is_none() {
        roles.x = unused(&roles.y);
    }
    if roles.y.is_none() {
        roles.y = unused(&roles.x);
    }
}

/// A validated, normalized chart request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub roles: ColumnRoles,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub style: Style,
}

impl ChartRequest {
    /// The column bound to a single-column role.
    pub fn column(&self, role: Role) -> Option<&str> {
        self.roles.bound(role).first().copied()
    }
}

/// Fluent construction of chart requests.
///
/// ```
/// use tabviz::chart::{ChartKind, ChartSpecBuilder};
/// use tabviz::dataset::{Column, Dataset};
///
/// let data = Dataset::new(vec![
///     Column::numeric("x", [Some(1.0), Some(2.0)]),
///     Column::numeric("y", [Some(3.0), Some(4.0)]),
/// ]).unwrap();
///
/// let request = ChartSpecBuilder::new(ChartKind::Scatter)
///     .x("x")
///     .y("y")
///     .title("y against x")
///     .build(&data)
///     .unwrap();
/// assert_eq!(request.x_label, "x");
/// ```
#[derive(Debug, Clone)]
pub struct ChartSpecBuilder {
    spec: ChartSpec,
}

impl ChartSpecBuilder {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            spec: ChartSpec::new(kind),
        }
    }

    pub fn x(mut self, column: impl Into<String>) -> Self {
        self.spec.roles.x = Some(column.into());
        self
    }

    pub fn y(mut self, column: impl Into<String>) -> Self {
        self.spec.roles.y = Some(column.into());
        self
    }

    pub fn z(mut self, column: impl Into<String>) -> Self {
        self.spec.roles.z = Some(column.into());
        self
    }

    pub fn group(mut self, column: impl Into<String>) -> Self {
        self.spec.roles.group = Some(column.into());
        self
    }

    pub fn value(mut self, column: impl Into<String>) -> Self {
        self.spec.roles.value = Some(column.into());
        self
    }

    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.spec.roles.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.spec.title = Some(title.into());
        self
    }

    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.spec.x_label = Some(label.into());
        self
    }

    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.spec.y_label = Some(label.into());
        self
    }

    pub fn style(mut self, style: StyleConfig) -> Self {
        self.spec.style = style;
        self
    }

    /// The unvalidated spec.
    pub fn spec(self) -> ChartSpec {
        self.spec
    }

    /// Validate against a dataset.
    pub fn build(self, dataset: &Dataset) -> Result<ChartRequest> {
        self.spec.validate(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::style::Theme;
    use crate::dataset::Column;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Column::numeric("a", [Some(1.0), Some(2.0), Some(3.0)]),
            Column::numeric("b", [Some(2.0), Some(1.0), Some(5.0)]),
            Column::numeric("c", [Some(7.0), Some(8.0), Some(6.0)]),
            Column::categorical("g", [Some("x"), Some("y"), Some("x")]),
        ])
        .unwrap()
    }

    fn role_of(err: TabvizError) -> Role {
        match err {
            TabvizError::InvalidChartSpec { role, .. } => role,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_scatter_without_y() {
        let err = ChartSpecBuilder::new(ChartKind::Scatter)
            .x("a")
            .build(&dataset())
            .unwrap_err();
        assert!(err.to_string().contains("role Y"));
        assert_eq!(role_of(err), Role::Y);
    }

    #[test]
    fn test_unknown_column() {
        let err = ChartSpecBuilder::new(ChartKind::Line)
            .x("a")
            .y("missing")
            .build(&dataset())
            .unwrap_err();
        assert!(err.to_string().contains("'missing' not found"));
    }

    #[test]
    fn test_wrong_column_kind() {
        let err = ChartSpecBuilder::new(ChartKind::Scatter)
            .x("a")
            .y("g")
            .build(&dataset())
            .unwrap_err();
        assert!(err.to_string().contains("expected numeric"));
        assert_eq!(role_of(err), Role::Y);
    }

    #[test]
    fn test_labels_and_style_defaults() {
        let request = ChartSpecBuilder::new(ChartKind::Line)
            .x("a")
            .y("b")
            .y_label("B values")
            .build(&dataset())
            .unwrap();
        assert_eq!(request.x_label, "a");
        assert_eq!(request.y_label, "B values");
        assert_eq!(request.style, Style::default());
    }

    #[test]
    fn test_heatmap_defaults_to_numeric_columns() {
        let request = ChartSpecBuilder::new(ChartKind::Heatmap).build(&dataset()).unwrap();
        assert_eq!(request.roles.columns, vec!["a", "b", "c"]);

        let err = ChartSpecBuilder::new(ChartKind::Heatmap)
            .x("a")
            .build(&dataset())
            .unwrap_err();
        assert_eq!(role_of(err), Role::Y);
    }

    #[test]
    fn test_pairplot_picks_first_numeric_columns() {
        let request = ChartSpecBuilder::new(ChartKind::PairPlot)
            .group("g")
            .build(&dataset())
            .unwrap();
        assert_eq!(request.column(Role::X), Some("a"));
        assert_eq!(request.column(Role::Y), Some("b"));
        assert_eq!(request.x_label, "a");

        let request = ChartSpecBuilder::new(ChartKind::PairPlot)
            .x("b")
            .build(&dataset())
            .unwrap();
        assert_eq!(request.column(Role::X), Some("b"));
        assert_eq!(request.column(Role::Y), Some("a"));
    }

    #[test]
    fn test_pairplot_with_one_numeric_column() {
        let data = Dataset::new(vec![
            Column::numeric("a", [Some(1.0), Some(2.0)]),
            Column::categorical("g", [Some("x"), Some("y")]),
        ])
        .unwrap();
        let request = ChartSpecBuilder::new(ChartKind::PairPlot).build(&data).unwrap();
        assert_eq!(request.column(Role::X), Some("a"));
        assert_eq!(request.column(Role::Y), None);
    }

    #[test]
    fn test_radar_needs_three_columns() {
        let err = ChartSpecBuilder::new(ChartKind::Radar)
            .columns(["a", "b"])
            .build(&dataset())
            .unwrap_err();
        assert_eq!(role_of(err), Role::Columns);

        assert!(
            ChartSpecBuilder::new(ChartKind::Radar)
                .columns(["a", "b", "c"])
                .group("g")
                .build(&dataset())
                .is_ok()
        );
    }

    #[test]
    fn test_unused_roles_are_dropped() {
        let request = ChartSpecBuilder::new(ChartKind::Distribution)
            .x("a")
            .z("b")
            .build(&dataset())
            .unwrap();
        assert_eq!(request.roles.z, None);
    }

    #[test]
    fn test_spec_from_json() {
        let spec: ChartSpec = serde_json::from_str(
            r#"{"kind": "bar", "x": "g", "y": "a", "title": "Mean a", "style": {"theme": "dark"}}"#,
        )
        .unwrap();
        let request = spec.validate(&dataset()).unwrap();
        assert_eq!(request.kind, ChartKind::Bar);
        assert_eq!(request.title, "Mean a");
        assert_eq!(request.style.theme, Theme::Dark);
    }
}
