//! Chart kinds and the column roles each kind accepts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::ColumnKind;

/// Supported chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Area,
    Bar,
    Scatter,
    Pie,
    #[serde(rename = "box")]
    BoxPlot,
    Heatmap,
    Distribution,
    Violin,
    Scatter3d,
    Radar,
    Sankey,
    PairPlot,
}

impl ChartKind {
    pub const ALL: [ChartKind; 13] = [
        ChartKind::Line,
        ChartKind::Area,
        ChartKind::Bar,
        ChartKind::Scatter,
        ChartKind::Pie,
        ChartKind::BoxPlot,
        ChartKind::Heatmap,
        ChartKind::Distribution,
        ChartKind::Violin,
        ChartKind::Scatter3d,
        ChartKind::Radar,
        ChartKind::Sankey,
        ChartKind::PairPlot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::Bar => "bar",
            ChartKind::Scatter => "scatter",
            ChartKind::Pie => "pie",
            ChartKind::BoxPlot => "box",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Distribution => "distribution",
            ChartKind::Violin => "violin",
            ChartKind::Scatter3d => "scatter3d",
            ChartKind::Radar => "radar",
            ChartKind::Sankey => "sankey",
            ChartKind::PairPlot => "pairplot",
        }
    }

    /// Role rules for this kind, in validation order.
    pub fn rules(&self) -> &'static [RoleRule] {
        const LINE: &[RoleRule] = &[
            RoleRule::required(Role::X, &[ColumnKind::Numeric, ColumnKind::DateTime, ColumnKind::Categorical]),
            RoleRule::required(Role::Y, NUMERIC),
            RoleRule::optional(Role::Group, CATEGORICAL),
        ];
        const BAR: &[RoleRule] = &[
            RoleRule::required(Role::X, &[ColumnKind::Categorical, ColumnKind::DateTime, ColumnKind::Numeric]),
            RoleRule::required(Role::Y, NUMERIC),
            RoleRule::optional(Role::Group, CATEGORICAL),
        ];
        const SCATTER: &[RoleRule] = &[
            RoleRule::required(Role::X, &[ColumnKind::Numeric, ColumnKind::DateTime]),
            RoleRule::required(Role::Y, NUMERIC),
            RoleRule::optional(Role::Group, CATEGORICAL),
        ];
        const PIE: &[RoleRule] = &[
            RoleRule::required(Role::X, CATEGORICAL),
            RoleRule::required(Role::Y, NUMERIC),
        ];
        const BOX: &[RoleRule] = &[
            RoleRule::required(Role::Y, NUMERIC),
            RoleRule::optional(Role::X, CATEGORICAL),
        ];
        const HEATMAP: &[RoleRule] = &[
            RoleRule::optional(Role::X, NUMERIC),
            RoleRule::optional(Role::Y, NUMERIC),
            RoleRule::optional(Role::Columns, NUMERIC).min_columns(2),
        ];
        const DISTRIBUTION: &[RoleRule] = &[
            RoleRule::required(Role::X, NUMERIC),
            RoleRule::optional(Role::Group, CATEGORICAL),
        ];
        const SCATTER3D: &[RoleRule] = &[
            RoleRule::required(Role::X, NUMERIC),
            RoleRule::required(Role::Y, NUMERIC),
            RoleRule::required(Role::Z, NUMERIC),
            RoleRule::optional(Role::Group, CATEGORICAL),
        ];
        const RADAR: &[RoleRule] = &[
            RoleRule::required(Role::Columns, NUMERIC).min_columns(3),
            RoleRule::optional(Role::Group, CATEGORICAL),
        ];
        const SANKEY: &[RoleRule] = &[
            RoleRule::required(Role::X, CATEGORICAL),
            RoleRule::required(Role::Y, CATEGORICAL),
            RoleRule::optional(Role::Value, NUMERIC),
        ];
        const PAIRPLOT: &[RoleRule] = &[
            RoleRule::optional(Role::X, NUMERIC),
            RoleRule::optional(Role::Y, NUMERIC),
            RoleRule::optional(Role::Group, CATEGORICAL),
        ];

        match self {
            ChartKind::Line | ChartKind::Area => LINE,
            ChartKind::Bar => BAR,
            ChartKind::Scatter => SCATTER,
            ChartKind::Pie => PIE,
            ChartKind::BoxPlot | ChartKind::Violin => BOX,
            ChartKind::Heatmap => HEATMAP,
            ChartKind::Distribution => DISTRIBUTION,
            ChartKind::Scatter3d => SCATTER3D,
            ChartKind::Radar => RADAR,
            ChartKind::Sankey => SANKEY,
            ChartKind::PairPlot => PAIRPLOT,
        }
    }

    /// The rule for a role, if this kind uses it.
    pub fn rule(&self, role: Role) -> Option<&'static RoleRule> {
        self.rules().iter().find(|r| r.role == role)
    }
}

const NUMERIC: &[ColumnKind] = &[ColumnKind::Numeric];
const CATEGORICAL: &[ColumnKind] = &[ColumnKind::Categorical];

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ChartKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == lower)
            .or(match lower.as_str() {
                "boxplot" => Some(ChartKind::BoxPlot),
                "histogram" | "hist" => Some(ChartKind::Distribution),
                "3d" => Some(ChartKind::Scatter3d),
                "pair" => Some(ChartKind::PairPlot),
                _ => None,
            })
            .ok_or_else(|| format!("Unknown chart kind: {}", s))
    }
}

/// A slot in a chart request that binds dataset columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    X,
    Y,
    Z,
    Group,
    Value,
    Columns,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::X => "X",
            Role::Y => "Y",
            Role::Z => "Z",
            Role::Group => "Group",
            Role::Value => "Value",
            Role::Columns => "Columns",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a chart kind demands of one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRule {
    pub role: Role,
    pub required: bool,
    /// Column kinds the role accepts.
    pub accepts: &'static [ColumnKind],
    /// Minimum number of bound columns (multi-column roles).
    pub min_columns: usize,
}

impl RoleRule {
    const fn required(role: Role, accepts: &'static [ColumnKind]) -> Self {
        Self {
            role,
            required: true,
            accepts,
            min_columns: 1,
        }
    }

    const fn optional(role: Role, accepts: &'static [ColumnKind]) -> Self {
        Self {
            role,
            required: false,
            accepts,
            min_columns: 1,
        }
    }

    const fn min_columns(mut self, n: usize) -> Self {
        self.min_columns = n;
        self
    }

    pub fn accepts(&self, kind: ColumnKind) -> bool {
        self.accepts.contains(&kind)
    }

    /// Human-readable list of accepted kinds, e.g. "numeric or datetime".
    pub fn accepted_label(&self) -> String {
        let labels: Vec<&str> = self.accepts.iter().map(ColumnKind::label).collect();
        match labels.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
            Some((last, _)) => last.to_string(),
            None => String::new(),
        }
    }
}
