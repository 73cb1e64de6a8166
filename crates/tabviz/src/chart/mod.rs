//! Chart requests: kinds, column roles, styles, and validation.

mod kind;
mod request;
mod style;

pub use kind::{ChartKind, Role, RoleRule};
pub use request::{ChartRequest, ChartSpec, ChartSpecBuilder, ColumnRoles};
pub use style::{
    Color, MAX_FIGURE_INCHES, PaletteName, Style, StyleConfig, Theme, ThemeColors,
    is_valid_figure_size,
};
