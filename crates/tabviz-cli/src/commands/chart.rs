//! Chart command - render one chart to an image file.

use std::path::{Path, PathBuf};

use colored::Colorize;
use tabviz::Tabviz;
use tabviz::chart::{ChartKind, ChartSpec, StyleConfig};

use crate::cli::{InputArgs, RoleArgs, StyleArgs};

#[allow(clippy::too_many_arguments)]
pub fn run(
    input: InputArgs,
    config: Option<&Path>,
    kind: Option<ChartKind>,
    spec_file: Option<PathBuf>,
    roles: RoleArgs,
    style: StyleArgs,
    output: PathBuf,
    dpi: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = super::settings(&input, config)?;
    let options = super::export_options(&output, dpi, settings.render.export)?;
    let tabviz = Tabviz::with_config(settings);

    let spec: ChartSpec = match spec_file {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| format!("Cannot read chart spec {}: {}", path.display(), e))?;
            serde_json::from_str(&text)?
        }
        None => {
            let kind = kind.ok_or("Either --kind or --spec is required")?;
            build_spec(kind, roles, style)
        }
    };

    let (data, _) = super::load(&tabviz, &input)?;
    let request = spec.validate(&data)?;
    println!(
        "{} {} chart",
        "Rendering".cyan().bold(),
        request.kind.to_string().white()
    );

    let figure = tabviz.render(&request, &data)?;
    let (w, h) = figure.pixel_size(options.dpi);
    println!(
        "{} series, {} points, {}x{} px",
        figure.series().count(),
        figure.point_count().to_string().white().bold(),
        w,
        h
    );

    figure.save(&output, &options)?;
    super::saved(&output);

    Ok(())
}

fn build_spec(kind: ChartKind, roles: RoleArgs, style: StyleArgs) -> ChartSpec {
    let mut spec = ChartSpec::new(kind);
    spec.roles.x = roles.x;
    spec.roles.y = roles.y;
    spec.roles.z = roles.z;
    spec.roles.group = roles.group;
    spec.roles.value = roles.value;
    spec.roles.columns = roles.columns;
    spec.title = roles.title;
    spec.x_label = roles.x_label;
    spec.y_label = roles.y_label;

    let figure_size = match (style.width, style.height) {
        (None, None) => None,
        (w, h) => Some((w.unwrap_or(8.0), h.unwrap_or(6.0))),
    };
    spec.style = StyleConfig {
        theme: style.theme,
        palette: style.palette,
        font_family: style.font,
        font_size: style.font_size,
        figure_size,
        line_width: style.line_width,
        marker_size: style.marker_size,
        opacity: style.opacity,
    };
    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> RoleArgs {
        RoleArgs {
            x: Some("date".to_string()),
            y: Some("revenue".to_string()),
            z: None,
            group: None,
            value: None,
            columns: Vec::new(),
            title: Some("Revenue".to_string()),
            x_label: None,
            y_label: None,
        }
    }

    fn style() -> StyleArgs {
        StyleArgs {
            theme: None,
            palette: None,
            font: None,
            font_size: None,
            width: None,
            height: None,
            line_width: None,
            marker_size: None,
            opacity: None,
        }
    }

    #[test]
    fn test_build_spec_from_flags() {
        let spec = build_spec(ChartKind::Line, roles(), style());
        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.roles.x.as_deref(), Some("date"));
        assert_eq!(spec.title.as_deref(), Some("Revenue"));
        assert!(spec.style.figure_size.is_none());
    }

    #[test]
    fn test_partial_figure_size() {
        let mut style = style();
        style.width = Some(12.0);
        let spec = build_spec(ChartKind::Scatter, roles(), style);
        assert_eq!(spec.style.figure_size, Some((12.0, 6.0)));
    }
}
