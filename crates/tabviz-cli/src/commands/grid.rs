//! Grid command - render several charts into one figure.

use std::path::{Path, PathBuf};

use colored::Colorize;
use tabviz::Tabviz;
use tabviz::render::PanelStatus;

use crate::cli::InputArgs;

pub fn run(
    input: InputArgs,
    config: Option<&Path>,
    layout: PathBuf,
    columns: usize,
    output: PathBuf,
    dpi: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = super::settings(&input, config)?;
    let options = super::export_options(&output, dpi, settings.render.export)?;
    let tabviz = Tabviz::with_config(settings);

    let text = std::fs::read_to_string(&layout)
        .map_err(|e| format!("Cannot read layout {}: {}", layout.display(), e))?;
    let specs: Vec<serde_json::Value> = serde_json::from_str(&text)
        .map_err(|e| format!("Layout {} is not a JSON array: {}", layout.display(), e))?;

    let (data, _) = super::load(&tabviz, &input)?;
    println!(
        "{} {} charts, {} per row",
        "Rendering".cyan().bold(),
        specs.len().to_string().white().bold(),
        columns
    );

    let grid = tabviz.render_grid_json(&specs, &data, columns)?;
    for outcome in &grid.outcomes {
        let kind = outcome
            .kind
            .map(|k| k.to_string())
            .unwrap_or_else(|| "?".to_string());
        match &outcome.status {
            PanelStatus::Rendered => {
                println!("  {} {} {}", "ok".green(), outcome.index, kind);
            }
            PanelStatus::Failed { message } => {
                println!(
                    "  {} {} {}: {}",
                    "failed".red(),
                    outcome.index,
                    kind,
                    message
                );
            }
        }
    }

    grid.figure.save(&output, &options)?;
    super::saved(&output);

    Ok(())
}
