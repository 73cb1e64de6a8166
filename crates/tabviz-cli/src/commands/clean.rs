//! Clean command - apply a cleaning policy and export the cleansed copy.

use std::path::{Path, PathBuf};

use colored::Colorize;
use tabviz::{CleaningPolicy, MissingPolicy, OutlierPolicy, Tabviz};

use crate::cli::{InputArgs, MissingChoice, OutlierChoice};

/// Policy flags from the command line.
pub struct PolicyArgs {
    pub file: Option<PathBuf>,
    pub missing: MissingChoice,
    pub fill_value: Option<String>,
    pub outliers: OutlierChoice,
    pub threshold: Option<f64>,
    pub columns: Vec<String>,
}

impl PolicyArgs {
    fn policy(self) -> Result<CleaningPolicy, Box<dyn std::error::Error>> {
        if let Some(path) = self.file {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| format!("Cannot read policy {}: {}", path.display(), e))?;
            return Ok(serde_json::from_str(&text)?);
        }

        let missing = match self.missing {
            MissingChoice::Keep => MissingPolicy::Keep,
            MissingChoice::Drop => MissingPolicy::DropRows,
            MissingChoice::Mean => MissingPolicy::FillMean,
            MissingChoice::Median => MissingPolicy::FillMedian,
            MissingChoice::Constant => MissingPolicy::FillConstant {
                value: self.fill_value.ok_or("--fill-value is required")?,
            },
        };
        let outliers = match self.outliers {
            OutlierChoice::None => OutlierPolicy::None,
            OutlierChoice::Zscore => OutlierPolicy::ZScore {
                threshold: self.threshold.unwrap_or(3.0),
            },
            OutlierChoice::Iqr => OutlierPolicy::Iqr {
                multiplier: self.threshold.unwrap_or(1.5),
            },
        };

        let policy = CleaningPolicy::new(missing, outliers);
        Ok(if self.columns.is_empty() {
            policy
        } else {
            policy.with_columns(self.columns)
        })
    }
}

pub fn run(
    input: InputArgs,
    config: Option<&Path>,
    output: Option<PathBuf>,
    bom: bool,
    args: PolicyArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let tabviz = Tabviz::with_config(super::settings(&input, config)?);
    let policy = args.policy()?;
    let (data, _) = super::load(&tabviz, &input)?;

    println!(
        "{} {}, {}",
        "Cleaning:".cyan().bold(),
        policy.outliers.description(),
        policy.missing.description()
    );
    let result = tabviz.clean(&data, &policy)?;
    let summary = &result.summary;

    println!();
    println!(
        "Rows: {} -> {} ({} dropped for missing values, {} for outliers)",
        summary.rows_before,
        summary.rows_after.to_string().white().bold(),
        summary.rows_dropped_missing.to_string().yellow(),
        summary.rows_dropped_outliers.to_string().yellow()
    );
    println!("Values filled: {}", summary.values_filled.to_string().white());
    for change in &summary.columns {
        println!(
            "  {:20} {} ({})",
            change.column,
            change.description,
            change.values_changed
        );
    }
    if !summary.skipped_columns.is_empty() {
        println!(
            "{} not numeric, left unchanged: {}",
            "Skipped:".yellow().bold(),
            summary.skipped_columns.join(", ")
        );
    }

    let output_path = output.unwrap_or_else(|| super::sibling(&input.file, "_clean.csv"));
    let is_json = output_path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        result.dataset.write_json(&output_path)?;
    } else if bom {
        result.dataset.write_csv_with_bom(&output_path)?;
    } else {
        result.dataset.write_csv(&output_path)?;
    }
    super::saved(&output_path);

    Ok(())
}
