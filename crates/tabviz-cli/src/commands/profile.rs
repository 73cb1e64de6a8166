//! Profile command - summarize every column of a data file.

use std::path::{Path, PathBuf};

use colored::Colorize;
use tabviz::dataset::format_number;
use tabviz::profile::CorrelationMethod;
use tabviz::{DatasetProfile, ProfileReport, Tabviz};

use crate::cli::InputArgs;

pub fn run(
    input: InputArgs,
    config: Option<&Path>,
    json_output: bool,
    output: Option<PathBuf>,
    correlation: Option<CorrelationMethod>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = super::settings(&input, config)?;
    if let Some(method) = correlation {
        settings.profiler.correlation = method;
    }
    let tabviz = Tabviz::with_config(settings);

    if json_output {
        let report = tabviz.analyze(&input.file)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let (data, source) = super::load(&tabviz, &input)?;
    let profile = tabviz.profile(&data);
    print_profile(&profile, verbose);

    if let Some(path) = output {
        let report = ProfileReport { source, profile };
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        super::saved(&path);
    }

    Ok(())
}

fn print_profile(profile: &DatasetProfile, verbose: bool) {
    println!();
    println!("{}", "Columns:".yellow().bold());
    for col in &profile.columns {
        let missing = if col.missing_count > 0 {
            format!("{} missing", col.missing_count).red().to_string()
        } else {
            "complete".green().to_string()
        };
        println!(
            "  {:20} {:12} {:>6} distinct  {}",
            col.name,
            col.kind.label(),
            col.distinct_count,
            missing
        );

        if let Some(ref stats) = col.numeric {
            println!(
                "      min {}  max {}  mean {}  median {}  std {}",
                format_number(stats.min),
                format_number(stats.max),
                format_number(stats.mean),
                format_number(stats.median),
                stats.std.map(format_number).unwrap_or_else(|| "-".to_string())
            );
        }
        if let Some(ref range) = col.datetime {
            println!("      {} .. {}", range.earliest, range.latest);
        }
        if verbose {
            for value in col.top_values.iter().take(5) {
                println!("      {:24} {}", value.value, value.count);
            }
        }
    }

    println!();
    println!(
        "Missing cells: {} of {} ({:.1}%)",
        profile.missing.total_missing.to_string().white().bold(),
        profile.missing.total_cells,
        profile.missing.ratio * 100.0
    );

    if !profile.strong_correlations.is_empty() {
        println!();
        println!(
            "{} ({:?})",
            "Strong correlations:".yellow().bold(),
            profile.correlation.method
        );
        for pair in &profile.strong_correlations {
            println!(
                "  {} ~ {}: {}",
                pair.first,
                pair.second,
                format!("{:+.3}", pair.coefficient).cyan()
            );
        }
    }

    let flagged: Vec<_> = profile
        .outliers
        .iter()
        .filter(|o| o.iqr_count > 0 || o.z_score_count > 0)
        .collect();
    if !flagged.is_empty() {
        println!();
        println!("{}", "Outliers:".yellow().bold());
        for report in flagged {
            println!(
                "  {:20} {} outside [{}, {}], {} with |z| > threshold",
                report.column,
                report.iqr_count.to_string().red(),
                format_number(report.lower_bound),
                format_number(report.upper_bound),
                report.z_score_count
            );
        }
    }
}
