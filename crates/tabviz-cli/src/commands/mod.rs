//! CLI command implementations.

pub mod chart;
pub mod clean;
pub mod grid;
pub mod profile;

use std::path::{Path, PathBuf};

use colored::Colorize;
use tabviz::render::{ExportOptions, ImageFormat};
use tabviz::{Dataset, SourceMetadata, Tabviz, TabvizConfig};

use crate::cli::InputArgs;

/// Read the optional config file and apply the command-line loader overrides.
pub fn settings(
    input: &InputArgs,
    config: Option<&Path>,
) -> Result<TabvizConfig, Box<dyn std::error::Error>> {
    let mut config = match config {
        Some(path) => TabvizConfig::from_json_file(path)?,
        None => TabvizConfig::default(),
    };

    let loader = &mut config.loader;
    if input.format.is_some() {
        loader.format = input.format;
    }
    if let Some(ref encoding) = input.encoding {
        loader.encoding.declared = Some(encoding.clone());
    }
    if input.delimiter.is_some() {
        loader.delimited.delimiter = input.delimiter;
    }
    if input.sheet.is_some() {
        loader.sheet = input.sheet.clone();
    }
    if input.max_rows.is_some() {
        loader.max_rows = input.max_rows;
    }

    Ok(config)
}

/// Load the input file, printing a one-line summary.
pub fn load(
    tabviz: &Tabviz,
    input: &InputArgs,
) -> Result<(Dataset, SourceMetadata), Box<dyn std::error::Error>> {
    if !input.file.exists() {
        return Err(format!("File not found: {}", input.file.display()).into());
    }

    println!(
        "{} {}",
        "Loading".cyan().bold(),
        input.file.display().to_string().white()
    );
    let (data, source) = tabviz.load(&input.file)?;

    println!(
        "Loaded {} rows x {} columns ({}{})",
        source.row_count.to_string().white().bold(),
        source.column_count.to_string().white().bold(),
        source.format,
        source
            .encoding
            .as_deref()
            .map(|e| format!(", {}", e))
            .unwrap_or_default()
    );
    if source.truncated {
        println!(
            "{} row limit reached, remaining rows were skipped",
            "Warning:".yellow().bold()
        );
    }
    Ok((data, source))
}

/// Export options for an output image path.
pub fn export_options(
    output: &Path,
    dpi: Option<u32>,
    defaults: ExportOptions,
) -> Result<ExportOptions, Box<dyn std::error::Error>> {
    let format = ImageFormat::from_path(output).ok_or_else(|| {
        format!(
            "Unsupported image extension: {} (use .svg or .png)",
            output.display()
        )
    })?;
    Ok(ExportOptions::new(format, dpi.unwrap_or(defaults.dpi)))
}

/// `<stem><suffix>` next to `file`.
pub fn sibling(file: &Path, suffix: &str) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}{}", stem, suffix))
}

pub fn saved(path: &Path) {
    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        path.display().to_string().white()
    );
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use tabviz::input::FileFormat;

    fn input(file: &str) -> InputArgs {
        InputArgs {
            file: PathBuf::from(file),
            format: None,
            encoding: None,
            delimiter: None,
            sheet: None,
            max_rows: None,
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"loader": {{"max_rows": 10, "sheet": "Data"}}}}"#).unwrap();

        let mut args = input("data.txt");
        args.format = Some(FileFormat::Json);
        args.max_rows = Some(5);
        args.encoding = Some("gbk".to_string());

        let config = settings(&args, Some(file.path())).unwrap();
        assert_eq!(config.loader.format, Some(FileFormat::Json));
        assert_eq!(config.loader.max_rows, Some(5));
        assert_eq!(config.loader.sheet.as_deref(), Some("Data"));
        assert_eq!(config.loader.encoding.declared.as_deref(), Some("gbk"));
    }

    #[test]
    fn test_export_options_from_extension() {
        let defaults = ExportOptions::default();
        let png = export_options(Path::new("out.PNG"), Some(300), defaults).unwrap();
        assert_eq!(png, ExportOptions::new(ImageFormat::Png, 300));

        let svg = export_options(Path::new("out.svg"), None, defaults).unwrap();
        assert_eq!(svg.dpi, 100);

        assert!(export_options(Path::new("out.pdf"), None, defaults).is_err());
    }

    #[test]
    fn test_sibling_path() {
        let path = sibling(Path::new("/tmp/sales.csv"), "_clean.csv");
        assert_eq!(path, PathBuf::from("/tmp/sales_clean.csv"));
    }
}
