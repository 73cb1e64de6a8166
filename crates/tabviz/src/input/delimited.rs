//! Delimited text parsing with delimiter detection.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TabvizError};

use super::source::RawTable;

/// Delimiters to try when auto-detecting.
pub const DELIMITERS: &[u8] = &[b',', b';', b'\t'];

/// Delimited text configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelimitedConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<char>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Quote character.
    pub quote: char,
}

impl Default for DelimitedConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            quote: '"',
        }
    }
}

/// Parse decoded delimited text into a raw table.
///
/// Returns the table and the delimiter that was used.
pub fn parse_text(
    text: &str,
    config: &DelimitedConfig,
    max_rows: Option<usize>,
    path: &Path,
) -> Result<(RawTable, u8)> {
    let delimiter = match config.delimiter {
        Some(d) if d.is_ascii() => d as u8,
        Some(d) => {
            return Err(TabvizError::Config(format!(
                "delimiter '{}' is not a single-byte character",
                d
            )));
        }
        None => detect_delimiter(text),
    };
    debug!("Using delimiter {:?} for '{}'", delimiter as char, path.display());

    if !config.quote.is_ascii() {
        return Err(TabvizError::Config(format!(
            "quote '{}' is not a single-byte character",
            config.quote
        )));
    }
    let quote = config.quote as u8;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .quote(quote)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let first = match records.next() {
        Some(record) => record.map_err(|e| csv_format_error(path, e))?,
        None => return Err(TabvizError::format(path, "file contains no rows")),
    };

    // Without a header, the first record is data.
    let (headers, pending): (Vec<String>, Option<csv::StringRecord>) = if config.has_header {
        (first.iter().map(|s| s.to_string()).collect(), None)
    } else {
        let generated = (0..first.len()).map(|i| format!("column_{}", i + 1)).collect();
        (generated, Some(first))
    };

    let expected_cols = headers.len();
    let mut rows = Vec::new();
    let mut truncated = false;
    let mut row_number = if config.has_header { 2 } else { 1 };

    for result in pending.into_iter().map(Ok::<_, csv::Error>).chain(records) {
        let record = result.map_err(|e| csv_format_error(path, e))?;

        if let Some(max) = max_rows {
            if rows.len() >= max {
                truncated = true;
                break;
            }
        }

        if record.len() != expected_cols {
            return Err(TabvizError::schema(
                path,
                format!(
                    "row {} has {} fields, expected {}",
                    row_number,
                    record.len(),
                    expected_cols
                ),
            ));
        }

        rows.push(record.iter().map(|s| s.to_string()).collect());
        row_number += 1;
    }

    let mut table = RawTable::new(headers, rows);
    table.truncated = truncated;
    Ok((table, delimiter))
}

fn csv_format_error(path: &Path, err: csv::Error) -> TabvizError {
    TabvizError::format(path, err.to_string())
}

/// Detect the delimiter by analyzing the first few lines.
///
/// Falls back to a comma when no candidate appears.
pub fn detect_delimiter(text: &str) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let Some(&first_count) = counts.first() else {
            continue;
        };
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
        let variance =
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64;

        // Higher count with lower variance is better; tab wins ties.
        let score = if consistent {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    best_delimiter
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

/// Human-readable format label for a delimiter.
pub fn format_label(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        _ => "delimited",
    }
}
