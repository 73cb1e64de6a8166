//! Spreadsheet loading (xlsx, xlsm, xls, ods) via calamine.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate};
use log::debug;

use crate::dataset::{DATETIME_FORMAT, format_number};
use crate::error::{Result, TabvizError};

use super::source::RawTable;

/// Read one worksheet into a raw table; the first row is the header.
///
/// Uses the first sheet unless `sheet` names another one.
pub fn read_workbook(path: &Path, sheet: Option<&str>, max_rows: Option<usize>) -> Result<RawTable> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| TabvizError::format(path, e.to_string()))?;

    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                TabvizError::format(
                    path,
                    format!("no sheet named '{}' (found: {})", wanted, names.join(", ")),
                )
            })?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| TabvizError::format(path, "workbook has no sheets"))?,
    };
    debug!("Reading sheet '{}' from '{}'", name, path.display());

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| TabvizError::format(path, e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(TabvizError::format(path, format!("sheet '{}' is empty", name)));
    };

    let headers = header_row.iter().map(cell_text).collect();
    let body = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let mut table = RawTable::new(headers, body);
    table.truncate_rows(max_rows);
    Ok(table)
}

/// Raw text for a spreadsheet cell. Error cells are treated as missing.
pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) if dt.is_duration() => format_number(dt.as_f64()),
        Data::DateTime(dt) => excel_serial_to_string(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Convert an Excel serial date (1900 system) to a datetime string.
fn excel_serial_to_string(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return format_number(serial);
    };
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch
        .checked_add_signed(Duration::milliseconds(millis))
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        .unwrap_or_else(|| format_number(serial))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(3.0)), "3");
        assert_eq!(cell_text(&Data::Float(2.25)), "2.25");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::String("west".into())), "west");
    }

    #[test]
    fn test_excel_serial_dates() {
        assert_eq!(excel_serial_to_string(45306.0), "2024-01-15 00:00:00");
        assert_eq!(excel_serial_to_string(45306.5), "2024-01-15 12:00:00");
    }

    #[test]
    fn test_missing_file_is_format_error() {
        let result = read_workbook(Path::new("/nonexistent/book.xlsx"), None, None);
        assert!(matches!(result, Err(TabvizError::Format { .. })));
    }
}
