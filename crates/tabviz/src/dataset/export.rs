//! Writing datasets back to disk as CSV or JSON records.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Number, Value as JsonValue};

use crate::error::{Result, TabvizError};

use super::table::Dataset;
use super::value::Value;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

impl Dataset {
    /// Write the dataset as UTF-8 CSV with a header row.
    ///
    /// Missing cells are written as empty fields.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| TabvizError::io(path, e))?;
        self.write_csv_to(BufWriter::new(file))
    }

    /// Write the dataset as CSV prefixed with a UTF-8 byte-order mark.
    pub fn write_csv_with_bom(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| TabvizError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(UTF8_BOM)
            .map_err(|e| TabvizError::io(path, e))?;
        self.write_csv_to(writer)
    }

    /// Write CSV to an arbitrary writer.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(self.column_names())?;
        for row in 0..self.row_count() {
            let record: Vec<String> = self
                .columns()
                .iter()
                .map(|c| c.get(row).map(Value::to_string).unwrap_or_default())
                .collect();
            writer.write_record(&record)?;
        }
        writer.flush().map_err(|e| TabvizError::Csv(e.into()))?;
        Ok(())
    }

    /// Write the dataset as a JSON array of records.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| TabvizError::io(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.to_records())?;
        Ok(())
    }

    /// Convert rows to JSON objects keyed by column name.
    pub fn to_records(&self) -> Vec<JsonValue> {
        (0..self.row_count())
            .map(|row| {
                let mut record = Map::new();
                for column in self.columns() {
                    let value = match column.get(row) {
                        Some(Value::Number(n)) => Number::from_f64(*n)
                            .map(JsonValue::Number)
                            .unwrap_or(JsonValue::Null),
                        Some(Value::Missing) | None => JsonValue::Null,
                        Some(other) => JsonValue::String(other.to_string()),
                    };
                    record.insert(column.name.clone(), value);
                }
                JsonValue::Object(record)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::dataset::{Column, Dataset};

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::categorical("region", [Some("west"), None]),
            Column::numeric("revenue", [Some(10.0), Some(2.5)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        sample().write_csv_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "region,revenue\nwest,10\n,2.5\n");
    }

    #[test]
    fn test_write_csv_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        sample().write_csv_with_bom(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
        assert_eq!(&bytes[3..], b"region,revenue\nwest,10\n,2.5\n");
    }

    #[test]
    fn test_to_records() {
        let records = sample().to_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["region"], "west");
        assert_eq!(records[1]["region"], serde_json::Value::Null);
        assert_eq!(records[1]["revenue"], 2.5);
    }
}
