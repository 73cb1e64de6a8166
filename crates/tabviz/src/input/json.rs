//! JSON loading: array-of-records and columnar layouts.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::error::{Result, TabvizError};

use super::source::RawTable;

/// Which JSON layout a document used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    /// `[{"a": 1, "b": 2}, ...]`
    Records,
    /// `{"a": [1, ...], "b": [2, ...]}`
    Columnar,
    /// `{"a": 1, "b": 2}`, a single record.
    SingleRecord,
}

impl JsonShape {
    pub fn label(&self) -> &'static str {
        match self {
            JsonShape::Records => "json-records",
            JsonShape::Columnar => "json-columnar",
            JsonShape::SingleRecord => "json-record",
        }
    }
}

/// Parse decoded JSON text into a raw table.
pub fn parse_text(text: &str, max_rows: Option<usize>, path: &Path) -> Result<(RawTable, JsonShape)> {
    let root: JsonValue = serde_json::from_str(text)
        .map_err(|e| TabvizError::format(path, format!("invalid JSON: {}", e)))?;

    let (mut table, shape) = match root {
        JsonValue::Array(items) => (from_records(&items, path)?, JsonShape::Records),
        JsonValue::Object(map) => {
            let all_arrays = map.values().all(JsonValue::is_array);
            let any_array = map.values().any(JsonValue::is_array);
            if map.is_empty() {
                return Err(TabvizError::schema(path, "JSON object has no fields"));
            } else if all_arrays {
                (from_columns(&map, path)?, JsonShape::Columnar)
            } else if !any_array {
                let record = JsonValue::Object(map);
                (from_records(std::slice::from_ref(&record), path)?, JsonShape::SingleRecord)
            } else {
                return Err(TabvizError::schema(
                    path,
                    "ambiguous JSON object: mixes array and scalar fields",
                ));
            }
        }
        _ => {
            return Err(TabvizError::schema(
                path,
                "expected an array of objects or an object of arrays",
            ));
        }
    };

    table.truncate_rows(max_rows);
    Ok((table, shape))
}

/// Build a table from an array of objects; keys are unioned in first-seen order.
fn from_records(items: &[JsonValue], path: &Path) -> Result<RawTable> {
    let mut headers: IndexMap<String, ()> = IndexMap::new();
    for (idx, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            return Err(TabvizError::schema(
                path,
                format!("array element {} is not an object", idx),
            ));
        };
        for key in obj.keys() {
            headers.entry(key.clone()).or_insert(());
        }
    }

    let headers: Vec<String> = headers.into_keys().collect();
    let rows = items
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(RawTable::new(headers, rows))
}

/// Build a table from an object of equal-length arrays.
fn from_columns(map: &serde_json::Map<String, JsonValue>, path: &Path) -> Result<RawTable> {
    let columns: Vec<(&String, &Vec<JsonValue>)> = map
        .iter()
        .filter_map(|(k, v)| v.as_array().map(|a| (k, a)))
        .collect();

    let expected = columns.first().map(|(_, a)| a.len()).unwrap_or(0);
    if let Some((name, values)) = columns.iter().find(|(_, a)| a.len() != expected) {
        return Err(TabvizError::schema(
            path,
            format!(
                "column '{}' has {} values, expected {}",
                name,
                values.len(),
                expected
            ),
        ));
    }

    let headers = columns.iter().map(|(k, _)| (*k).clone()).collect();
    let rows = (0..expected)
        .map(|row| {
            columns
                .iter()
                .map(|(_, values)| values.get(row).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(RawTable::new(headers, rows))
}

/// Raw text for a JSON cell; nested values keep their JSON text.
fn cell_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<(RawTable, JsonShape)> {
        parse_text(text, None, Path::new("data.json"))
    }

    #[test]
    fn test_records_union_keys() {
        let (table, shape) = parse(r#"[{"a": 1, "b": "x"}, {"b": "y", "c": true}]"#).unwrap();
        assert_eq!(shape, JsonShape::Records);
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(1, 0), Some(""));
        assert_eq!(table.get(1, 2), Some("true"));
    }

    #[test]
    fn test_columnar() {
        let (table, shape) = parse(r#"{"a": [1, 2, 3], "b": ["x", null, "z"]}"#).unwrap();
        assert_eq!(shape, JsonShape::Columnar);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.get(1, 1), Some(""));
    }

    #[test]
    fn test_single_record() {
        let (table, shape) = parse(r#"{"a": 1, "b": "x"}"#).unwrap();
        assert_eq!(shape, JsonShape::SingleRecord);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_ambiguous_shapes() {
        assert!(matches!(parse(r#"{"a": [1, 2], "b": 3}"#), Err(TabvizError::Schema { .. })));
        assert!(matches!(parse(r#"[1, 2, 3]"#), Err(TabvizError::Schema { .. })));
        assert!(matches!(parse(r#"{"a": [1, 2], "b": [3]}"#), Err(TabvizError::Schema { .. })));
        assert!(matches!(parse("42"), Err(TabvizError::Schema { .. })));
    }

    #[test]
    fn test_invalid_json_is_format_error() {
        assert!(matches!(parse("{not json"), Err(TabvizError::Format { .. })));
    }

    #[test]
    fn test_nested_values_keep_json_text() {
        let (table, _) = parse(r#"[{"tags": ["a", "b"]}]"#).unwrap();
        assert_eq!(table.get(0, 0), Some(r#"["a","b"]"#));
    }
}
