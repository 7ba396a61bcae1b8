//! JSON feature-table and label-array loading

use crate::error::{EvalError, Result};
use ndarray::Array1;
use polars::prelude::*;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Column-wise numeric table parsed from JSON, before it becomes a DataFrame
#[derive(Debug, Clone, PartialEq)]
struct RawTable {
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl RawTable {
    fn n_rows(&self) -> usize {
        self.values.first().map(|c| c.len()).unwrap_or(0)
    }

    fn into_frame(self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .zip(self.values)
            .map(|(name, values)| Column::new(name.as_str().into(), values))
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

/// Reads the JSON files that carry pre-computed features and labels.
///
/// Feature tables are accepted in three layouts:
/// - column-oriented: `{"col": {"<row>": v, ...}, ...}`
/// - split-oriented: `{"columns": [...], "index": [...], "data": [[...], ...]}`
/// - record-oriented: `[{"col": v, ...}, ...]`
#[derive(Debug, Clone, Default)]
pub struct JsonLoader;

impl JsonLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a feature table into a DataFrame with one f64 column per feature
    pub fn load_features(&self, path: &Path) -> Result<DataFrame> {
        let start = Instant::now();
        let value = read_json(path)?;
        let df = self.features_from_value(&value)?;
        info!(
            path = %path.display(),
            rows = df.height(),
            cols = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded feature table"
        );
        Ok(df)
    }

    /// Load a JSON array of binary labels
    pub fn load_labels(&self, path: &Path) -> Result<Array1<u8>> {
        let value = read_json(path)?;
        let labels = self.labels_from_value(&value)?;
        info!(path = %path.display(), n = labels.len(), "Loaded labels");
        Ok(labels)
    }

    /// Parse a feature table from an in-memory JSON string
    pub fn features_from_str(&self, json: &str) -> Result<DataFrame> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| EvalError::DataError(format!("Invalid JSON: {}", e)))?;
        self.features_from_value(&value)
    }

    /// Parse labels from an in-memory JSON string
    pub fn labels_from_str(&self, json: &str) -> Result<Array1<u8>> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| EvalError::DataError(format!("Invalid JSON: {}", e)))?;
        self.labels_from_value(&value)
    }

    fn features_from_value(&self, value: &Value) -> Result<DataFrame> {
        let table = match value {
            Value::Array(rows) => parse_records(rows)?,
            Value::Object(obj) if obj.contains_key("columns") && obj.contains_key("data") => {
                parse_split(obj)?
            }
            Value::Object(obj) => parse_columns(obj)?,
            _ => {
                return Err(EvalError::DataError(
                    "Feature table must be a JSON object or array".to_string(),
                ))
            }
        };

        if table.columns.is_empty() {
            return Err(EvalError::DataError("Feature table has no columns".to_string()));
        }
        if table.n_rows() == 0 {
            return Err(EvalError::DataError("Feature table has no rows".to_string()));
        }
        table.into_frame()
    }

    fn labels_from_value(&self, value: &Value) -> Result<Array1<u8>> {
        let items = value
            .as_array()
            .ok_or_else(|| EvalError::DataError("Labels must be a JSON array".to_string()))?;

        items
            .iter()
            .enumerate()
            .map(|(idx, v)| parse_label(v).ok_or_else(|| {
                EvalError::DataError(format!("Label {} at index {} is not 0 or 1", v, idx))
            }))
            .collect::<Result<Vec<u8>>>()
            .map(Array1::from_vec)
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path)
        .map_err(|e| EvalError::DataError(format!("{}: {}", path.display(), e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| EvalError::DataError(format!("{}: invalid JSON: {}", path.display(), e)))
}

fn parse_label(value: &Value) -> Option<u8> {
    match value {
        Value::Bool(b) => Some(*b as u8),
        Value::Number(n) => {
            let v = n.as_f64()?;
            if v == 0.0 {
                Some(0)
            } else if v == 1.0 {
                Some(1)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn parse_number(value: &Value, column: &str, row: &str) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        EvalError::DataError(format!(
            "Value {} in column '{}' (row {}) is not numeric",
            value, column, row
        ))
    })
}

fn parse_columns(obj: &Map<String, Value>) -> Result<RawTable> {
    let mut columns = Vec::with_capacity(obj.len());
    let mut values = Vec::with_capacity(obj.len());
    let mut row_keys: Option<Vec<String>> = None;

    for (name, col) in obj {
        let cells = col.as_object().ok_or_else(|| {
            EvalError::DataError(format!("Column '{}' must map row keys to values", name))
        })?;

        // The first column fixes the row order; later columns are read in that order.
        let keys = row_keys.get_or_insert_with(|| row_order(cells));
        if cells.len() != keys.len() {
            return Err(EvalError::ShapeError {
                expected: format!("{} rows in column '{}'", keys.len(), name),
                actual: format!("{} rows", cells.len()),
            });
        }

        let column = keys
            .iter()
            .map(|key| {
                let cell = cells.get(key).ok_or_else(|| {
                    EvalError::DataError(format!("Column '{}' is missing row '{}'", name, key))
                })?;
                parse_number(cell, name, key)
            })
            .collect::<Result<Vec<f64>>>()?;

        columns.push(name.clone());
        values.push(column);
    }

    Ok(RawTable { columns, values })
}

/// Numeric row keys sort by value; any other key set keeps file order.
fn row_order(cells: &Map<String, Value>) -> Vec<String> {
    let numeric: Option<Vec<(i64, &String)>> = cells
        .keys()
        .map(|k| k.parse::<i64>().ok().map(|i| (i, k)))
        .collect();
    match numeric {
        Some(mut indexed) => {
            indexed.sort_by_key(|(i, _)| *i);
            indexed.into_iter().map(|(_, k)| k.clone()).collect()
        }
        None => cells.keys().cloned().collect(),
    }
}

fn parse_split(obj: &Map<String, Value>) -> Result<RawTable> {
    let columns: Vec<String> = obj["columns"]
        .as_array()
        .ok_or_else(|| EvalError::DataError("'columns' must be an array".to_string()))?
        .iter()
        .map(|c| match c {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();

    let rows = obj["data"]
        .as_array()
        .ok_or_else(|| EvalError::DataError("'data' must be an array".to_string()))?;

    let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(rows.len()); columns.len()];
    for (r, row) in rows.iter().enumerate() {
        let cells = row
            .as_array()
            .ok_or_else(|| EvalError::DataError(format!("Row {} must be an array", r)))?;
        if cells.len() != columns.len() {
            return Err(EvalError::ShapeError {
                expected: format!("{} values in row {}", columns.len(), r),
                actual: format!("{} values", cells.len()),
            });
        }
        for (c, cell) in cells.iter().enumerate() {
            values[c].push(parse_number(cell, &columns[c], &r.to_string())?);
        }
    }

    Ok(RawTable { columns, values })
}

fn parse_records(rows: &[Value]) -> Result<RawTable> {
    let first = rows
        .first()
        .and_then(|r| r.as_object())
        .ok_or_else(|| EvalError::DataError("Records must be a non-empty array of objects".to_string()))?;
    let columns: Vec<String> = first.keys().cloned().collect();

    let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(rows.len()); columns.len()];
    for (r, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| EvalError::DataError(format!("Record {} is not an object", r)))?;
        for (c, name) in columns.iter().enumerate() {
            let cell = obj.get(name).ok_or_else(|| {
                EvalError::DataError(format!("Record {} is missing key '{}'", r, name))
            })?;
            values[c].push(parse_number(cell, name, &r.to_string())?);
        }
    }

    Ok(RawTable { columns, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_column_oriented_table() {
        let json = r#"{
            "n_sublattices": {"0": 1, "1": 2, "2": 2},
            "coordination": {"0": 6.0, "1": 4.5, "2": 8}
        }"#;
        let df = JsonLoader::new().features_from_str(json).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 2);
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["n_sublattices", "coordination"]);
    }

    #[test]
    fn test_column_rows_follow_first_column_order() {
        let json = r#"{
            "a": {"mp-2": 2.0, "mp-1": 1.0},
            "b": {"mp-1": 10.0, "mp-2": 20.0}
        }"#;
        let df = JsonLoader::new().features_from_str(json).unwrap();
        let b: Vec<f64> = df
            .column("b")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect();
        assert_eq!(b, vec![20.0, 10.0]);
    }

    #[test]
    fn test_numeric_row_keys_sort_by_value() {
        let json = r#"{"x": {"10": 3.0, "2": 2.0, "0": 1.0}}"#;
        let df = JsonLoader::new().features_from_str(json).unwrap();
        let x: Vec<f64> = df
            .column("x")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect();
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_split_and_records_layouts() {
        let loader = JsonLoader::new();
        let split = r#"{"columns": ["x", "y"], "index": [0, 1], "data": [[1, 2], [3, 4]]}"#;
        let records = r#"[{"x": 1, "y": 2}, {"x": 3, "y": 4}]"#;

        let a = loader.features_from_str(split).unwrap();
        let b = loader.features_from_str(records).unwrap();
        assert_eq!(a.shape(), (2, 2));
        assert!(a.equals(&b));
    }

    #[test]
    fn test_rejects_non_numeric_and_ragged() {
        let loader = JsonLoader::new();
        assert!(loader.features_from_str(r#"{"a": {"0": null}}"#).is_err());
        assert!(loader
            .features_from_str(r#"{"a": {"0": 1, "1": 2}, "b": {"0": 1}}"#)
            .is_err());
        assert!(loader.features_from_str("42").is_err());
        assert!(loader.features_from_str("{}").is_err());
    }

    #[test]
    fn test_labels() {
        let loader = JsonLoader::new();
        let labels = loader.labels_from_str("[0, 1, 1.0, true, false]").unwrap();
        assert_eq!(labels.to_vec(), vec![0, 1, 1, 1, 0]);

        assert!(loader.labels_from_str("[0, 2]").is_err());
        assert!(loader.labels_from_str(r#"{"0": 1}"#).is_err());
    }

    #[test]
    fn test_load_from_files() {
        let mut features = tempfile::NamedTempFile::new().unwrap();
        write!(features, r#"{{"x": {{"0": 0.5, "1": 1.5}}}}"#).unwrap();
        let mut labels = tempfile::NamedTempFile::new().unwrap();
        write!(labels, "[0, 1]").unwrap();

        let loader = JsonLoader::new();
        let df = loader.load_features(features.path()).unwrap();
        let y = loader.load_labels(labels.path()).unwrap();
        assert_eq!(df.height(), y.len());

        let missing = loader.load_labels(Path::new("/nonexistent/labels.json"));
        assert!(matches!(missing, Err(EvalError::DataError(_))));
    }
}
