//! Feature table paired with its label vector

use super::loader::JsonLoader;
use crate::error::{EvalError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Named feature columns and index-aligned binary labels.
///
/// Construction checks that the row count matches the label count.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: DataFrame,
    labels: Array1<u8>,
}

/// Shape and class balance of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub n_rows: usize,
    pub n_cols: usize,
    pub columns: Vec<String>,
    pub n_negative: usize,
    pub n_positive: usize,
}

impl Dataset {
    pub fn new(features: DataFrame, labels: Array1<u8>) -> Result<Self> {
        if features.height() != labels.len() {
            return Err(EvalError::ShapeError {
                expected: format!("{} labels (one per feature row)", features.height()),
                actual: format!("{} labels", labels.len()),
            });
        }
        Ok(Self { features, labels })
    }

    /// Load a feature table and a label array from JSON files
    pub fn from_files(features_path: &Path, labels_path: &Path) -> Result<Self> {
        let loader = JsonLoader::new();
        let features = loader.load_features(features_path)?;
        let labels = loader.load_labels(labels_path)?;
        Self::new(features, labels)
    }

    pub fn features(&self) -> &DataFrame {
        &self.features
    }

    pub fn labels(&self) -> &Array1<u8> {
        &self.labels
    }

    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// All feature columns as a row-major matrix, in table order
    pub fn to_array(&self) -> Result<Array2<f64>> {
        columns_to_array2(&self.features, &self.feature_names())
    }

    /// Selected feature columns as a row-major matrix, in the given order
    pub fn to_array_with(&self, col_names: &[String]) -> Result<Array2<f64>> {
        columns_to_array2(&self.features, col_names)
    }

    pub fn info(&self) -> DatasetInfo {
        let n_positive = self.labels.iter().filter(|&&l| l == 1).count();
        DatasetInfo {
            n_rows: self.features.height(),
            n_cols: self.features.width(),
            columns: self.feature_names(),
            n_negative: self.labels.len() - n_positive,
            n_positive,
        }
    }
}

/// Extract named columns from a DataFrame into a row-major `Array2<f64>`.
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let series = df.column(col_name).map_err(|_| {
                EvalError::DataError(format!("Feature column '{}' not found", col_name))
            })?;
            let series_f64 = series
                .cast(&DataType::Float64)
                .map_err(|e| EvalError::DataError(e.to_string()))?;
            let values = series_f64
                .f64()
                .map_err(|e| EvalError::DataError(e.to_string()))?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    v.ok_or_else(|| {
                        EvalError::DataError(format!("Missing value in '{}' at row {}", col_name, row))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_refs[c][r]))
}
