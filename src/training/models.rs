//! Classifier interface and adapters over the `smartcore` estimators
//!
//! Fitting is owned by `smartcore`; this module only converts between the
//! crate's `ndarray` views and the library's dense matrices, and keeps the
//! hyperparameters alongside the fitted state so an artifact can be re-fit.

use crate::error::{EvalError, Result};
use crate::evaluation::metrics::accuracy;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::{LogisticRegression, LogisticRegressionParameters};
use smartcore::naive_bayes::gaussian::{GaussianNB, GaussianNBParameters};
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Binary class label (0 = negative class, 1 = positive class)
pub type Label = u8;

type Matrix = DenseMatrix<f64>;
type Targets = Vec<u32>;

/// A trainable binary classifier.
///
/// `fit` replaces any previously fitted state; callers that reuse one
/// instance across folds observe only the most recent fit.
pub trait Classifier {
    /// Human-readable model name
    fn name(&self) -> &str;

    /// Fit the model, overwriting any previous fit
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<Label>) -> Result<()>;

    /// Predict one label per row
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<Label>>;

    /// Mean accuracy on the given data
    fn score(&self, x: &Array2<f64>, y: &Array1<Label>) -> Result<f64> {
        let y_pred = self.predict(x)?;
        if y_pred.len() != y.len() {
            return Err(EvalError::ShapeError {
                expected: format!("{} predictions", y.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        Ok(accuracy(y, &y_pred))
    }

    /// Whether `fit` has been called successfully
    fn is_fitted(&self) -> bool;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<Label>) -> Result<()> {
        (**self).fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<Label>> {
        (**self).predict(x)
    }

    fn score(&self, x: &Array2<f64>, y: &Array1<Label>) -> Result<f64> {
        (**self).score(x, y)
    }

    fn is_fitted(&self) -> bool {
        (**self).is_fitted()
    }
}

/// Supported estimator families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    RandomForest,
    DecisionTree,
    LogisticRegression,
    GaussianNaiveBayes,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "random_forest",
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::LogisticRegression => "logistic",
            ModelKind::GaussianNaiveBayes => "naive_bayes",
        }
    }

    pub fn available() -> &'static [&'static str] {
        &["random_forest", "decision_tree", "logistic", "naive_bayes"]
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "random_forest" | "rf" => Ok(ModelKind::RandomForest),
            "decision_tree" | "tree" => Ok(ModelKind::DecisionTree),
            "logistic" | "logistic_regression" | "logreg" => Ok(ModelKind::LogisticRegression),
            "naive_bayes" | "gaussian_nb" | "nb" => Ok(ModelKind::GaussianNaiveBayes),
            _ => Err(EvalError::ConfigError(format!(
                "Unknown model type: {} (expected one of {:?})",
                s,
                ModelKind::available()
            ))),
        }
    }
}

/// Hyperparameters carried by every adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Number of trees (random forest)
    pub n_trees: u16,
    /// Maximum tree depth (trees and forests)
    pub max_depth: Option<u16>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// L2 regularization strength (logistic regression)
    pub alpha: f64,
    /// Seed for bootstrap sampling (random forest)
    pub seed: u64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            alpha: 0.0,
            seed: 0,
        }
    }
}

impl ModelParams {
    pub fn with_n_trees(mut self, n_trees: u16) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_depth(mut self, depth: u16) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Flatten to string pairs for artifact metadata
    pub fn describe(&self, kind: ModelKind) -> Vec<(String, String)> {
        let depth = self
            .max_depth
            .map(|d| d.to_string())
            .unwrap_or_else(|| "none".to_string());
        match kind {
            ModelKind::RandomForest => vec![
                ("n_trees".to_string(), self.n_trees.to_string()),
                ("max_depth".to_string(), depth),
                ("min_samples_split".to_string(), self.min_samples_split.to_string()),
                ("seed".to_string(), self.seed.to_string()),
            ],
            ModelKind::DecisionTree => vec![
                ("max_depth".to_string(), depth),
                ("min_samples_split".to_string(), self.min_samples_split.to_string()),
            ],
            ModelKind::LogisticRegression => vec![("alpha".to_string(), self.alpha.to_string())],
            ModelKind::GaussianNaiveBayes => Vec::new(),
        }
    }
}

/// Fitted estimator state
#[derive(Serialize, Deserialize)]
enum FittedModel {
    /// Training labels held a single class; every row predicts it
    Constant(Label),
    RandomForest(RandomForestClassifier<f64, u32, Matrix, Targets>),
    DecisionTree(DecisionTreeClassifier<f64, u32, Matrix, Targets>),
    LogisticRegression(LogisticRegression<f64, u32, Matrix, Targets>),
    GaussianNaiveBayes(GaussianNB<f64, u32, Matrix, Targets>),
}

/// A `Classifier` backed by one of the `smartcore` estimators
#[derive(Serialize, Deserialize)]
pub struct ModelAdapter {
    kind: ModelKind,
    params: ModelParams,
    n_features: Option<usize>,
    fitted: Option<FittedModel>,
}

impl fmt::Debug for ModelAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelAdapter")
            .field("kind", &self.kind)
            .field("params", &self.params)
            .field("n_features", &self.n_features)
            .field("fitted", &self.fitted.is_some())
            .finish()
    }
}

impl ModelAdapter {
    /// Create an unfitted adapter with default hyperparameters
    pub fn new(kind: ModelKind) -> Self {
        Self::with_params(kind, ModelParams::default())
    }

    /// Create an unfitted adapter with explicit hyperparameters
    pub fn with_params(kind: ModelKind, params: ModelParams) -> Self {
        Self {
            kind,
            params,
            n_features: None,
            fitted: None,
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Number of feature columns seen during the last fit
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    /// A fresh, unfitted adapter with the same hyperparameters
    pub fn unfitted(&self) -> Self {
        Self::with_params(self.kind, self.params.clone())
    }

    fn to_matrix(x: &Array2<f64>) -> Result<Matrix> {
        let rows: Vec<Vec<f64>> = x.outer_iter().map(|row| row.to_vec()).collect();
        DenseMatrix::from_2d_vec(&rows).map_err(|e| EvalError::DataError(e.to_string()))
    }

    fn to_targets(y: &Array1<Label>) -> Targets {
        y.iter().map(|&v| v as u32).collect()
    }

    fn fit_inner(&self, x: &Matrix, y: &Targets) -> Result<FittedModel> {
        let p = &self.params;
        let fitted = match self.kind {
            ModelKind::RandomForest => {
                let mut params = RandomForestClassifierParameters::default()
                    .with_n_trees(p.n_trees)
                    .with_min_samples_split(p.min_samples_split)
                    .with_seed(p.seed);
                if let Some(depth) = p.max_depth {
                    params = params.with_max_depth(depth);
                }
                RandomForestClassifier::fit(x, y, params).map(FittedModel::RandomForest)
            }
            ModelKind::DecisionTree => {
                let mut params = DecisionTreeClassifierParameters::default()
                    .with_min_samples_split(p.min_samples_split);
                if let Some(depth) = p.max_depth {
                    params = params.with_max_depth(depth);
                }
                DecisionTreeClassifier::fit(x, y, params).map(FittedModel::DecisionTree)
            }
            ModelKind::LogisticRegression => {
                let params = LogisticRegressionParameters::default().with_alpha(p.alpha);
                LogisticRegression::fit(x, y, params).map(FittedModel::LogisticRegression)
            }
            ModelKind::GaussianNaiveBayes => {
                GaussianNB::fit(x, y, GaussianNBParameters::default())
                    .map(FittedModel::GaussianNaiveBayes)
            }
        };
        fitted.map_err(|e| EvalError::TrainingError(format!("{}: {}", self.kind, e)))
    }
}

/// The only label present in `y`, if it holds exactly one distinct value
fn single_class(y: &Array1<Label>) -> Option<Label> {
    let first = *y.first()?;
    y.iter().all(|&l| l == first).then_some(first)
}

impl Classifier for ModelAdapter {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<Label>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(EvalError::ShapeError {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{} labels", y.len()),
            });
        }

        // Drop the previous fit first so a failed fit never leaves stale state.
        self.fitted = None;

        let fitted = match single_class(y) {
            Some(label) => {
                debug!(model = %self.kind, label, samples = y.len(), "Single-class training set; predicting a constant");
                FittedModel::Constant(label)
            }
            None => {
                let matrix = Self::to_matrix(x)?;
                let targets = Self::to_targets(y);
                self.fit_inner(&matrix, &targets)?
            }
        };
        self.fitted = Some(fitted);
        self.n_features = Some(x.ncols());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<Label>> {
        let fitted = self.fitted.as_ref().ok_or(EvalError::ModelNotFitted)?;

        if let Some(expected) = self.n_features {
            if x.ncols() != expected {
                return Err(EvalError::ShapeError {
                    expected: format!("{} features", expected),
                    actual: format!("{} features", x.ncols()),
                });
            }
        }

        let predicted = match fitted {
            FittedModel::Constant(label) => return Ok(Array1::from_elem(x.nrows(), *label)),
            FittedModel::RandomForest(m) => m.predict(&Self::to_matrix(x)?),
            FittedModel::DecisionTree(m) => m.predict(&Self::to_matrix(x)?),
            FittedModel::LogisticRegression(m) => m.predict(&Self::to_matrix(x)?),
            FittedModel::GaussianNaiveBayes(m) => m.predict(&Self::to_matrix(x)?),
        }
        .map_err(|e| EvalError::InferenceError(format!("{}: {}", self.kind, e)))?;

        Ok(predicted.into_iter().map(|v| v as Label).collect())
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<Label>) {
        let x = array![
            [0.1, 1.0],
            [0.2, 1.1],
            [0.3, 0.9],
            [0.4, 1.2],
            [0.2, 0.8],
            [5.1, 9.0],
            [5.3, 9.2],
            [5.0, 8.8],
            [5.4, 9.1],
            [5.2, 9.3],
        ];
        let y = array![0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!("random_forest".parse::<ModelKind>().unwrap(), ModelKind::RandomForest);
        assert_eq!("LogReg".parse::<ModelKind>().unwrap(), ModelKind::LogisticRegression);
        assert!("svm".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = separable();
        let model = ModelAdapter::new(ModelKind::DecisionTree);
        assert!(matches!(model.predict(&x), Err(EvalError::ModelNotFitted)));
    }

    #[test]
    fn test_decision_tree_fits_separable_data() {
        let (x, y) = separable();
        let mut model = ModelAdapter::new(ModelKind::DecisionTree);
        model.fit(&x, &y).unwrap();

        assert!(model.is_fitted());
        assert_eq!(model.n_features(), Some(2));
        assert_eq!(model.score(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_random_forest_fits_separable_data() {
        let (x, y) = separable();
        let params = ModelParams::default().with_n_trees(10).with_seed(3);
        let mut model = ModelAdapter::with_params(ModelKind::RandomForest, params);
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        assert_eq!(predictions.len(), 10);
        assert!(predictions.iter().all(|&p| p <= 1));
    }

    #[test]
    fn test_feature_width_is_checked() {
        let (x, y) = separable();
        let mut model = ModelAdapter::new(ModelKind::DecisionTree);
        model.fit(&x, &y).unwrap();

        let narrow = array![[0.1], [5.0]];
        assert!(matches!(model.predict(&narrow), Err(EvalError::ShapeError { .. })));
    }

    #[test]
    fn test_single_class_training_predicts_constant() {
        let (x, _) = separable();
        let y = Array1::from_elem(10, 0u8);
        for kind in [ModelKind::RandomForest, ModelKind::DecisionTree, ModelKind::LogisticRegression] {
            let mut model = ModelAdapter::new(kind);
            model.fit(&x, &y).unwrap();
            assert!(model.is_fitted());
            assert_eq!(model.predict(&x).unwrap(), y);
        }

        let mut model = ModelAdapter::new(ModelKind::DecisionTree);
        model.fit(&x, &y).unwrap();
        let bytes = bincode::serialize(&model).unwrap();
        let restored: ModelAdapter = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored.predict(&x).unwrap().to_vec(), vec![0; 10]);
    }

    #[test]
    fn test_unfitted_copy_keeps_params() {
        let (x, y) = separable();
        let params = ModelParams::default().with_max_depth(3);
        let mut model = ModelAdapter::with_params(ModelKind::DecisionTree, params.clone());
        model.fit(&x, &y).unwrap();

        let fresh = model.unfitted();
        assert!(!fresh.is_fitted());
        assert_eq!(fresh.params(), &params);
        assert_eq!(fresh.kind(), ModelKind::DecisionTree);
    }
}
