//! Model training module
//!
//! Provides the classifier interface and fold splitting:
//! - `Classifier` trait (fit / predict / score)
//! - Adapters over the `smartcore` estimators (random forest, decision tree,
//!   logistic regression, Gaussian naive Bayes)
//! - K-fold and stratified k-fold index partitions

pub mod cross_validation;
pub mod models;

pub use cross_validation::{CVSplit, CVStrategy, CrossValidator};
pub use models::{Classifier, Label, ModelAdapter, ModelKind, ModelParams};
