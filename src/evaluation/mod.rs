//! Evaluation module
//!
//! Provides the cross-validated and held-out evaluation procedure:
//! - Per-polarity F1 over shuffled k-fold splits
//! - Mean / median / population stdev summaries of fold scores
//! - Held-out accuracy and per-class classification reports

pub mod evaluator;
pub mod metrics;
pub mod report;
pub mod summary;

pub use evaluator::{
    ClassPolarity, CrossValidationReport, Evaluator, EvaluatorConfig, HoldoutReport, PolarityScores,
};
pub use metrics::{accuracy, f1_score, precision, recall, round2, ConfusionMatrix};
pub use report::{AverageMetrics, ClassMetrics, ClassificationReport};
pub use summary::ScoreSummary;
