//! materials-eval - Evaluation harness for materials property classifiers
//!
//! Scores pre-trained binary classifiers that predict magnetic ordering
//! (ferromagnetic vs antiferromagnetic) and topological phase (topological
//! vs trivial) from pre-computed crystal features:
//! - Shuffled k-fold cross-validation with per-class F1 for both polarities
//! - Mean / median / population stdev summaries of the fold scores
//! - Held-out accuracy and a per-class classification report
//!
//! # Modules
//!
//! - [`evaluation`] - Evaluator, metrics, score summaries, reports
//! - [`training`] - Classifier interface, `smartcore` adapters, k-fold splitter
//! - [`data`] - JSON feature tables and label arrays
//! - [`export`] - Binary model artifacts and JSON results
//! - [`config`] - Task presets and evaluation settings
//! - [`pipeline`] - Load, cross-validate and score one task end to end
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Evaluation core
pub mod evaluation;
pub mod training;

// Data and persistence
pub mod data;
pub mod export;

// Orchestration
pub mod config;
pub mod pipeline;

// Services
pub mod cli;

pub use error::{EvalError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{EvalError, Result};

    pub use crate::evaluation::{
        ClassPolarity, ClassificationReport, CrossValidationReport, Evaluator, EvaluatorConfig,
        HoldoutReport, ScoreSummary,
    };

    pub use crate::training::{Classifier, CrossValidator, Label, ModelAdapter, ModelKind, ModelParams};

    pub use crate::data::{Dataset, JsonLoader};

    pub use crate::export::{ArtifactMetadata, ModelArtifact, ResultsFile};

    pub use crate::config::{Task, TaskConfig};
    pub use crate::pipeline::{EvaluationPipeline, EvaluationSummary};
}
