//! End-to-end evaluation of one task
//!
//! Loads the training and held-out sets plus the model artifact named by a
//! [`TaskConfig`], cross-validates on the training set and scores the
//! held-out set. Nothing is printed here; the returned summary and its
//! reports implement `Display`.

use crate::config::{Task, TaskConfig};
use crate::data::Dataset;
use crate::error::{EvalError, Result};
use crate::evaluation::{CrossValidationReport, Evaluator, HoldoutReport};
use crate::export::{ArtifactMetadata, ModelArtifact};
use crate::training::{Classifier, ModelAdapter, ModelKind, ModelParams};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::info;

/// Outcome of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub task: Task,
    pub model_kind: ModelKind,
    pub n_train: usize,
    pub n_test: usize,
    pub isolated_folds: bool,
    pub refit_before_holdout: bool,
    pub cross_validation: CrossValidationReport,
    pub holdout: HoldoutReport,
    pub elapsed_secs: f64,
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cross_validation)?;
        write!(f, "{}", self.holdout)
    }
}

/// Feature matrices for both splits, in the column order the model expects
struct Matrices {
    train: Array2<f64>,
    test: Array2<f64>,
}

pub struct EvaluationPipeline {
    config: TaskConfig,
}

impl EvaluationPipeline {
    pub fn new(config: TaskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Load everything from disk and evaluate
    pub fn run(&self) -> Result<EvaluationSummary> {
        self.config.validate()?;
        let (train, test) = self.load_datasets()?;
        let artifact = ModelArtifact::load(&self.config.paths.model)?;
        self.run_with(artifact, &train, &test)
    }

    /// Evaluate an in-memory artifact against already-loaded datasets
    pub fn run_with(
        &self,
        artifact: ModelArtifact,
        train: &Dataset,
        test: &Dataset,
    ) -> Result<EvaluationSummary> {
        self.config.validate()?;
        let start = Instant::now();
        let cfg = &self.config;
        let matrices = self.matrices(&artifact, train, test)?;
        let mut model = artifact.model;
        let evaluator = Evaluator::new(cfg.evaluator_config());

        info!(
            task = %cfg.task,
            model = %model.kind(),
            folds = cfg.n_folds,
            isolated = cfg.isolate_folds,
            "Starting evaluation"
        );

        let cross_validation = if cfg.isolate_folds {
            let template = model.unfitted();
            evaluator.cross_validate_isolated(&matrices.train, train.labels(), || template.unfitted())?
        } else {
            evaluator.cross_validate(&matrices.train, train.labels(), &mut model)?
        };

        if cfg.refit_before_holdout {
            info!(samples = train.n_samples(), "Refitting on the full training set");
            model.fit(&matrices.train, train.labels())?;
        }

        let holdout =
            evaluator.evaluate_holdout(&matrices.test, test.labels(), &model, &cfg.class_names)?;

        let elapsed_secs = start.elapsed().as_secs_f64();
        info!(task = %cfg.task, accuracy = holdout.accuracy, elapsed_secs, "Evaluation complete");

        Ok(EvaluationSummary {
            task: cfg.task,
            model_kind: model.kind(),
            n_train: train.n_samples(),
            n_test: test.n_samples(),
            isolated_folds: cfg.isolate_folds,
            refit_before_holdout: cfg.refit_before_holdout,
            cross_validation,
            holdout,
            elapsed_secs,
        })
    }

    /// Training and held-out datasets named by the config
    pub fn load_datasets(&self) -> Result<(Dataset, Dataset)> {
        let paths = &self.config.paths;
        let train = Dataset::from_files(&paths.train_features, &paths.train_labels)?;
        let test = Dataset::from_files(&paths.test_features, &paths.test_labels)?;
        Ok((train, test))
    }

    fn matrices(&self, artifact: &ModelArtifact, train: &Dataset, test: &Dataset) -> Result<Matrices> {
        let columns = if artifact.metadata.feature_names.is_empty() {
            train.feature_names()
        } else {
            artifact.metadata.feature_names.clone()
        };
        artifact.check_features(&train.feature_names())?;
        artifact.check_features(&test.feature_names())?;

        let train_x = train.to_array_with(&columns)?;
        let test_x = test.to_array_with(&columns).map_err(|e| {
            EvalError::ValidationError(format!("Held-out features do not match training columns: {}", e))
        })?;
        Ok(Matrices { train: train_x, test: test_x })
    }
}

/// Fit a fresh `kind` classifier on the task's training set and wrap it in an
/// artifact that records the feature order and class names.
pub fn train_artifact(config: &TaskConfig, kind: ModelKind, params: ModelParams) -> Result<ModelArtifact> {
    config.validate()?;
    let paths = &config.paths;
    let train = Dataset::from_files(&paths.train_features, &paths.train_labels)?;
    let x = train.to_array()?;

    let start = Instant::now();
    let mut model = ModelAdapter::with_params(kind, params);
    model.fit(&x, train.labels())?;
    info!(
        task = %config.task,
        model = %kind,
        samples = train.n_samples(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Trained model"
    );

    let metadata = ArtifactMetadata::new(format!("{}_{}", config.task, kind), kind)
        .with_task(config.task.as_str())
        .with_features(train.feature_names())
        .with_class_names(config.class_names.clone())
        .with_training_samples(train.n_samples());
    Ok(ModelArtifact::new(metadata, model))
}
