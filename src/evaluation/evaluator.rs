//! Cross-validated and held-out evaluation of binary classifiers

use super::metrics::{round2, ConfusionMatrix};
use super::report::ClassificationReport;
use super::summary::ScoreSummary;
use crate::error::{EvalError, Result};
use crate::training::cross_validation::{CVSplit, CVStrategy, CrossValidator};
use crate::training::models::{Classifier, Label};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// A label value together with the class name it reports under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPolarity {
    pub label: Label,
    pub name: String,
}

impl ClassPolarity {
    pub fn new(label: Label, name: impl Into<String>) -> Self {
        Self {
            label,
            name: name.into(),
        }
    }
}

/// Evaluator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Number of folds
    pub n_folds: usize,
    /// Seed for the fold shuffle; `None` draws from entropy
    pub random_state: Option<u64>,
    /// Polarity scored as the first sequence (FM, Topological)
    pub positive: ClassPolarity,
    /// Polarity scored as the second sequence (AFM, Trivial)
    pub negative: ClassPolarity,
    /// Keep the class ratio of every fold close to the full set's
    #[serde(default)]
    pub stratified: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            n_folds: 5,
            random_state: None,
            positive: ClassPolarity::new(1, "positive"),
            negative: ClassPolarity::new(0, "negative"),
            stratified: false,
        }
    }
}

impl EvaluatorConfig {
    pub fn new(positive: ClassPolarity, negative: ClassPolarity) -> Self {
        Self {
            positive,
            negative,
            ..Default::default()
        }
    }

    pub fn with_n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn with_optional_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_stratified(mut self, stratified: bool) -> Self {
        self.stratified = stratified;
        self
    }

    /// Exchange the positive and negative polarities
    pub fn swapped(&self) -> Self {
        Self {
            positive: self.negative.clone(),
            negative: self.positive.clone(),
            ..self.clone()
        }
    }
}

/// Per-fold F1 scores for one polarity, plus their summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarityScores {
    pub class_name: String,
    pub label: Label,
    pub scores: Vec<f64>,
    pub summary: ScoreSummary,
}

impl PolarityScores {
    fn new(polarity: &ClassPolarity, scores: Vec<f64>) -> Self {
        Self {
            class_name: polarity.name.clone(),
            label: polarity.label,
            summary: ScoreSummary::from_scores(&scores),
            scores,
        }
    }
}

/// Result of `cross_validate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationReport {
    pub n_folds: usize,
    pub positive: PolarityScores,
    pub negative: PolarityScores,
}

impl CrossValidationReport {
    /// Raw `(positive, negative)` F1 pairs in fold order
    pub fn fold_pairs(&self) -> Vec<(f64, f64)> {
        self.positive
            .scores
            .iter()
            .copied()
            .zip(self.negative.scores.iter().copied())
            .collect()
    }
}

impl fmt::Display for CrossValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (pos, neg)) in self.fold_pairs().into_iter().enumerate() {
            writeln!(f, "[fold {}] {} score: {:.3}", i, self.positive.class_name, pos)?;
            writeln!(f, "[fold {}] {} score: {:.3}", i, self.negative.class_name, neg)?;
        }
        for p in [&self.positive, &self.negative] {
            writeln!(
                f,
                "{} Mean: {:.2} median: {:.2} stdev: {:.2}",
                p.class_name, p.summary.mean, p.summary.median, p.summary.std
            )?;
        }
        Ok(())
    }
}

/// Result of `evaluate_holdout`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutReport {
    /// `classifier.score` rounded to two decimals
    pub accuracy: f64,
    pub report: ClassificationReport,
}

impl fmt::Display for HoldoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report)?;
        writeln!(f)?;
        writeln!(f, "{}", self.accuracy)
    }
}

/// Stateless evaluation procedure; all model state lives in the classifier.
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// k-fold cross-validation reusing one classifier instance.
    ///
    /// The classifier is re-fit on every fold, so once this returns it holds
    /// the fit from the last fold's training subset only.
    pub fn cross_validate<C>(
        &self,
        features: &Array2<f64>,
        labels: &Array1<Label>,
        classifier: &mut C,
    ) -> Result<CrossValidationReport>
    where
        C: Classifier + ?Sized,
    {
        let splits = self.prepare(features, labels)?;
        info!(
            model = classifier.name(),
            folds = splits.len(),
            samples = labels.len(),
            "Cross-validating with a shared classifier"
        );

        let mut pairs = Vec::with_capacity(splits.len());
        for split in &splits {
            pairs.push(self.run_fold(features, labels, split, classifier)?);
        }

        Ok(self.assemble(pairs))
    }

    /// k-fold cross-validation where every fold fits its own classifier
    /// produced by `make`. Folds run in parallel; the caller's models are
    /// never touched.
    pub fn cross_validate_isolated<C, F>(
        &self,
        features: &Array2<f64>,
        labels: &Array1<Label>,
        make: F,
    ) -> Result<CrossValidationReport>
    where
        C: Classifier,
        F: Fn() -> C + Sync,
    {
        let splits = self.prepare(features, labels)?;
        info!(
            folds = splits.len(),
            samples = labels.len(),
            "Cross-validating with isolated per-fold classifiers"
        );

        let pairs = splits
            .par_iter()
            .map(|split| {
                let mut classifier = make();
                self.run_fold(features, labels, split, &mut classifier)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.assemble(pairs))
    }

    /// Score a held-out set with the classifier's current fit.
    ///
    /// `class_names[i]` names label `i`; exactly two names are required and
    /// every held-out label must be 0 or 1.
    pub fn evaluate_holdout<C>(
        &self,
        features: &Array2<f64>,
        labels: &Array1<Label>,
        classifier: &C,
        class_names: &[String],
    ) -> Result<HoldoutReport>
    where
        C: Classifier + ?Sized,
    {
        if class_names.len() != 2 {
            return Err(EvalError::ValidationError(format!(
                "expected 2 class names, got {}",
                class_names.len()
            )));
        }
        check_aligned(features, labels)?;
        check_binary(labels)?;
        if !classifier.is_fitted() {
            return Err(EvalError::ModelNotFitted);
        }

        let y_pred = classifier.predict(features)?;
        let report = ClassificationReport::new(labels, &y_pred, class_names)?;
        let accuracy = round2(classifier.score(features, labels)?);

        info!(model = classifier.name(), samples = labels.len(), accuracy, "Held-out evaluation complete");
        Ok(HoldoutReport { accuracy, report })
    }

    fn prepare(&self, features: &Array2<f64>, labels: &Array1<Label>) -> Result<Vec<CVSplit>> {
        check_aligned(features, labels)?;
        if self.config.positive.label == self.config.negative.label {
            return Err(EvalError::ValidationError(format!(
                "positive and negative labels must differ (both {})",
                self.config.positive.label
            )));
        }

        let n_splits = self.config.n_folds;
        let strategy = if self.config.stratified {
            CVStrategy::StratifiedKFold { n_splits, shuffle: true }
        } else {
            CVStrategy::KFold { n_splits, shuffle: true }
        };
        CrossValidator::new(strategy)
            .with_optional_random_state(self.config.random_state)
            .split(labels.len(), Some(labels))
    }

    fn run_fold<C>(
        &self,
        features: &Array2<f64>,
        labels: &Array1<Label>,
        split: &CVSplit,
        classifier: &mut C,
    ) -> Result<(f64, f64)>
    where
        C: Classifier + ?Sized,
    {
        let x_train = features.select(Axis(0), &split.train_indices);
        let y_train = labels.select(Axis(0), &split.train_indices);
        let x_test = features.select(Axis(0), &split.test_indices);
        let y_test = labels.select(Axis(0), &split.test_indices);

        debug!(fold = split.fold_idx, train = y_train.len(), test = y_test.len(), "Fitting fold");
        classifier.fit(&x_train, &y_train)?;
        let y_pred = classifier.predict(&x_test)?;

        let pos = self.fold_f1(split.fold_idx, &y_test, &y_pred, &self.config.positive);
        let neg = self.fold_f1(split.fold_idx, &y_test, &y_pred, &self.config.negative);
        debug!(fold = split.fold_idx, positive_f1 = pos, negative_f1 = neg, "Fold scored");
        Ok((pos, neg))
    }

    fn fold_f1(
        &self,
        fold_idx: usize,
        y_true: &Array1<Label>,
        y_pred: &Array1<Label>,
        polarity: &ClassPolarity,
    ) -> f64 {
        let cm = ConfusionMatrix::from_labels(y_true, y_pred, polarity.label);
        if cm.is_degenerate() {
            warn!(
                fold = fold_idx,
                class = %polarity.name,
                "F1 is ill-defined (no true or predicted samples); reporting 0.0"
            );
        }
        cm.f1()
    }

    fn assemble(&self, pairs: Vec<(f64, f64)>) -> CrossValidationReport {
        let (pos, neg): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        CrossValidationReport {
            n_folds: pos.len(),
            positive: PolarityScores::new(&self.config.positive, pos),
            negative: PolarityScores::new(&self.config.negative, neg),
        }
    }
}

fn check_aligned(features: &Array2<f64>, labels: &Array1<Label>) -> Result<()> {
    if features.nrows() != labels.len() {
        return Err(EvalError::ShapeError {
            expected: format!("{} labels (one per feature row)", features.nrows()),
            actual: format!("{} labels", labels.len()),
        });
    }
    Ok(())
}

fn check_binary(labels: &Array1<Label>) -> Result<()> {
    match labels.iter().find(|&&l| l > 1) {
        Some(bad) => Err(EvalError::ValidationError(format!(
            "held-out labels must be 0 or 1, found {}",
            bad
        ))),
        None => Ok(()),
    }
}
