//! Task presets and evaluation configuration

use crate::error::{EvalError, Result};
use crate::evaluation::{ClassPolarity, EvaluatorConfig};
use crate::training::Label;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The two classification tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Ferromagnetic (1) vs antiferromagnetic (0) ground state
    Magnetism,
    /// Topological (1) vs trivial (0) phase
    Topology,
}

impl Task {
    pub fn all() -> [Task; 2] {
        [Task::Magnetism, Task::Topology]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Magnetism => "magnetism",
            Task::Topology => "topology",
        }
    }

    /// Class names indexed by label value
    pub fn class_names(&self) -> [&'static str; 2] {
        match self {
            Task::Magnetism => ["AFM", "FM"],
            Task::Topology => ["Trivial", "Topological"],
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "magnetism" | "magnetic" | "fm" => Ok(Task::Magnetism),
            "topology" | "topological" => Ok(Task::Topology),
            _ => Err(EvalError::ConfigError(format!(
                "Unknown task: {} (expected magnetism or topology)",
                s
            ))),
        }
    }
}

/// Locations of the four data files and the model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPaths {
    pub train_features: PathBuf,
    pub train_labels: PathBuf,
    pub test_features: PathBuf,
    pub test_labels: PathBuf,
    pub model: PathBuf,
}

impl TaskPaths {
    /// Default file names for `task` under `data_dir`
    pub fn in_dir(task: Task, data_dir: &Path) -> Self {
        let file = |suffix: &str| data_dir.join(format!("{}_{}", task.as_str(), suffix));
        Self {
            train_features: file("train_features.json"),
            train_labels: file("train_labels.json"),
            test_features: file("test_features.json"),
            test_labels: file("test_labels.json"),
            model: file("model.bin"),
        }
    }
}

/// Full configuration for evaluating one task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub task: Task,
    pub paths: TaskPaths,
    /// Class names indexed by label value
    pub class_names: Vec<String>,
    /// Number of cross-validation folds
    #[serde(default = "default_folds")]
    pub n_folds: usize,
    /// Seed for the fold shuffle; unset means non-deterministic
    #[serde(default)]
    pub random_state: Option<u64>,
    /// Fit a fresh classifier per fold instead of re-fitting the loaded one
    #[serde(default)]
    pub isolate_folds: bool,
    /// Stratify folds by label
    #[serde(default)]
    pub stratified: bool,
    /// Re-fit on the full training set before held-out scoring
    #[serde(default)]
    pub refit_before_holdout: bool,
    #[serde(default = "default_positive")]
    pub positive_label: Label,
    #[serde(default)]
    pub negative_label: Label,
}

fn default_folds() -> usize {
    5
}

fn default_positive() -> Label {
    1
}

impl TaskConfig {
    /// Preset for `task` with files under `data_dir`
    pub fn preset(task: Task, data_dir: &Path) -> Self {
        Self {
            task,
            paths: TaskPaths::in_dir(task, data_dir),
            class_names: task.class_names().iter().map(|s| s.to_string()).collect(),
            n_folds: default_folds(),
            random_state: None,
            isolate_folds: false,
            stratified: false,
            refit_before_holdout: false,
            positive_label: 1,
            negative_label: 0,
        }
    }

    /// Load from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EvalError::ConfigError(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| EvalError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn with_isolated_folds(mut self, isolate: bool) -> Self {
        self.isolate_folds = isolate;
        self
    }

    pub fn with_stratified(mut self, stratified: bool) -> Self {
        self.stratified = stratified;
        self
    }

    pub fn with_refit(mut self, refit: bool) -> Self {
        self.refit_before_holdout = refit;
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.model = path.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_folds < 2 {
            return Err(EvalError::ConfigError(format!(
                "n_folds must be at least 2, got {}",
                self.n_folds
            )));
        }
        if self.class_names.len() != 2 {
            return Err(EvalError::ConfigError(format!(
                "exactly 2 class names required, got {}",
                self.class_names.len()
            )));
        }
        if self.positive_label == self.negative_label || self.positive_label > 1 || self.negative_label > 1 {
            return Err(EvalError::ConfigError(format!(
                "positive/negative labels must be 0 and 1 in some order, got {}/{}",
                self.positive_label, self.negative_label
            )));
        }
        Ok(())
    }

    /// Evaluator settings derived from this task
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        let name = |label: Label| self.class_names[label as usize].clone();
        EvaluatorConfig::new(
            ClassPolarity::new(self.positive_label, name(self.positive_label)),
            ClassPolarity::new(self.negative_label, name(self.negative_label)),
        )
        .with_n_folds(self.n_folds)
        .with_optional_random_state(self.random_state)
        .with_stratified(self.stratified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let cfg = TaskConfig::preset(Task::Magnetism, Path::new("data"));
        assert_eq!(cfg.class_names, vec!["AFM", "FM"]);
        assert_eq!(cfg.paths.train_features, Path::new("data/magnetism_train_features.json"));
        assert_eq!(cfg.paths.model, Path::new("data/magnetism_model.bin"));
        assert!(cfg.validate().is_ok());

        let ev = cfg.evaluator_config();
        assert_eq!(ev.positive.name, "FM");
        assert_eq!(ev.negative.name, "AFM");
        assert_eq!(ev.n_folds, 5);
        assert!(ev.random_state.is_none());
    }

    #[test]
    fn test_task_parsing() {
        assert_eq!("Topology".parse::<Task>().unwrap(), Task::Topology);
        assert!("phonons".parse::<Task>().is_err());
        assert_eq!(Task::Topology.class_names(), ["Trivial", "Topological"]);
    }

    #[test]
    fn test_validation() {
        let base = TaskConfig::preset(Task::Topology, Path::new("."));
        assert!(base.clone().with_n_folds(1).validate().is_err());

        let mut bad = base.clone();
        bad.class_names.push("Other".to_string());
        assert!(bad.validate().is_err());

        let mut same = base;
        same.negative_label = 1;
        assert!(same.validate().is_err());
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "task": "topology",
            "paths": {
                "train_features": "a.json",
                "train_labels": "b.json",
                "test_features": "c.json",
                "test_labels": "d.json",
                "model": "m.bin"
            },
            "class_names": ["Trivial", "Topological"],
            "random_state": 42
        }"#;
        let cfg: TaskConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.n_folds, 5);
        assert_eq!(cfg.random_state, Some(42));
        assert_eq!((cfg.positive_label, cfg.negative_label), (1, 0));
        assert!(!cfg.isolate_folds);
        assert!(!cfg.stratified);
        assert!(!cfg.evaluator_config().stratified);
    }

    #[test]
    fn test_stratified_reaches_evaluator() {
        let cfg = TaskConfig::preset(Task::Magnetism, Path::new("data")).with_stratified(true);
        assert!(cfg.evaluator_config().stratified);

        let json = serde_json::to_string(&cfg).unwrap();
        let back: TaskConfig = serde_json::from_str(&json).unwrap();
        assert!(back.stratified);
    }
}
