//! Integration test: data files → trained artifact → evaluation → JSON results

use materials_eval::cli::EvaluateArgs;
use materials_eval::config::{Task, TaskConfig};
use materials_eval::export::{ModelArtifact, ResultsFile};
use materials_eval::pipeline::{train_artifact, EvaluationPipeline};
use materials_eval::training::{ModelKind, ModelParams};
use materials_eval::EvalError;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

/// Column-oriented feature table plus labels; label 1 when coordination > 5.
fn write_split(dir: &Path, task: Task, split: &str, n: usize, shift: usize) {
    let mut sublattices = Map::new();
    let mut coordination = Map::new();
    let mut volume = Map::new();
    let mut labels = Vec::with_capacity(n);

    for r in 0..n {
        let k = r + shift;
        let coord = ((k * 7) % 11) as f64;
        sublattices.insert(r.to_string(), json!((k % 4) + 1));
        coordination.insert(r.to_string(), json!(coord));
        volume.insert(r.to_string(), json!(10.0 + (k % 9) as f64 * 0.5));
        labels.push(if coord > 5.0 { 1 } else { 0 });
    }

    let table = json!({
        "n_sublattices": Value::Object(sublattices),
        "coordination": Value::Object(coordination),
        "volume": Value::Object(volume),
    });
    let prefix = dir.join(format!("{}_{}", task, split));
    fs::write(format!("{}_features.json", prefix.display()), table.to_string()).unwrap();
    fs::write(format!("{}_labels.json", prefix.display()), json!(labels).to_string()).unwrap();
}

fn write_task(dir: &Path, task: Task) {
    write_split(dir, task, "train", 80, 0);
    write_split(dir, task, "test", 25, 3);
}

#[test]
fn test_train_then_evaluate_magnetism() {
    let dir = tempfile::tempdir().unwrap();
    write_task(dir.path(), Task::Magnetism);
    let config = TaskConfig::preset(Task::Magnetism, dir.path()).with_random_state(17);

    let params = ModelParams::default().with_max_depth(6);
    let artifact = train_artifact(&config, ModelKind::DecisionTree, params).unwrap();
    assert_eq!(artifact.metadata.feature_names, vec!["n_sublattices", "coordination", "volume"]);
    assert_eq!(artifact.metadata.class_names, vec!["AFM", "FM"]);
    assert_eq!(artifact.metadata.n_training_samples, Some(80));
    artifact.save(&config.paths.model).unwrap();

    let summary = EvaluationPipeline::new(config).run().unwrap();
    assert_eq!(summary.task, Task::Magnetism);
    assert_eq!(summary.model_kind, ModelKind::DecisionTree);
    assert_eq!(summary.cross_validation.positive.class_name, "FM");
    assert_eq!(summary.cross_validation.negative.class_name, "AFM");
    assert_eq!(summary.cross_validation.positive.scores.len(), 5);
    assert_eq!(summary.holdout.report.total_support, 25);
    assert!((0.0..=1.0).contains(&summary.holdout.accuracy));

    let text = summary.to_string();
    assert!(text.contains("[fold 0] FM score: "));
    assert!(text.contains("AFM Mean: "));
    assert!(text.contains("weighted avg"));
}

#[test]
fn test_isolated_refit_topology_and_results_export() {
    let dir = tempfile::tempdir().unwrap();
    write_task(dir.path(), Task::Topology);
    let config = TaskConfig::preset(Task::Topology, dir.path())
        .with_random_state(4)
        .with_isolated_folds(true)
        .with_refit(true);

    train_artifact(&config, ModelKind::DecisionTree, ModelParams::default())
        .unwrap()
        .save(&config.paths.model)
        .unwrap();

    let summary = EvaluationPipeline::new(config).run().unwrap();
    assert!(summary.isolated_folds);
    assert!(summary.refit_before_holdout);
    assert_eq!(summary.cross_validation.positive.class_name, "Topological");
    assert_eq!(summary.holdout.report.classes[0].name, "Trivial");
    assert_eq!(summary.n_train, 80);

    let results_path = dir.path().join("results.json");
    ResultsFile::new(vec![summary.clone()]).save(&results_path).unwrap();
    let loaded = ResultsFile::load(&results_path).unwrap();
    assert_eq!(loaded.runs.len(), 1);
    assert_eq!(loaded.runs[0].task, Task::Topology);
    assert_eq!(loaded.runs[0].holdout, summary.holdout);
}

#[test]
fn test_config_file_and_cli_overrides() {
    let dir = tempfile::tempdir().unwrap();
    write_task(dir.path(), Task::Magnetism);
    let preset = TaskConfig::preset(Task::Magnetism, dir.path());
    let config_path = dir.path().join("magnetism.json");
    fs::write(&config_path, serde_json::to_string_pretty(&preset).unwrap()).unwrap();

    let args = EvaluateArgs {
        config: Some(config_path),
        folds: Some(3),
        seed: Some(9),
        stratified: true,
        refit: true,
        ..Default::default()
    };
    let config = args.task_config().unwrap();
    assert_eq!(config.n_folds, 3);
    assert_eq!(config.random_state, Some(9));
    assert!(config.stratified);
    assert!(config.refit_before_holdout);
    assert_eq!(config.paths, preset.paths);

    assert!(EvaluateArgs::default().task_config().is_err());

    let summary = EvaluationPipeline::new(config.clone()).run();
    assert!(summary.is_err(), "no artifact trained yet");
    train_artifact(&config, ModelKind::DecisionTree, ModelParams::default())
        .unwrap()
        .save(&config.paths.model)
        .unwrap();
    let summary = EvaluationPipeline::new(config).run().unwrap();
    assert_eq!(summary.cross_validation.n_folds, 3);
}

#[test]
fn test_missing_artifact_and_mismatched_labels() {
    let dir = tempfile::tempdir().unwrap();
    write_task(dir.path(), Task::Magnetism);
    let config = TaskConfig::preset(Task::Magnetism, dir.path());

    let err = EvaluationPipeline::new(config.clone()).run().unwrap_err();
    assert!(matches!(err, EvalError::DataError(_)));

    train_artifact(&config, ModelKind::GaussianNaiveBayes, ModelParams::default())
        .unwrap()
        .save(&config.paths.model)
        .unwrap();
    fs::write(&config.paths.test_labels, "[0, 1, 1]").unwrap();
    let err = EvaluationPipeline::new(config).run().unwrap_err();
    assert!(matches!(err, EvalError::ShapeError { .. }));
}

#[test]
fn test_artifact_rejects_foreign_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    fs::write(&path, b"not an artifact at all").unwrap();
    assert!(ModelArtifact::load(&path).is_err());
}
