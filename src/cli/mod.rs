//! materials-eval CLI module
//!
//! Command-line interface for evaluating model artifacts, training new ones
//! and inspecting data files.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{Task, TaskConfig};
use crate::data::{Dataset, JsonLoader};
use crate::export::ResultsFile;
use crate::pipeline::{train_artifact, EvaluationPipeline, EvaluationSummary};
use crate::training::{ModelKind, ModelParams};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "materials-eval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cross-validated and held-out evaluation of materials property classifiers")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cross-validate a model artifact and score it on the held-out set
    Evaluate {
        /// Task (magnetism, topology); required unless --config is given
        #[arg(short, long)]
        task: Option<Task>,

        /// Directory holding the task's data files and model
        #[arg(short, long, default_value = ".")]
        data_dir: PathBuf,

        /// JSON task configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of cross-validation folds
        #[arg(long)]
        folds: Option<usize>,

        /// Seed for the fold shuffle
        #[arg(long)]
        seed: Option<u64>,

        /// Fit a fresh classifier per fold, in parallel
        #[arg(long)]
        isolate_folds: bool,

        /// Keep each fold's class ratio close to the full training set's
        #[arg(long)]
        stratified: bool,

        /// Refit on the full training set before held-out scoring
        #[arg(long)]
        refit: bool,

        /// Write results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Train a classifier on a task's training set and save it as an artifact
    Train {
        /// Task (magnetism, topology)
        #[arg(short, long)]
        task: Task,

        /// Model type (random_forest, decision_tree, logistic, naive_bayes)
        #[arg(short, long, default_value = "random_forest")]
        model: ModelKind,

        /// Directory holding the task's data files
        #[arg(short, long, default_value = ".")]
        data_dir: PathBuf,

        /// Output artifact file (defaults to the task's model path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of trees (random forest)
        #[arg(long, default_value = "100")]
        n_trees: u16,

        /// Maximum tree depth
        #[arg(long)]
        max_depth: Option<u16>,

        /// Seed for bootstrap sampling
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Show feature table and label information
    Info {
        /// Feature table (JSON)
        #[arg(short, long)]
        features: PathBuf,

        /// Label array (JSON)
        #[arg(short, long)]
        labels: Option<PathBuf>,
    },
}

/// Settings for `evaluate` shared by the explicit and default invocations
#[derive(Debug, Clone, Default)]
pub struct EvaluateArgs {
    pub task: Option<Task>,
    pub data_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub folds: Option<usize>,
    pub seed: Option<u64>,
    pub isolate_folds: bool,
    pub stratified: bool,
    pub refit: bool,
    pub output: Option<PathBuf>,
}

impl EvaluateArgs {
    /// Resolve the task configuration: file first, then preset, then overrides
    pub fn task_config(&self) -> anyhow::Result<TaskConfig> {
        let mut config = match (&self.config, self.task) {
            (Some(path), _) => TaskConfig::from_file(path)?,
            (None, Some(task)) => TaskConfig::preset(task, &self.data_dir),
            (None, None) => anyhow::bail!("either --task or --config is required"),
        };
        if let Some(folds) = self.folds {
            config = config.with_n_folds(folds);
        }
        if let Some(seed) = self.seed {
            config = config.with_random_state(seed);
        }
        if self.isolate_folds {
            config = config.with_isolated_folds(true);
        }
        if self.stratified {
            config = config.with_stratified(true);
        }
        if self.refit {
            config = config.with_refit(true);
        }
        config.validate()?;
        Ok(config)
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn evaluate_task(config: TaskConfig) -> anyhow::Result<EvaluationSummary> {
    section(&format!("Evaluate · {}", config.task));
    println!("  {:<12} {}", muted("Model"), config.paths.model.display());
    println!("  {:<12} {}", muted("Folds"), config.n_folds);
    println!(
        "  {:<12} {}",
        muted("Seed"),
        config.random_state.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string())
    );
    println!();

    step_run("Running");
    let summary = EvaluationPipeline::new(config).run()?;
    step_done(&format!("{:.2}s", summary.elapsed_secs));
    println!();

    print!("{}", summary.cross_validation);
    println!();
    print!("{}", summary.holdout);
    Ok(summary)
}

fn write_results(runs: Vec<EvaluationSummary>, output: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = output {
        step_run(&format!("Saving → {}", path.display()));
        ResultsFile::new(runs).save(path)?;
        step_done("");
    }
    println!();
    Ok(())
}

pub fn cmd_evaluate(args: &EvaluateArgs) -> anyhow::Result<()> {
    let config = args.task_config()?;
    let summary = evaluate_task(config)?;
    write_results(vec![summary], args.output.as_deref())
}

/// Evaluate every task with its preset layout under `args.data_dir`
pub fn cmd_evaluate_all(args: &EvaluateArgs) -> anyhow::Result<()> {
    let mut runs = Vec::new();
    for task in Task::all() {
        let task_args = EvaluateArgs {
            task: Some(task),
            config: None,
            ..args.clone()
        };
        runs.push(evaluate_task(task_args.task_config()?)?);
    }
    write_results(runs, args.output.as_deref())
}

pub fn cmd_train(
    task: Task,
    kind: ModelKind,
    data_dir: &Path,
    output: Option<&Path>,
    params: ModelParams,
) -> anyhow::Result<()> {
    section(&format!("Train · {}", task));

    let config = TaskConfig::preset(task, data_dir);
    step_run(&format!("Training {}", kind.as_str().cyan()));
    let start = Instant::now();
    let artifact = train_artifact(&config, kind, params)?;
    step_done(&format!("{:?}", start.elapsed()));

    let path = output.unwrap_or(config.paths.model.as_path());
    step_run(&format!("Saving → {}", path.display()));
    artifact.save(path)?;
    step_done("");

    println!();
    println!("  {:<16} {}", muted("Samples"), artifact.metadata.n_training_samples.unwrap_or(0));
    println!("  {:<16} {}", muted("Features"), artifact.metadata.feature_names.len());
    for (key, value) in &artifact.metadata.hyperparameters {
        println!("  {:<16} {}", muted(key), value.white());
    }
    println!();
    Ok(())
}

pub fn cmd_info(features: &Path, labels: Option<&Path>) -> anyhow::Result<()> {
    section("Data Info");

    let loader = JsonLoader::new();
    let df = loader.load_features(features)?;

    println!("  {:<12} {}", muted("File"), features.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());

    if let Some(labels_path) = labels {
        let dataset = Dataset::new(df.clone(), loader.load_labels(labels_path)?)?;
        let info = dataset.info();
        println!("  {:<12} {}", muted("Labels"), labels_path.display());
        println!(
            "  {:<12} {} negative · {} positive",
            muted("Balance"),
            info.n_negative,
            info.n_positive
        );
    }
    println!();

    println!("  {:<28} {:>12} {:>12}", muted("Column"), muted("Min"), muted("Max"));
    println!("  {}", dim(&"─".repeat(54)));
    for col in df.get_columns() {
        let values = col.as_materialized_series();
        let min = values.min::<f64>()?.unwrap_or(f64::NAN);
        let max = values.max::<f64>()?.unwrap_or(f64::NAN);
        println!("  {:<28} {:>12.4} {:>12.4}", col.name().as_str(), min, max);
    }

    println!();
    Ok(())
}
