//! materials-eval - Main Entry Point
//!
//! Evaluates magnetism and topology classifiers from the command line.

use clap::Parser;
use materials_eval::cli::{cmd_evaluate, cmd_evaluate_all, cmd_info, cmd_train, Cli, Commands, EvaluateArgs};
use materials_eval::training::ModelParams;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    // Initialize logging; reports go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "materials_eval=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Evaluate { task, data_dir, config, folds, seed, isolate_folds, stratified, refit, output }) => {
            cmd_evaluate(&EvaluateArgs { task, data_dir, config, folds, seed, isolate_folds, stratified, refit, output })?;
        }
        Some(Commands::Train { task, model, data_dir, output, n_trees, max_depth, seed }) => {
            let mut params = ModelParams::default().with_n_trees(n_trees).with_seed(seed);
            if let Some(depth) = max_depth {
                params = params.with_max_depth(depth);
            }
            cmd_train(task, model, &data_dir, output.as_deref(), params)?;
        }
        Some(Commands::Info { features, labels }) => {
            cmd_info(&features, labels.as_deref())?;
        }
        None => {
            // Default: evaluate both tasks from the working directory
            cmd_evaluate_all(&EvaluateArgs {
                data_dir: PathBuf::from("."),
                ..Default::default()
            })?;
        }
    }

    Ok(())
}
