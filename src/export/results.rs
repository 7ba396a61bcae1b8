//! JSON export of evaluation results

use crate::error::Result;
use crate::pipeline::EvaluationSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// One or more task evaluations written as a single JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub runs: Vec<EvaluationSummary>,
}

impl ResultsFile {
    pub fn new(runs: Vec<EvaluationSummary>) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            runs,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!(path = %path.display(), runs = self.runs.len(), "Wrote evaluation results");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
