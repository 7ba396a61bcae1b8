//! Summary statistics over per-fold scores

use serde::{Deserialize, Serialize};

/// Mean, median and population standard deviation of a score sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (divides by n)
    pub std: f64,
    pub n: usize,
}

impl ScoreSummary {
    /// Summarize fold scores. An empty slice yields all-zero statistics.
    pub fn from_scores(scores: &[f64]) -> Self {
        let n = scores.len();
        if n == 0 {
            return Self { mean: 0.0, median: 0.0, std: 0.0, n };
        }

        let mean = scores.iter().sum::<f64>() / n as f64;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;

        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        Self {
            mean,
            median,
            std: variance.sqrt(),
            n,
        }
    }
}
