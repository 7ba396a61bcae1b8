//! Per-class classification report

use super::metrics::{accuracy, ConfusionMatrix};
use crate::error::{EvalError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Precision / recall / F1 / support for one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub name: String,
    pub label: u8,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged precision / recall / F1 across classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Table of per-class metrics plus accuracy, macro and weighted averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub total_support: usize,
}

impl ClassificationReport {
    /// Build a report where label `i` is named `class_names[i]`.
    pub fn new(y_true: &Array1<u8>, y_pred: &Array1<u8>, class_names: &[String]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(EvalError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if class_names.is_empty() {
            return Err(EvalError::ValidationError("class_names must not be empty".to_string()));
        }
        let n_classes = class_names.len();
        if let Some(bad) = y_true
            .iter()
            .chain(y_pred.iter())
            .find(|&&label| label as usize >= n_classes)
        {
            return Err(EvalError::ValidationError(format!(
                "label {} has no class name ({} names given)",
                bad, n_classes
            )));
        }

        let classes: Vec<ClassMetrics> = class_names
            .iter()
            .enumerate()
            .map(|(label, name)| {
                let cm = ConfusionMatrix::from_labels(y_true, y_pred, label as u8);
                ClassMetrics {
                    name: name.clone(),
                    label: label as u8,
                    precision: cm.precision(),
                    recall: cm.recall(),
                    f1: cm.f1(),
                    support: cm.support(),
                }
            })
            .collect();

        let total_support = y_true.len();
        let k = classes.len() as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / k,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / k,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / k,
        };

        let weight = |f: fn(&ClassMetrics) -> f64| -> f64 {
            if total_support == 0 {
                return 0.0;
            }
            classes.iter().map(|c| f(c) * c.support as f64).sum::<f64>() / total_support as f64
        };
        let weighted_avg = AverageMetrics {
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1: weight(|c| c.f1),
        };

        Ok(Self {
            accuracy: accuracy(y_true, y_pred),
            classes,
            macro_avg,
            weighted_avg,
            total_support,
        })
    }

    /// Look up a class row by name
    pub fn class(&self, name: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LAST_LINE: &str = "weighted avg";
        let width = self
            .classes
            .iter()
            .map(|c| c.name.len())
            .chain(std::iter::once(LAST_LINE.len()))
            .max()
            .unwrap_or(LAST_LINE.len());

        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support",
            w = width
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.name, c.precision, c.recall, c.f1, c.support,
                w = width
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.total_support,
            w = width
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), (LAST_LINE, &self.weighted_avg)] {
            writeln!(
                f,
                "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, self.total_support,
                w = width
            )?;
        }
        Ok(())
    }
}
