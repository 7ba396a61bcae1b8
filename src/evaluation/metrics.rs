//! Binary classification metrics with a selectable positive label

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Confusion counts relative to one positive label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Count outcomes treating `positive` as the positive class.
    pub fn from_labels(y_true: &Array1<u8>, y_pred: &Array1<u8>, positive: u8) -> Self {
        let mut cm = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t == positive, p == positive) {
                (true, true) => cm.tp += 1,
                (false, true) => cm.fp += 1,
                (false, false) => cm.tn += 1,
                (true, false) => cm.fn_ += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    /// Number of samples whose true label is the positive one
    pub fn support(&self) -> usize {
        self.tp + self.fn_
    }

    /// TP / (TP + FP), 0.0 when nothing was predicted positive
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// TP / (TP + FN), 0.0 when no positives are present
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Harmonic mean of precision and recall, 0.0 when both are zero
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }

    /// True when F1 is undefined and was reported as zero
    pub fn is_degenerate(&self) -> bool {
        self.tp + self.fp == 0 || self.tp + self.fn_ == 0
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

pub fn precision(y_true: &Array1<u8>, y_pred: &Array1<u8>, positive: u8) -> f64 {
    ConfusionMatrix::from_labels(y_true, y_pred, positive).precision()
}

pub fn recall(y_true: &Array1<u8>, y_pred: &Array1<u8>, positive: u8) -> f64 {
    ConfusionMatrix::from_labels(y_true, y_pred, positive).recall()
}

pub fn f1_score(y_true: &Array1<u8>, y_pred: &Array1<u8>, positive: u8) -> f64 {
    ConfusionMatrix::from_labels(y_true, y_pred, positive).f1()
}

/// Fraction of exact label matches (0.0 for empty input)
pub fn accuracy(y_true: &Array1<u8>, y_pred: &Array1<u8>) -> f64 {
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    ratio(correct, y_true.len())
}

/// Round to two decimals, ties to even (0.125 -> 0.12, 0.375 -> 0.38)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
