//! Diagnostic categories and the classifier output.
//!
//! The label set is closed: the sequence classifier was trained on exactly
//! these four classes, in this index order.

use std::fmt;

use serde::Serialize;

/// The four diagnostic categories, in classifier output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisLabel {
    Arrhythmia,
    /// History of myocardial infarction.
    Hmi,
    /// Myocardial infarction.
    Mi,
    Normal,
}

impl DiagnosisLabel {
    /// All labels, index-aligned with the classifier's probability vector.
    pub fn all() -> &'static [DiagnosisLabel; 4] {
        &[Self::Arrhythmia, Self::Hmi, Self::Mi, Self::Normal]
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arrhythmia => "arrhythmia",
            Self::Hmi => "hmi",
            Self::Mi => "mi",
            Self::Normal => "normal",
        }
    }
}

impl fmt::Display for DiagnosisLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Arg-max label plus confidence percentage from one classifier run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClassificationResult {
    pub label: DiagnosisLabel,
    /// Maximum class probability × 100, in [0, 100].
    pub confidence: f32,
}

impl ClassificationResult {
    /// Build from the classifier's 4-class probability distribution.
    ///
    /// Label is the index of the maximum entry; confidence is that entry
    /// scaled to a percentage.
    pub fn from_probabilities(probs: &[f32; 4]) -> Self {
        let (idx, max) = probs
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |(bi, bv), (i, &v)| {
                if v > bv { (i, v) } else { (bi, bv) }
            });

        Self {
            // Index is in 0..4 by construction.
            label: DiagnosisLabel::from_index(idx).unwrap_or(DiagnosisLabel::Normal),
            confidence: (max * 100.0).clamp(0.0, 100.0),
        }
    }
}
