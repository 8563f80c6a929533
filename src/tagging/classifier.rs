//! The seam between the tagging logic and whatever produces scores.

use super::labels::{LabelSet, ABSTENTION_LABEL};
use crate::core::{Result, TagGenieError};

/// Allowed drift of a distribution's total away from 1.0.
pub const SUM_TOLERANCE: f32 = 1e-3;

/// Scores a text against every label of a [`LabelSet`].
///
/// Implementations are expected to be expensive to construct and cheap to
/// call; build one per process and pass it by reference to every pipeline.
/// Failures while scoring a single text are reported as
/// [`TagGenieError::Inference`].
pub trait Classifier {
    fn classify(&self, text: &str, labels: &LabelSet) -> Result<ScoreDistribution>;
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn classify(&self, text: &str, labels: &LabelSet) -> Result<ScoreDistribution> {
        (**self).classify(text, labels)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&self, text: &str, labels: &LabelSet) -> Result<ScoreDistribution> {
        (**self).classify(text, labels)
    }
}

/// One probability per label, kept in label-set order.
///
/// Construction checks that the labels match the set position by position,
/// that every probability is finite and within [0, 1], and that they sum to
/// 1 within [`SUM_TOLERANCE`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreDistribution {
    entries: Vec<(String, f32)>,
}

impl ScoreDistribution {
    /// Pairs `scores` with the labels of `labels`, in order.
    pub fn new(labels: &LabelSet, scores: &[f32]) -> Result<Self> {
        if scores.len() != labels.len() {
            return Err(TagGenieError::inference(format!(
                "expected {} scores, got {}",
                labels.len(),
                scores.len()
            )));
        }
        let entries = labels
            .iter()
            .map(str::to_string)
            .zip(scores.iter().copied())
            .collect();
        Self::validated(entries)
    }

    /// Accepts `(label, probability)` pairs that must name the labels of
    /// `labels` in the same order.
    pub fn from_pairs(labels: &LabelSet, pairs: Vec<(String, f32)>) -> Result<Self> {
        if pairs.len() != labels.len() {
            return Err(TagGenieError::inference(format!(
                "expected {} scores, got {}",
                labels.len(),
                pairs.len()
            )));
        }
        if let Some((expected, (got, _))) = labels
            .iter()
            .zip(pairs.iter())
            .find(|(expected, (got, _))| expected != got)
        {
            return Err(TagGenieError::inference(format!(
                "score for '{got}' where '{expected}' was expected"
            )));
        }
        Self::validated(pairs)
    }

    /// All probability mass on the abstention label.
    pub fn abstain(labels: &LabelSet) -> Self {
        let entries = labels
            .iter()
            .map(|label| {
                let p = if label == ABSTENTION_LABEL { 1.0 } else { 0.0 };
                (label.to_string(), p)
            })
            .collect();
        Self { entries }
    }

    fn validated(entries: Vec<(String, f32)>) -> Result<Self> {
        if let Some((label, p)) = entries
            .iter()
            .find(|(_, p)| !p.is_finite() || !(0.0..=1.0).contains(p))
        {
            return Err(TagGenieError::inference(format!(
                "probability {p} for '{label}' is outside [0, 1]"
            )));
        }
        let sum: f32 = entries.iter().map(|(_, p)| p).sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(TagGenieError::inference(format!(
                "probabilities sum to {sum}, expected 1.0"
            )));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(l, p)| (l.as_str(), *p))
    }

    pub fn sum(&self) -> f32 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    pub fn into_entries(self) -> Vec<(String, f32)> {
        self.entries
    }
}
