//! Turning a score distribution into one tag and a confidence.

use super::classifier::ScoreDistribution;
use super::labels::ABSTENTION_LABEL;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    predicted_label: String,
    confidence: f32,
    ranked: Vec<(String, f32)>,
}

impl ClassificationResult {
    pub fn predicted_label(&self) -> &str {
        &self.predicted_label
    }

    /// Raw probability of the winning label, never renormalized.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Every label, highest probability first.
    pub fn ranked(&self) -> &[(String, f32)] {
        &self.ranked
    }

    /// The first `k` ranked entries, or all of them if there are fewer.
    pub fn top(&self, k: usize) -> &[(String, f32)] {
        &self.ranked[..k.min(self.ranked.len())]
    }

    pub fn is_abstention(&self) -> bool {
        self.predicted_label == ABSTENTION_LABEL
    }
}

/// Ranks the distribution and picks the winner.
///
/// Labels are sorted by descending probability with a stable sort, so equal
/// probabilities keep label-set order. The abstention label is last in that
/// order and therefore loses exact ties against real tags. When it ranks
/// first outright the result is an abstention, whatever its score.
pub fn decide(distribution: ScoreDistribution) -> ClassificationResult {
    let mut ranked = distribution.into_entries();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    // A distribution always covers at least one tag plus the abstention label.
    let (predicted_label, confidence) = ranked
        .first()
        .map(|(label, p)| (label.clone(), *p))
        .unwrap_or_else(|| (ABSTENTION_LABEL.to_string(), 0.0));

    tracing::debug!(
        label = %predicted_label,
        confidence,
        abstained = predicted_label == ABSTENTION_LABEL,
        "decided"
    );

    ClassificationResult {
        predicted_label,
        confidence,
        ranked,
    }
}
