use super::classifier::Classifier;
use super::decision::{decide, ClassificationResult};
use super::labels::LabelSet;
use crate::core::Result;

/// Number of ranked entries a [`TagReport`] carries by default.
pub const DEFAULT_TOP_K: usize = 3;

/// Outcome of tagging one text.
#[derive(Debug, Clone, PartialEq)]
pub struct TagReport {
    pub label: String,
    pub confidence: f32,
    pub abstained: bool,
    /// Highest-ranked labels, at most `top_k` of them.
    pub top: Vec<(String, f32)>,
}

impl TagReport {
    pub fn from_result(result: &ClassificationResult, top_k: usize) -> Self {
        Self {
            label: result.predicted_label().to_string(),
            confidence: result.confidence(),
            abstained: result.is_abstention(),
            top: result.top(top_k).to_vec(),
        }
    }
}

/// Scores `text` and applies the decision policy.
pub fn classify_and_decide<C>(classifier: &C, text: &str, labels: &LabelSet) -> Result<ClassificationResult>
where
    C: Classifier + ?Sized,
{
    let distribution = classifier.classify(text, labels)?;
    Ok(decide(distribution))
}

/// Tags one text against an already built label set.
pub fn tag_text<C>(classifier: &C, text: &str, labels: &LabelSet, top_k: usize) -> Result<TagReport>
where
    C: Classifier + ?Sized,
{
    let result = classify_and_decide(classifier, text, labels)?;
    Ok(TagReport::from_result(&result, top_k))
}

/// Builds the label set from `tags`, then tags one text with the default top-k.
pub fn tag_text_with_tags<C, S>(classifier: &C, text: &str, tags: &[S]) -> Result<TagReport>
where
    C: Classifier + ?Sized,
    S: AsRef<str>,
{
    let labels = LabelSet::new(tags)?;
    tag_text(classifier, text, &labels, DEFAULT_TOP_K)
}
