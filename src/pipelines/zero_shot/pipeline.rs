use super::model::ZeroShotClassificationModel;
use crate::core::{Result, TagGenieError};
use crate::tagging::{Classifier, LabelSet, ScoreDistribution};
use tokenizers::Tokenizer;

/// A loaded NLI model plus tokenizer, usable as a [`Classifier`].
///
/// Built with [`ZeroShotClassificationPipelineBuilder`](super::ZeroShotClassificationPipelineBuilder).
pub struct ZeroShotClassificationPipeline<M: ZeroShotClassificationModel> {
    pub(crate) model: M,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) hypothesis_template: String,
}

impl<M: ZeroShotClassificationModel> ZeroShotClassificationPipeline<M> {
    /// Scores in candidate order, normalized to sum to 1.
    pub fn predict(&self, text: &str, candidate_labels: &[&str]) -> anyhow::Result<Vec<(String, f32)>> {
        self.model
            .predict(&self.tokenizer, text, candidate_labels, &self.hypothesis_template)
    }

    pub fn hypothesis_template(&self) -> &str {
        &self.hypothesis_template
    }

    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

impl<M: ZeroShotClassificationModel> Classifier for ZeroShotClassificationPipeline<M> {
    fn classify(&self, text: &str, labels: &LabelSet) -> Result<ScoreDistribution> {
        // Nothing to entail from blank text.
        if text.trim().is_empty() {
            tracing::debug!("blank text, skipping model");
            return Ok(ScoreDistribution::abstain(labels));
        }

        let candidates = labels.as_strs();
        let scores = self
            .predict(text, &candidates)
            .map_err(|e| TagGenieError::inference(format!("{e:#}")))?;
        ScoreDistribution::from_pairs(labels, scores)
    }
}
