use candle_core::Device;
use tokenizers::Tokenizer;

/// An NLI model that scores candidate labels against a premise.
pub trait ZeroShotClassificationModel {
    type Options: std::fmt::Debug + Clone;
    /// Locally available artifacts the model and tokenizer are loaded from.
    type Files;

    /// Locates (and if needed downloads) the artifacts named by `options`.
    fn resolve(options: Self::Options) -> anyhow::Result<Self::Files>;

    fn new(files: &Self::Files, device: Device) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Normalized probabilities for single-label classification (they sum
    /// to 1), one per candidate label, in candidate order.
    fn predict(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
        candidate_labels: &[&str],
        hypothesis_template: &str,
    ) -> anyhow::Result<Vec<(String, f32)>>;

    fn get_tokenizer(files: &Self::Files) -> anyhow::Result<Tokenizer>;

    fn device(&self) -> &Device;
}
