/*
Zero-Shot ModernBERT finetunes

https://huggingface.co/MoritzLaurer/ModernBERT-base-zeroshot-v2.0
https://huggingface.co/MoritzLaurer/ModernBERT-large-zeroshot-v2.0

Both are `ModernBertForSequenceClassification` NLI heads with two classes:

```
"id2label": { "0": "entailment", "1": "not_entailment" },
"label2id": { "entailment": 0, "not_entailment": 1 },
"classifier_pooling": "mean",
```
*/

use crate::loaders::{load_tokenizer, ModelFiles, ModelFilesLoader, ModelSource};
use anyhow::{Error as E, Result};
use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{ops::softmax, VarBuilder};
use candle_transformers::models::modernbert::{
    ClassifierConfig, ClassifierPooling, Config, ModernBertForSequenceClassification,
};
use serde::Deserialize;
use std::collections::HashMap;
use tokenizers::Tokenizer;

/// Available sizes of the zero-shot ModernBERT model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModernBertSize {
    Base,
    #[default]
    Large,
}

impl ModernBertSize {
    pub fn repo_id(&self) -> &'static str {
        match self {
            ModernBertSize::Base => "MoritzLaurer/ModernBERT-base-zeroshot-v2.0",
            ModernBertSize::Large => "MoritzLaurer/ModernBERT-large-zeroshot-v2.0",
        }
    }

    pub fn source(&self) -> ModelSource {
        ModelSource::hub(self.repo_id())
    }
}

impl std::fmt::Display for ModernBertSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModernBertSize::Base => "modernbert-base",
            ModernBertSize::Large => "modernbert-large",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for ModernBertSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(ModernBertSize::Base),
            "large" => Ok(ModernBertSize::Large),
            other => Err(format!("unknown model size '{other}' (expected base or large)")),
        }
    }
}

// The parts of config.json candle's `Config` does not keep for us.
#[derive(Deserialize)]
struct ClassifierConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    label2id: HashMap<String, u32>,
    #[serde(default)]
    classifier_pooling: Option<String>,
}

pub struct ZeroShotModernBertModel {
    model: ModernBertForSequenceClassification,
    device: Device,
    entailment_id: usize,
}

impl ZeroShotModernBertModel {
    pub fn new(source: ModelSource, device: Device) -> Result<Self> {
        let files = ModelFilesLoader::new(source).load()?;
        Self::from_files(&files, device)
    }

    pub fn from_files(files: &ModelFiles, device: Device) -> Result<Self> {
        let config_content = std::fs::read_to_string(&files.config).map_err(|e| {
            E::msg(format!(
                "Failed to read config file {}: {e}",
                files.config.display()
            ))
        })?;

        let mut config: Config = serde_json::from_str(&config_content)
            .map_err(|e| E::msg(format!("Failed to parse model config: {e}")))?;
        let class_cfg: ClassifierConfigJson = serde_json::from_str(&config_content)
            .map_err(|e| E::msg(format!("Failed to parse classifier config: {e}")))?;

        let entailment_id = *class_cfg.label2id.get("entailment").ok_or_else(|| {
            let available: Vec<&str> = class_cfg.label2id.keys().map(String::as_str).collect();
            E::msg(format!(
                "config.json label2id has no 'entailment' entry. Available: {}",
                available.join(", ")
            ))
        })? as usize;

        if config.classifier_config.is_none() {
            let pooling = match class_cfg.classifier_pooling.as_deref() {
                Some("mean") => ClassifierPooling::MEAN,
                _ => ClassifierPooling::CLS,
            };
            config.classifier_config = Some(ClassifierConfig {
                id2label: class_cfg.id2label.clone(),
                label2id: class_cfg
                    .label2id
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_string()))
                    .collect(),
                classifier_pooling: pooling,
            });
        }

        // Checkpoints ship bfloat16; F32 loads everywhere.
        let vb = if files.is_safetensors() {
            unsafe {
                VarBuilder::from_mmaped_safetensors(
                    std::slice::from_ref(&files.weights),
                    DType::F32,
                    &device,
                )?
            }
        } else {
            VarBuilder::from_pth(&files.weights, DType::F32, &device)?
        };

        let model = ModernBertForSequenceClassification::load(vb, &config)?;

        Ok(Self {
            model,
            device,
            entailment_id,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Entailment probabilities normalized across the candidate labels so
    /// they sum to 1, returned in candidate order.
    ///
    /// Each pair's entailment probability (softmax over its own
    /// entailment/not-entailment logits) is divided by the sum over all
    /// candidates. This is not a softmax over the entailment logits across
    /// candidates, and the two are calibrated differently; the same text
    /// usually gets a lower winning confidence here. The audit and clean
    /// thresholds (0.8, 0.85, 0.5) were tuned against the softmax scheme and
    /// may need adjusting for these scores.
    pub fn predict(
        &self,
        tokenizer: &Tokenizer,
        premise: &str,
        candidate_labels: &[&str],
        hypothesis_template: &str,
    ) -> Result<Vec<(String, f32)>> {
        let mut results = self.predict_raw(tokenizer, premise, candidate_labels, hypothesis_template)?;
        normalize_by_sum(&mut results);
        Ok(results)
    }

    fn predict_raw(
        &self,
        tokenizer: &Tokenizer,
        premise: &str,
        candidate_labels: &[&str],
        hypothesis_template: &str,
    ) -> Result<Vec<(String, f32)>> {
        if candidate_labels.is_empty() {
            return Ok(vec![]);
        }

        let mut encodings = Vec::with_capacity(candidate_labels.len());
        for &label in candidate_labels {
            let hypothesis = hypothesis_template.replace("{}", label);
            let encoding = tokenizer
                .encode((premise, hypothesis.as_str()), true)
                .map_err(|e| {
                    E::msg(format!(
                        "Tokenization failed on '{}': {e}",
                        premise.chars().take(50).collect::<String>()
                    ))
                })?;
            encodings.push(encoding);
        }

        let max_len = encodings.iter().map(|e| e.len()).max().unwrap_or(0);
        let pad_token_id = tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| tokenizer.token_to_id("[PAD]"))
            .or_else(|| tokenizer.token_to_id("<pad>"))
            .unwrap_or(0);

        let mut all_token_ids: Vec<u32> = Vec::with_capacity(max_len * encodings.len());
        let mut all_attention_masks: Vec<u32> = Vec::with_capacity(max_len * encodings.len());
        for encoding in encodings {
            let mut token_ids = encoding.get_ids().to_vec();
            let mut attention_mask = encoding.get_attention_mask().to_vec();
            token_ids.resize(max_len, pad_token_id);
            attention_mask.resize(max_len, 0);
            all_token_ids.extend(token_ids);
            all_attention_masks.extend(attention_mask);
        }

        let batch = candidate_labels.len();
        let input_ids = Tensor::from_vec(all_token_ids, (batch, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(all_attention_masks, (batch, max_len), &self.device)?;

        // [batch, 2]
        let logits = self.model.forward(&input_ids, &attention_mask)?;
        let probabilities = softmax(&logits, D::Minus1)?;
        let entailment_probs = probabilities
            .i((.., self.entailment_id))?
            .to_vec1::<f32>()?;

        Ok(candidate_labels
            .iter()
            .map(|&label| label.to_string())
            .zip(entailment_probs)
            .collect())
    }

}

/// Divides every score by the total; all-zero scores are left as they are.
fn normalize_by_sum(results: &mut [(String, f32)]) {
    let sum: f32 = results.iter().map(|(_, p)| p).sum();
    if sum > 0.0 {
        for (_, p) in results.iter_mut() {
            *p /= sum;
        }
    }
}

impl crate::pipelines::zero_shot::model::ZeroShotClassificationModel for ZeroShotModernBertModel {
    type Options = ModelSource;
    type Files = ModelFiles;

    fn resolve(options: Self::Options) -> Result<Self::Files> {
        ModelFilesLoader::new(options).load()
    }

    fn new(files: &Self::Files, device: Device) -> Result<Self> {
        ZeroShotModernBertModel::from_files(files, device)
    }

    fn predict(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
        candidate_labels: &[&str],
        hypothesis_template: &str,
    ) -> Result<Vec<(String, f32)>> {
        ZeroShotModernBertModel::predict(self, tokenizer, text, candidate_labels, hypothesis_template)
    }

    fn get_tokenizer(files: &Self::Files) -> Result<Tokenizer> {
        load_tokenizer(files)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_map_to_zero_shot_checkpoints() {
        assert_eq!(
            ModernBertSize::Base.source(),
            ModelSource::hub("MoritzLaurer/ModernBERT-base-zeroshot-v2.0")
        );
        assert_eq!(ModernBertSize::default(), ModernBertSize::Large);
    }

    #[test]
    fn entailment_probabilities_are_divided_by_their_sum() {
        // Softmax over these as logits would give roughly [0.44, 0.32, 0.24].
        let mut scores = vec![
            ("Legal".to_string(), 0.9),
            ("Travel".to_string(), 0.6),
            ("None of the above".to_string(), 0.3),
        ];
        normalize_by_sum(&mut scores);
        let probs: Vec<f32> = scores.iter().map(|(_, p)| *p).collect();
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 1.0 / 3.0).abs() < 1e-6);
        assert!((probs[2] - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn size_parses_case_insensitively() {
        assert_eq!("BASE".parse::<ModernBertSize>(), Ok(ModernBertSize::Base));
        assert!("xl".parse::<ModernBertSize>().is_err());
    }
}
