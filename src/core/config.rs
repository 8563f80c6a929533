//! Runtime configuration.
//!
//! Every field has a default, so an absent config file and `{}` behave the
//! same. A file only needs the keys it wants to change:
//!
//! ```json
//! {
//!   "model": { "size": "base", "device": "cpu" },
//!   "output": { "decimals": 2 }
//! }
//! ```

use crate::core::error::{Result, TagGenieError};
use crate::models::ModernBertSize;
use crate::pipelines::utils::DeviceRequest;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagGenieConfig {
    pub model: ModelConfig,
    pub output: OutputConfig,
    pub report: ReportConfig,
    pub audit: AuditConfig,
}

impl TagGenieConfig {
    /// Reads a JSON config file, or returns the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TagGenieError::invalid_input(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            TagGenieError::invalid_input(format!(
                "failed to parse config file {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.model.hypothesis_template.contains("{}") {
            return Err(TagGenieError::invalid_input(format!(
                "hypothesis template {:?} must contain a {{}} placeholder",
                self.model.hypothesis_template
            )));
        }
        if self.report.top_k == 0 {
            return Err(TagGenieError::invalid_input("report.top_k must be at least 1"));
        }
        if self.output.label_column == self.output.confidence_column {
            return Err(TagGenieError::invalid_input(
                "output.label_column and output.confidence_column must differ",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceChoice {
    /// CUDA device `cuda_index` when available, CPU otherwise.
    #[default]
    Auto,
    Cpu,
    Cuda,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub size: ModernBertSize,
    /// Local directory with `config.json`, `tokenizer.json` and weights.
    /// When set the Hugging Face Hub is never contacted.
    pub dir: Option<PathBuf>,
    pub device: DeviceChoice,
    pub cuda_index: usize,
    pub hypothesis_template: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            size: ModernBertSize::Large,
            dir: None,
            device: DeviceChoice::Auto,
            cuda_index: 0,
            hypothesis_template: DEFAULT_HYPOTHESIS_TEMPLATE.to_string(),
        }
    }
}

impl ModelConfig {
    pub fn device_request(&self) -> DeviceRequest {
        match self.device {
            DeviceChoice::Auto => DeviceRequest::Default,
            DeviceChoice::Cpu => DeviceRequest::Cpu,
            DeviceChoice::Cuda => DeviceRequest::Cuda(self.cuda_index),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub label_column: String,
    pub confidence_column: String,
    /// Decimal places used when writing confidences.
    pub decimals: usize,
    /// Written into the label column of rows whose classification failed.
    pub failed_label: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            label_column: "Predicted_Tag".to_string(),
            confidence_column: "Confidence_Score".to_string(),
            decimals: 4,
            failed_label: "ERROR".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub top_k: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    pub category_column: String,
    pub name_column: String,
    /// Above this a prediction counts as high confidence.
    pub high_confidence: f32,
    /// Below this a prediction counts as low confidence.
    pub low_confidence: f32,
    /// Above this `clean` replaces a mismatching category.
    pub fix_confidence: f32,
    pub danger_examples: usize,
    /// Predicted (long) tag to the category vocabulary used for comparison.
    pub tag_map: HashMap<String, String>,
    /// Predicted (long) tag to the short tag written by `clean`.
    pub short_tag_map: HashMap<String, String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            category_column: "Category".to_string(),
            name_column: "Name".to_string(),
            high_confidence: 0.8,
            low_confidence: 0.5,
            fix_confidence: 0.85,
            danger_examples: 10,
            tag_map: string_map(&[
                ("Legal Services and Immigration Consultants", "Legal & Immigration"),
                ("Chartered Accountants and Tax Consultants", "Finance & Tax"),
                ("Relocation Services and Lifestyle Management", "Relocation & Lifestyle"),
                ("Real Estate Agency and Property Rentals", "Real Estate"),
                ("None of the above", "None"),
            ]),
            short_tag_map: string_map(&[
                ("Legal Services and Immigration Consultants", "Legal"),
                ("Chartered Accountants and Tax Consultants", "Finance"),
                ("Relocation Services and Lifestyle Management", "Lifestyle"),
                ("Real Estate Agency and Property Rentals", "Real Estate"),
                ("None of the above", "None"),
            ]),
        }
    }
}

fn string_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
