use super::model::ZeroShotClassificationModel;
use super::pipeline::ZeroShotClassificationPipeline;
use crate::core::config::{ModelConfig, DEFAULT_HYPOTHESIS_TEMPLATE};
use crate::core::{Result, TagGenieError};
use crate::loaders::ModelSource;
use crate::models::{ModernBertSize, ZeroShotModernBertModel};
use crate::pipelines::utils::DeviceRequest;
use std::path::PathBuf;
use std::time::Instant;

pub struct ZeroShotClassificationPipelineBuilder<M: ZeroShotClassificationModel> {
    options: M::Options,
    device_request: DeviceRequest,
    hypothesis_template: String,
}

impl<M: ZeroShotClassificationModel> ZeroShotClassificationPipelineBuilder<M> {
    pub fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Default,
            hypothesis_template: DEFAULT_HYPOTHESIS_TEMPLATE.to_string(),
        }
    }

    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    pub fn cuda_device(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    pub fn device_request(mut self, request: DeviceRequest) -> Self {
        self.device_request = request;
        self
    }

    /// Template turning a label into an NLI hypothesis; `{}` marks the label.
    pub fn hypothesis_template(mut self, template: impl Into<String>) -> Self {
        self.hypothesis_template = template.into();
        self
    }

    /// Loads the model and tokenizer. This is the slow step; build once and
    /// reuse the pipeline for every text.
    pub fn build(self) -> Result<ZeroShotClassificationPipeline<M>> {
        if !self.hypothesis_template.contains("{}") {
            return Err(TagGenieError::invalid_input(format!(
                "hypothesis template {:?} must contain a {{}} placeholder",
                self.hypothesis_template
            )));
        }

        let started = Instant::now();
        tracing::info!(options = ?self.options, "loading zero-shot classification model");

        let device = self
            .device_request
            .resolve()
            .map_err(|e| TagGenieError::ModelUnavailable(format!("{e:#}")))?;
        let files = M::resolve(self.options)
            .map_err(|e| TagGenieError::ModelUnavailable(format!("{e:#}")))?;
        let model = M::new(&files, device)
            .map_err(|e| TagGenieError::ModelUnavailable(format!("{e:#}")))?;
        let tokenizer = M::get_tokenizer(&files)
            .map_err(|e| TagGenieError::ModelUnavailable(format!("{e:#}")))?;

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            device = ?model.device().location(),
            "model ready"
        );

        Ok(ZeroShotClassificationPipeline {
            model,
            tokenizer,
            hypothesis_template: self.hypothesis_template,
        })
    }
}

impl ZeroShotClassificationPipelineBuilder<ZeroShotModernBertModel> {
    pub fn modernbert(size: ModernBertSize) -> Self {
        Self::new(size.source())
    }

    /// Loads from a local directory instead of the Hugging Face Hub.
    pub fn modernbert_from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(ModelSource::local(dir))
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        let builder = match &config.dir {
            Some(dir) => Self::modernbert_from_dir(dir.clone()),
            None => Self::modernbert(config.size),
        };
        builder
            .device_request(config.device_request())
            .hypothesis_template(config.hypothesis_template.clone())
    }
}
