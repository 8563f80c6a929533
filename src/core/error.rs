//! Error types for this crate.
//!
//! All fallible library operations return [`Result<T>`], which uses
//! [`TagGenieError`] as the error type.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`TagGenieError`] as the error type.
pub type Result<T> = std::result::Result<T, TagGenieError>;

#[derive(Debug, Error)]
pub enum TagGenieError {
    /// Malformed or missing caller-supplied configuration: an empty tag list,
    /// a missing text column, an unreadable config file.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The inference model could not be initialized (missing weights,
    /// no compute backend, download failure).
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Scoring one text against the label set failed.
    #[error("inference failed: {0}")]
    Inference(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl TagGenieError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        TagGenieError::InvalidInput(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        TagGenieError::Inference(msg.into())
    }

    /// Whether a batch run may record this error against one row and keep going.
    pub fn is_row_recoverable(&self) -> bool {
        matches!(self, TagGenieError::Inference(_))
    }
}

impl From<hf_hub::api::sync::ApiError> for TagGenieError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        TagGenieError::ModelUnavailable(format!("HuggingFace API error: {value}"))
    }
}
