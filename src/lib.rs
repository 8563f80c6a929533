//! Zero-shot tagging of free text against a tag set you choose at runtime.
//!
//! A pretrained NLI model scores every tag, plus a synthetic
//! "None of the above" label, against the text. The best-scoring label wins
//! and its probability is reported as the confidence. Texts can be tagged
//! one at a time or as the rows of a CSV file.

pub mod core;
pub mod loaders;
pub mod models;
pub mod pipelines;
pub mod tagging;

pub use core::{Result, TagGenieConfig, TagGenieError};
pub use tagging::{Classifier, ClassificationResult, LabelSet, ScoreDistribution, ABSTENTION_LABEL};
