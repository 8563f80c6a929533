//! Zero-shot text classification backed by a ModernBERT NLI model.
//!
//! Each `(text, label)` pair becomes an NLI problem: the text is the premise
//! and the hypothesis is built from a template such as
//! `"This example is {}."`. The entailment probability of every hypothesis is
//! normalized across the label set, giving a distribution that sums to 1.
//!
//! ```rust,no_run
//! use tag_genie::pipelines::zero_shot::{ModernBertSize, ZeroShotClassificationPipelineBuilder};
//! use tag_genie::tagging::{Classifier, LabelSet};
//!
//! # fn main() -> tag_genie::Result<()> {
//! let pipeline = ZeroShotClassificationPipelineBuilder::modernbert(ModernBertSize::Base)
//!     .cpu()
//!     .build()?;
//! let labels = LabelSet::new(["Legal", "Travel", "Real Estate"])?;
//!
//! let scores = pipeline.classify("We provide legal visa consulting services", &labels)?;
//! for (label, p) in scores.iter() {
//!     println!("{label}: {p:.4}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod model;
pub mod pipeline;

pub use crate::models::ModernBertSize;
pub use builder::ZeroShotClassificationPipelineBuilder;
pub use model::ZeroShotClassificationModel;
pub use pipeline::ZeroShotClassificationPipeline;

/// Only for generic annotations. Use [`ZeroShotClassificationPipelineBuilder::modernbert`].
pub type ZeroShotModernBert = crate::models::ZeroShotModernBertModel;
