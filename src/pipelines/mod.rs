pub mod utils;
pub mod zero_shot;

pub use zero_shot::{ZeroShotClassificationPipeline, ZeroShotClassificationPipelineBuilder};
