pub mod config;
pub mod error;

pub use config::TagGenieConfig;
pub use error::{Result, TagGenieError};
