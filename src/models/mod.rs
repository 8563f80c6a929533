pub mod modernbert;

pub use modernbert::{ModernBertSize, ZeroShotModernBertModel};
