//! Picking one tag from a caller-defined tag set.
//!
//! The flow for one text is: [`LabelSet`] (tags plus the abstention label)
//! → [`Classifier`] (a probability per label) → [`decide`] (winner and
//! confidence). [`batch`] runs the same flow over the rows of a CSV table,
//! and [`audit`] / [`clean`] post-process tables produced that way.

pub mod audit;
pub mod batch;
pub mod classifier;
pub mod clean;
pub mod decision;
pub mod labels;
pub mod single;

pub use audit::{audit, audit_file, AuditReport, DangerRow};
pub use batch::{process_file, BatchJob, BatchOptions, BatchProgress, BatchSummary, FailedRow, RowOutcome};
pub use classifier::{Classifier, ScoreDistribution};
pub use clean::{clean, clean_file, AuditStatus, CleanSummary};
pub use decision::{decide, ClassificationResult};
pub use labels::{parse_tag_list, LabelSet, ABSTENTION_LABEL};
pub use single::{classify_and_decide, tag_text, tag_text_with_tags, TagReport, DEFAULT_TOP_K};
