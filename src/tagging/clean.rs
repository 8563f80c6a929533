//! Applying the compliance policy to an audited table.
//!
//! Every row gets an `Audit_Status` and a `Final_Tag`. A confident
//! prediction that disagrees with the existing category replaces it (when
//! the prediction maps to a real short tag); a low-confidence prediction is
//! flagged for review; everything else keeps its category.

use super::audit::{AuditColumns, AuditRow};
use super::batch::{pad_record, strip_bom};
use crate::core::config::{AuditConfig, TagGenieConfig};
use crate::core::{Result, TagGenieError};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub const STATUS_COLUMN: &str = "Audit_Status";
pub const FINAL_TAG_COLUMN: &str = "Final_Tag";

/// Short tag meaning "no category"; never used as a replacement.
const NO_CATEGORY: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    AutoFixed,
    Verified,
    NeedsReview,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::AutoFixed => "AUTO_FIXED",
            AuditStatus::Verified => "VERIFIED",
            AuditStatus::NeedsReview => "NEEDS_REVIEW",
        }
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub total: usize,
    pub verified: usize,
    pub needs_review: usize,
    pub auto_fixed: usize,
}

impl CleanSummary {
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }
}

/// Status and final tag for one row.
pub(crate) fn resolve(row: &AuditRow<'_>, policy: &AuditConfig) -> (AuditStatus, String) {
    if row.confidence > policy.fix_confidence && !row.matches(&policy.tag_map) {
        return match policy.short_tag_map.get(row.predicted) {
            Some(short) if short != NO_CATEGORY => (AuditStatus::AutoFixed, short.clone()),
            _ => (AuditStatus::Verified, row.original.to_string()),
        };
    }
    if row.confidence < policy.low_confidence {
        return (AuditStatus::NeedsReview, row.original.to_string());
    }
    (AuditStatus::Verified, row.original.to_string())
}

pub fn clean<R: Read, W: Write>(reader: R, writer: W, config: &TagGenieConfig) -> Result<CleanSummary> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = strip_bom(reader.headers()?);
    let columns = AuditColumns::locate(&headers, config)?;

    let mut writer = csv::Writer::from_writer(writer);
    let mut out_headers = headers.clone();
    out_headers.push_field(STATUS_COLUMN);
    out_headers.push_field(FINAL_TAG_COLUMN);
    writer.write_record(&out_headers)?;

    let mut summary = CleanSummary::default();
    for record in reader.records() {
        let mut record = record?;
        let (status, final_tag) = resolve(&columns.read(&record), &config.audit);

        summary.total += 1;
        match status {
            AuditStatus::AutoFixed => summary.auto_fixed += 1,
            AuditStatus::Verified => summary.verified += 1,
            AuditStatus::NeedsReview => summary.needs_review += 1,
        }

        pad_record(&mut record, headers.len());
        record.push_field(status.as_str());
        record.push_field(&final_tag);
        writer.write_record(&record)?;
    }
    writer.flush()?;

    tracing::debug!(?summary, "clean finished");
    Ok(summary)
}

pub fn clean_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &TagGenieConfig,
) -> Result<CleanSummary> {
    let input = input.as_ref();
    let file = File::open(input).map_err(|e| {
        TagGenieError::invalid_input(format!("cannot open input file {}: {e}", input.display()))
    })?;
    let out = File::create(output.as_ref())?;
    clean(file, out, config)
}
