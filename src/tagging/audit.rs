//! Agreement and risk analysis of a processed table.
//!
//! Compares each row's existing category with the predicted tag (mapped to
//! the category vocabulary through `audit.tag_map`) and counts agreements,
//! low-confidence predictions, and confident disagreements ("danger" rows).

use super::batch::strip_bom;
use crate::core::config::TagGenieConfig;
use crate::core::{Result, TagGenieError};
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A confident prediction that disagrees with the existing category.
#[derive(Debug, Clone, PartialEq)]
pub struct DangerRow {
    pub name: String,
    pub original: String,
    pub predicted: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditReport {
    pub total: usize,
    pub agreements: usize,
    pub high_confidence_agreements: usize,
    pub low_confidence: usize,
    pub danger: Vec<DangerRow>,
}

impl AuditReport {
    /// `count` as a percentage of all rows; 0 for an empty table.
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }

    pub fn high_confidence_disagreements(&self) -> usize {
        self.danger.len()
    }
}

/// Column positions shared by `audit` and `clean`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AuditColumns {
    name: Option<usize>,
    category: Option<usize>,
    label: usize,
    confidence: usize,
}

impl AuditColumns {
    pub(crate) fn locate(headers: &StringRecord, config: &TagGenieConfig) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                TagGenieError::invalid_input(format!(
                    "column '{name}' not found; run `process` on this file first"
                ))
            })
        };

        Ok(Self {
            name: find(&config.audit.name_column),
            category: find(&config.audit.category_column),
            label: require(&config.output.label_column)?,
            confidence: require(&config.output.confidence_column)?,
        })
    }

    pub(crate) fn read<'r>(&self, record: &'r StringRecord) -> AuditRow<'r> {
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();
        AuditRow {
            name: field(self.name),
            original: field(self.category),
            predicted: field(Some(self.label)),
            confidence: parse_confidence(field(Some(self.confidence))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct AuditRow<'r> {
    pub(crate) name: &'r str,
    pub(crate) original: &'r str,
    pub(crate) predicted: &'r str,
    pub(crate) confidence: f32,
}

impl AuditRow<'_> {
    /// The predicted tag in the category vocabulary; unmapped tags pass through.
    pub(crate) fn predicted_short<'m>(&'m self, tag_map: &'m HashMap<String, String>) -> &'m str {
        tag_map
            .get(self.predicted)
            .map(String::as_str)
            .unwrap_or(self.predicted)
    }

    pub(crate) fn matches(&self, tag_map: &HashMap<String, String>) -> bool {
        self.original == self.predicted_short(tag_map)
    }
}

/// Empty, unparseable and non-finite confidences count as 0.
pub(crate) fn parse_confidence(raw: &str) -> f32 {
    raw.parse::<f32>()
        .ok()
        .filter(|c| c.is_finite())
        .unwrap_or(0.0)
}

pub fn audit<R: Read>(reader: R, config: &TagGenieConfig) -> Result<AuditReport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = strip_bom(reader.headers()?);
    let columns = AuditColumns::locate(&headers, config)?;
    let thresholds = &config.audit;

    let mut report = AuditReport::default();
    for record in reader.records() {
        let record = record?;
        let row = columns.read(&record);
        report.total += 1;

        if row.matches(&thresholds.tag_map) {
            report.agreements += 1;
            if row.confidence > thresholds.high_confidence {
                report.high_confidence_agreements += 1;
            }
        } else if row.confidence > thresholds.high_confidence {
            report.danger.push(DangerRow {
                name: row.name.to_string(),
                original: row.original.to_string(),
                predicted: row.predicted.to_string(),
                confidence: row.confidence,
            });
        }

        if row.confidence < thresholds.low_confidence {
            report.low_confidence += 1;
        }
    }

    tracing::debug!(
        total = report.total,
        agreements = report.agreements,
        danger = report.danger.len(),
        "audit finished"
    );
    Ok(report)
}

pub fn audit_file(path: impl AsRef<Path>, config: &TagGenieConfig) -> Result<AuditReport> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        TagGenieError::invalid_input(format!("cannot open input file {}: {e}", path.display()))
    })?;
    audit(file, config)
}
