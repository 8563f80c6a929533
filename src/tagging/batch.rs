//! Tagging every row of a CSV table.
//!
//! The input header is checked for the text column as soon as a
//! [`BatchJob`] is opened, before any row is read or any model work is done.
//! Rows are then classified strictly in order against one shared
//! [`Classifier`]. A row whose classification fails is written with the
//! failure marker instead of aborting the run. Short rows are padded with
//! empty fields; a row without a text field is classified as `""`.

use super::classifier::Classifier;
use super::decision::ClassificationResult;
use super::labels::LabelSet;
use super::single::classify_and_decide;
use crate::core::config::OutputConfig;
use crate::core::{Result, TagGenieError};
use csv::StringRecord;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

const BOM: char = '\u{feff}';

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub text_column: String,
    pub label_column: String,
    pub confidence_column: String,
    pub decimals: usize,
    pub failed_label: String,
}

impl BatchOptions {
    pub fn new(text_column: impl Into<String>) -> Self {
        Self::from_config(text_column, &OutputConfig::default())
    }

    pub fn from_config(text_column: impl Into<String>, output: &OutputConfig) -> Self {
        Self {
            text_column: text_column.into(),
            label_column: output.label_column.clone(),
            confidence_column: output.confidence_column.clone(),
            decimals: output.decimals,
            failed_label: output.failed_label.clone(),
        }
    }
}

/// What happened to one row.
#[derive(Debug)]
pub enum RowOutcome {
    Tagged(ClassificationResult),
    Failed(TagGenieError),
}

impl RowOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, RowOutcome::Failed(_))
    }
}

/// Passed to the progress callback after each row.
#[derive(Debug)]
pub struct BatchProgress<'a> {
    /// 1-based data row number (the header is not counted).
    pub row: usize,
    pub total: usize,
    pub outcome: &'a RowOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRow {
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub tagged: usize,
    pub abstained: usize,
    pub failed: Vec<FailedRow>,
}

/// An input table whose header has been validated and whose rows are loaded.
#[derive(Debug)]
pub struct BatchJob {
    headers: StringRecord,
    rows: Vec<StringRecord>,
    text_index: usize,
    options: BatchOptions,
}

impl BatchJob {
    pub fn open(path: impl AsRef<Path>, options: BatchOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            TagGenieError::invalid_input(format!("cannot open input file {}: {e}", path.display()))
        })?;
        Self::from_reader(file, options)
    }

    /// Reads the header, fails with [`TagGenieError::InvalidInput`] if the
    /// text column is missing, then loads every row.
    pub fn from_reader<R: Read>(reader: R, options: BatchOptions) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = strip_bom(reader.headers()?);
        let text_index = headers
            .iter()
            .position(|h| h == options.text_column)
            .ok_or_else(|| {
                TagGenieError::invalid_input(format!(
                    "column '{}' not found in the CSV header (available: {})",
                    options.text_column,
                    headers.iter().collect::<Vec<_>>().join(", ")
                ))
            })?;

        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::debug!(rows = rows.len(), column = %options.text_column, "loaded input table");

        Ok(Self {
            headers,
            rows,
            text_index,
            options,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn run<C, W>(self, classifier: &C, labels: &LabelSet, writer: W) -> Result<BatchSummary>
    where
        C: Classifier + ?Sized,
        W: Write,
    {
        self.run_with_progress(classifier, labels, writer, |_| {})
    }

    /// Classifies every row in order and writes the table with the label
    /// and confidence columns appended.
    ///
    /// Row-level [`TagGenieError::Inference`] failures are recorded and the
    /// run continues; any other error ends the run.
    pub fn run_with_progress<C, W, F>(
        self,
        classifier: &C,
        labels: &LabelSet,
        writer: W,
        mut on_row: F,
    ) -> Result<BatchSummary>
    where
        C: Classifier + ?Sized,
        W: Write,
        F: FnMut(BatchProgress<'_>),
    {
        let Self {
            headers,
            rows,
            text_index,
            options,
        } = self;

        let mut writer = csv::Writer::from_writer(writer);
        let mut out_headers = headers.clone();
        out_headers.push_field(&options.label_column);
        out_headers.push_field(&options.confidence_column);
        writer.write_record(&out_headers)?;

        let width = headers.len();
        let total = rows.len();
        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };
        tracing::info!(rows = total, labels = labels.len(), "tagging rows");

        for (i, mut record) in rows.into_iter().enumerate() {
            let row = i + 1;
            let text = record.get(text_index).unwrap_or("");

            let outcome = match classify_and_decide(classifier, text, labels) {
                Ok(result) => RowOutcome::Tagged(result),
                Err(err) if err.is_row_recoverable() => {
                    tracing::warn!(row, error = %err, "row failed, continuing");
                    RowOutcome::Failed(err)
                }
                Err(err) => return Err(err),
            };

            pad_record(&mut record, width);
            match &outcome {
                RowOutcome::Tagged(result) => {
                    summary.tagged += 1;
                    if result.is_abstention() {
                        summary.abstained += 1;
                    }
                    record.push_field(result.predicted_label());
                    record.push_field(&format!(
                        "{:.*}",
                        options.decimals,
                        result.confidence()
                    ));
                }
                RowOutcome::Failed(err) => {
                    summary.failed.push(FailedRow {
                        row,
                        error: err.to_string(),
                    });
                    record.push_field(&options.failed_label);
                    record.push_field("");
                }
            }

            writer.write_record(&record)?;
            on_row(BatchProgress {
                row,
                total,
                outcome: &outcome,
            });
        }

        writer.flush()?;
        tracing::info!(
            tagged = summary.tagged,
            abstained = summary.abstained,
            failed = summary.failed.len(),
            "batch finished"
        );
        Ok(summary)
    }
}

/// Tags `input` into `output` in one go.
pub fn process_file<C>(
    classifier: &C,
    labels: &LabelSet,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: BatchOptions,
) -> Result<BatchSummary>
where
    C: Classifier + ?Sized,
{
    let job = BatchJob::open(input, options)?;
    let out = File::create(output.as_ref())?;
    job.run(classifier, labels, out)
}

/// Fills a short record with empty fields up to `width`.
pub(crate) fn pad_record(record: &mut StringRecord, width: usize) {
    while record.len() < width {
        record.push_field("");
    }
}

pub(crate) fn strip_bom(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| if i == 0 { h.trim_start_matches(BOM) } else { h })
        .collect()
}
