mod common;

use common::{read_csv, BrokenClassifier, FixedClassifier, KeywordClassifier};
use std::fmt::Write as _;
use tag_genie::tagging::{process_file, BatchJob, BatchOptions, LabelSet, ABSTENTION_LABEL};
use tag_genie::TagGenieError;

const LISTINGS: &str = "\
Name,Description,City
Acme Law,Legal advice for visas,Dubai
Sky Tours,Travel packages and tours,Abu Dhabi
Pizza Place,Best pizza in town,Sharjah
";

fn labels() -> LabelSet {
    LabelSet::new(["Legal", "Travel", "Real Estate"]).unwrap()
}

#[test]
fn appends_label_and_confidence_and_keeps_rows() -> anyhow::Result<()> {
    let classifier = KeywordClassifier::default();
    let job = BatchJob::from_reader(LISTINGS.as_bytes(), BatchOptions::new("Description"))?;

    let mut out = Vec::new();
    let summary = job.run(&classifier, &labels(), &mut out)?;

    let (headers, rows) = read_csv(&out);
    assert_eq!(
        headers,
        ["Name", "Description", "City", "Predicted_Tag", "Confidence_Score"]
    );
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][..3], ["Acme Law", "Legal advice for visas", "Dubai"]);
    assert_eq!(rows[0][3], "Legal");
    assert_eq!(rows[0][4], "0.7000");
    assert_eq!(rows[1][3], "Travel");
    assert_eq!(rows[2][3], ABSTENTION_LABEL);
    assert_eq!(rows[2][..3], ["Pizza Place", "Best pizza in town", "Sharjah"]);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.tagged, 3);
    assert_eq!(summary.abstained, 1);
    assert!(summary.failed.is_empty());
    Ok(())
}

#[test]
fn failing_row_is_marked_and_the_rest_still_tagged() -> anyhow::Result<()> {
    let mut input = String::from("id,text\n");
    for i in 1..=1000 {
        let text = if i == 500 { "FAIL" } else { "legal question" };
        writeln!(input, "{i},{text}")?;
    }

    let classifier = KeywordClassifier::default();
    let job = BatchJob::from_reader(input.as_bytes(), BatchOptions::new("text"))?;
    let mut out = Vec::new();
    let summary = job.run(&classifier, &LabelSet::new(["Legal"])?, &mut out)?;

    let (_, rows) = read_csv(&out);
    assert_eq!(rows.len(), 1000);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row[0], (i + 1).to_string());
        if i + 1 == 500 {
            assert_eq!(row[2], "ERROR");
            assert_eq!(row[3], "");
        } else {
            assert_eq!(row[2], "Legal");
            assert_eq!(row[3], "0.7000");
        }
    }

    assert_eq!(summary.tagged, 999);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].row, 500);
    Ok(())
}

#[test]
fn missing_text_column_fails_before_any_row() {
    let err = BatchJob::from_reader(LISTINGS.as_bytes(), BatchOptions::new("Text")).unwrap_err();
    assert!(matches!(err, TagGenieError::InvalidInput(_)));
    assert!(err.to_string().contains("'Text'"));
}

#[test]
fn empty_text_is_still_classified() -> anyhow::Result<()> {
    let classifier = KeywordClassifier::default();
    let input = "name,text\nA,\nB,travel\n";
    let job = BatchJob::from_reader(input.as_bytes(), BatchOptions::new("text"))?;
    job.run(&classifier, &labels(), std::io::sink())?;

    let calls = classifier.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "");
    Ok(())
}

#[test]
fn short_row_is_padded_and_still_classified() -> anyhow::Result<()> {
    let input = "id,city,text\n1,Dubai,legal help\n2,Sharjah\n3,Ajman,legal visa\n";
    let classifier = KeywordClassifier::default();
    let job = BatchJob::from_reader(input.as_bytes(), BatchOptions::new("text"))?;
    let mut out = Vec::new();
    let summary = job.run(&classifier, &labels(), &mut out)?;

    let (headers, rows) = read_csv(&out);
    assert_eq!(headers.len(), 5);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][3], "Legal");
    assert_eq!(rows[1], ["2", "Sharjah", "", ABSTENTION_LABEL, "0.7000"]);
    assert_eq!(rows[2][3], "Legal");

    assert_eq!(classifier.calls.borrow()[1].0, "");
    assert_eq!(summary.tagged, 3);
    assert!(summary.failed.is_empty());
    Ok(())
}

#[test]
fn every_row_sees_the_same_label_set() -> anyhow::Result<()> {
    let classifier = KeywordClassifier::default();
    let job = BatchJob::from_reader(LISTINGS.as_bytes(), BatchOptions::new("Description"))?;
    job.run(&classifier, &labels(), std::io::sink())?;

    let calls = classifier.calls.borrow();
    assert_eq!(calls.len(), 3);
    for (_, seen) in calls.iter() {
        assert_eq!(seen.as_slice(), labels().labels());
    }
    Ok(())
}

#[test]
fn non_row_errors_abort_the_run() -> anyhow::Result<()> {
    let job = BatchJob::from_reader(LISTINGS.as_bytes(), BatchOptions::new("Description"))?;
    let err = job
        .run(&BrokenClassifier, &labels(), std::io::sink())
        .unwrap_err();
    assert!(matches!(err, TagGenieError::ModelUnavailable(_)));
    Ok(())
}

#[test]
fn byte_order_mark_is_ignored_in_header() -> anyhow::Result<()> {
    let input = "\u{feff}text,other\nlegal,x\n";
    let job = BatchJob::from_reader(input.as_bytes(), BatchOptions::new("text"))?;
    assert_eq!(&job.headers()[0], "text");

    let mut out = Vec::new();
    job.run(&KeywordClassifier::default(), &labels(), &mut out)?;
    let (headers, _) = read_csv(&out);
    assert_eq!(headers[0], "text");
    Ok(())
}

#[test]
fn progress_reports_each_row_in_order() -> anyhow::Result<()> {
    let job = BatchJob::from_reader(LISTINGS.as_bytes(), BatchOptions::new("Description"))?;
    let mut seen = Vec::new();
    job.run_with_progress(
        &KeywordClassifier::default(),
        &labels(),
        std::io::sink(),
        |p| seen.push((p.row, p.total, p.outcome.is_failed())),
    )?;
    assert_eq!(seen, [(1, 3, false), (2, 3, false), (3, 3, false)]);
    Ok(())
}

#[test]
fn output_columns_and_precision_follow_options() -> anyhow::Result<()> {
    let options = BatchOptions {
        label_column: "tag".into(),
        confidence_column: "score".into(),
        decimals: 2,
        ..BatchOptions::new("Description")
    };
    let classifier = FixedClassifier::new(&[0.125, 0.5, 0.25, 0.125]);
    let job = BatchJob::from_reader(LISTINGS.as_bytes(), options)?;
    let mut out = Vec::new();
    job.run(&classifier, &labels(), &mut out)?;

    let (headers, rows) = read_csv(&out);
    assert_eq!(headers[3..], ["tag", "score"]);
    assert_eq!(rows[0][3], "Travel");
    assert_eq!(rows[0][4], "0.50");
    Ok(())
}

#[test]
fn process_file_round_trip_on_disk() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    std::fs::write(&input, LISTINGS)?;

    let summary = process_file(
        &KeywordClassifier::default(),
        &labels(),
        &input,
        &output,
        BatchOptions::new("Description"),
    )?;
    assert_eq!(summary.total, 3);

    let (_, rows) = read_csv(&std::fs::read(&output)?);
    assert_eq!(rows.len(), 3);
    Ok(())
}

#[test]
fn missing_input_file_is_invalid_input() {
    let err = BatchJob::open("/definitely/not/here.csv", BatchOptions::new("text")).unwrap_err();
    assert!(matches!(err, TagGenieError::InvalidInput(_)));
}
