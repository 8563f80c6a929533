#![allow(dead_code)]

use std::cell::RefCell;
use tag_genie::{Classifier, LabelSet, Result, ScoreDistribution, TagGenieError};

/// Returns the same scores for every text.
pub struct FixedClassifier {
    pub scores: Vec<f32>,
    pub calls: RefCell<usize>,
}

impl FixedClassifier {
    pub fn new(scores: &[f32]) -> Self {
        Self {
            scores: scores.to_vec(),
            calls: RefCell::new(0),
        }
    }
}

impl Classifier for FixedClassifier {
    fn classify(&self, _text: &str, labels: &LabelSet) -> Result<ScoreDistribution> {
        *self.calls.borrow_mut() += 1;
        ScoreDistribution::new(labels, &self.scores)
    }
}

/// Gives 0.7 to the first tag mentioned in the text (case-insensitive), or
/// to the abstention label when none is, and spreads 0.3 over the rest.
/// Texts containing `FAIL` produce an inference error.
#[derive(Default)]
pub struct KeywordClassifier {
    pub calls: RefCell<Vec<(String, Vec<String>)>>,
}

impl Classifier for KeywordClassifier {
    fn classify(&self, text: &str, labels: &LabelSet) -> Result<ScoreDistribution> {
        self.calls
            .borrow_mut()
            .push((text.to_string(), labels.labels().to_vec()));

        if text.contains("FAIL") {
            return Err(TagGenieError::inference(format!("cannot score {text:?}")));
        }

        let lowered = text.to_lowercase();
        let winner = labels
            .tags()
            .iter()
            .position(|tag| lowered.contains(&tag.to_lowercase()))
            .unwrap_or(labels.len() - 1);

        let rest = 0.3 / (labels.len() - 1) as f32;
        let scores: Vec<f32> = (0..labels.len())
            .map(|i| if i == winner { 0.7 } else { rest })
            .collect();
        ScoreDistribution::new(labels, &scores)
    }
}

/// Fails every call as if the model had gone away.
pub struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn classify(&self, _text: &str, _labels: &LabelSet) -> Result<ScoreDistribution> {
        Err(TagGenieError::ModelUnavailable("device lost".into()))
    }
}

/// Parses CSV bytes into header + rows of owned strings.
pub fn read_csv(bytes: &[u8]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}
