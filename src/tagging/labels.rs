//! Building the label set handed to the classifier.

use crate::core::{Result, TagGenieError};

/// Synthetic label meaning "no tag fits". It competes with the caller's tags
/// on equal footing and is always the last entry of a [`LabelSet`].
pub const ABSTENTION_LABEL: &str = "None of the above";

/// Caller tags, trimmed, followed by exactly one [`ABSTENTION_LABEL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Trims every candidate and appends the abstention label.
    ///
    /// Candidates that are blank after trimming are skipped, as are
    /// candidates equal to the abstention label, so it is never appended
    /// twice. Fails only when no tag is left; duplicates among real tags
    /// are kept.
    pub fn new<I, S>(candidates: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels = Vec::new();
        for (i, candidate) in candidates.into_iter().enumerate() {
            let tag = candidate.as_ref().trim();
            if tag.is_empty() {
                tracing::debug!(position = i + 1, "dropping blank tag");
                continue;
            }
            if tag == ABSTENTION_LABEL {
                tracing::debug!("dropping caller-supplied abstention label");
                continue;
            }
            labels.push(tag.to_string());
        }

        if labels.is_empty() {
            return Err(TagGenieError::invalid_input(
                "at least one tag is required besides the abstention label",
            ));
        }

        labels.push(ABSTENTION_LABEL.to_string());
        Ok(Self { labels })
    }

    /// Builds a label set from a comma-separated tag list such as
    /// `"Legal, Travel,,Real Estate"`. Blank entries are skipped.
    pub fn from_tag_list(raw: &str) -> Result<Self> {
        Self::new(parse_tag_list(raw))
    }

    /// All labels, abstention label last.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Only the caller's tags.
    pub fn tags(&self) -> &[String] {
        &self.labels[..self.labels.len() - 1]
    }

    pub fn as_strs(&self) -> Vec<&str> {
        self.labels.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false: a built set holds at least one tag plus the abstention label.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

/// Splits on commas, trims, and drops entries that end up empty.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_abstention_label_last() {
        let set = LabelSet::new(["Legal", "Travel", "Real Estate"]).unwrap();
        assert_eq!(
            set.labels(),
            ["Legal", "Travel", "Real Estate", ABSTENTION_LABEL]
        );
        assert_eq!(set.tags(), ["Legal", "Travel", "Real Estate"]);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn trims_candidates() {
        let set = LabelSet::new(["  Legal ", "\tTravel"]).unwrap();
        assert_eq!(set.tags(), ["Legal", "Travel"]);
    }

    #[test]
    fn rejects_empty_list() {
        let err = LabelSet::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, TagGenieError::InvalidInput(_)));
    }

    #[test]
    fn skips_blank_candidates() {
        let set = LabelSet::new(["Legal", "   ", "", "Travel"]).unwrap();
        assert_eq!(set.labels(), ["Legal", "Travel", ABSTENTION_LABEL]);
    }

    #[test]
    fn only_blank_candidates_is_invalid() {
        let err = LabelSet::new(["", "  \t"]).unwrap_err();
        assert!(matches!(err, TagGenieError::InvalidInput(_)));
    }

    #[test]
    fn never_appends_abstention_twice() {
        let once = LabelSet::new(["Legal", "Travel"]).unwrap();
        let again = LabelSet::new(once.labels()).unwrap();
        assert_eq!(once, again);

        let count = again.iter().filter(|l| *l == ABSTENTION_LABEL).count();
        assert_eq!(count, 1);
    }

    #[test]
    fn abstention_alone_is_not_a_tag_list() {
        assert!(LabelSet::new([ABSTENTION_LABEL]).is_err());
    }

    #[test]
    fn keeps_duplicate_tags() {
        let set = LabelSet::new(["Legal", "Legal"]).unwrap();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn tag_list_parsing_drops_blanks() {
        assert_eq!(
            parse_tag_list(" Legal, Travel ,, Real Estate ,"),
            vec!["Legal", "Travel", "Real Estate"]
        );
        let set = LabelSet::from_tag_list("Legal,,  ").unwrap();
        assert_eq!(set.tags(), ["Legal"]);
    }

    #[test]
    fn tag_list_of_only_commas_is_invalid() {
        assert!(matches!(
            LabelSet::from_tag_list(" , ,"),
            Err(TagGenieError::InvalidInput(_))
        ));
    }
}
