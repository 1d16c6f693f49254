//! Ordered label vocabulary of the subject classifier.
//!
//! Index `i` names classifier output slot `i`. The vocabulary reserves
//! [`UNKNOWN_LABEL`] for slots that carry no subject; those are never reported.

use arxivist_core::config::UNKNOWN_LABEL;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    labels: Vec<String>,
}

impl LabelVocabulary {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label of output slot `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Label of output slot `index`, unless it is missing or the unknown sentinel.
    pub fn subject(&self, index: usize) -> Option<&str> {
        self.get(index).filter(|label| !is_unknown(label))
    }
}

impl From<Vec<String>> for LabelVocabulary {
    fn from(labels: Vec<String>) -> Self {
        Self::new(labels)
    }
}

pub fn is_unknown(label: &str) -> bool {
    label == UNKNOWN_LABEL
}
