use crate::index::DocId;
use std::collections::{BTreeMap, BTreeSet};

/// Which query labels matched which document.
///
/// Entries appear on first match and are never removed. Documents iterate
/// by ascending id, labels by ascending string order.
#[derive(Debug, Clone, Default)]
pub struct DocumentQueryLedger {
    matches: BTreeMap<DocId, BTreeSet<String>>,
}

impl DocumentQueryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `label` matched `doc_id`. Recording the same pair twice
    /// has no further effect.
    pub fn record_match(&mut self, doc_id: DocId, label: &str) {
        let labels = self.matches.entry(doc_id).or_default();
        if !labels.contains(label) {
            labels.insert(label.to_string());
        }
    }

    /// Labels that matched `doc_id`, if any did
    pub fn query_labels_for(&self, doc_id: DocId) -> Option<&BTreeSet<String>> {
        self.matches.get(&doc_id)
    }

    /// Labels of `doc_id` joined with commas, as written to reports
    pub fn joined_labels(&self, doc_id: DocId) -> Option<String> {
        self.query_labels_for(doc_id)
            .map(|labels| labels.iter().map(String::as_str).collect::<Vec<_>>().join(","))
    }

    pub fn matched_document_count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocId, &BTreeSet<String>)> {
        self.matches.iter().map(|(&doc, labels)| (doc, labels))
    }
}
