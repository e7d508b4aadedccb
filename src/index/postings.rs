//! Postings lists and the adjacency merge behind phrase queries.

use crate::index::types::{DocId, Offset, Posting, TermKey};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

/// All occurrences of one term key, ascending by (document, offset) once the
/// owning index is frozen.
///
/// Lists only grow through [`PostingsList::append`] while an index is being
/// built. Documents may arrive in any id order; the builder restores the
/// ordering on `finish`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingsList<K> {
    key: K,
    postings: Vec<Posting>,
}

impl<K: TermKey> PostingsList<K> {
    /// Create an empty list
    pub fn new(key: K) -> Self {
        Self {
            key,
            postings: Vec::new(),
        }
    }

    /// Create a list holding its first occurrence
    pub fn with_posting(key: K, doc_id: DocId, offset: Offset) -> Self {
        let mut list = Self::new(key);
        list.append(doc_id, offset);
        list
    }

    /// The term key (or merged phrase label) of this list
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Append an occurrence. Offsets within one document arrive ascending.
    pub fn append(&mut self, doc_id: DocId, offset: Offset) {
        let posting = Posting::new(doc_id, offset);
        debug_assert!(doc_id >= 0 && offset >= 0, "negative posting {:?}", posting);
        debug_assert!(
            self.postings
                .last()
                .is_none_or(|last| last.doc_id != doc_id || last.offset < offset),
            "posting {:?} appended out of order to '{}'",
            posting,
            self.key
        );
        self.postings.push(posting);
    }

    /// Restore (document, offset) order after documents were appended out
    /// of id order. Repeated postings collapse into one.
    pub(crate) fn sort_postings(&mut self) {
        if !self.postings.is_sorted() {
            self.postings.sort_unstable();
        }
        self.postings.dedup();
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    /// Distinct documents containing this term
    pub fn document_ids(&self) -> FxHashSet<DocId> {
        self.postings.iter().map(|p| p.doc_id).collect()
    }

    /// Number of postings (the term frequency over the corpus)
    pub fn count(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Merge with the list of the term that follows this one.
    ///
    /// The result holds `(doc, o + 1)` for every `(doc, o)` in `self` that has
    /// `(doc, o + 1)` in `other`, i.e. the positions where `other` occurs right
    /// after `self`. Both lists are walked once with two cursors. The result
    /// is always a list, possibly empty.
    pub fn merge_adjacent(&self, other: &PostingsList<K>, label: K) -> PostingsList<K> {
        let mut merged = PostingsList::new(label);
        let left = &self.postings;
        let right = &other.postings;

        let (mut i, mut j) = (0, 0);
        while i < left.len() && j < right.len() {
            let (l, r) = (left[i], right[j]);

            match l.doc_id.cmp(&r.doc_id) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => match (l.offset + 1).cmp(&r.offset) {
                    Ordering::Equal => {
                        merged.postings.push(r);
                        i += 1;
                        j += 1;
                    }
                    Ordering::Less => i += 1,
                    Ordering::Greater => j += 1,
                },
            }
        }

        merged
    }
}
