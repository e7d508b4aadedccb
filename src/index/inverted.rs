//! Term index: the builder used during the indexing pass and the frozen,
//! read-only index that answers phrase and boolean-AND queries.

use crate::error::{Error, Result};
use crate::index::postings::PostingsList;
use crate::index::types::{DocId, Offset, Term, TermKey};
use crate::utils::Tokenizer;
use rustc_hash::{FxHashMap, FxHashSet};
use std::borrow::Cow;

/// Inverted index over single tokens
pub type InvertedIndex = TermIndex<Term>;

/// Builder for an [`InvertedIndex`]
pub type InvertedIndexBuilder = TermIndexBuilder<Term>;

/// Mutable side of a term index. Only appends; turns into a [`TermIndex`]
/// through [`TermIndexBuilder::finish`].
#[derive(Debug)]
pub struct TermIndexBuilder<K> {
    lookup: FxHashMap<K, usize>,
    lists: Vec<PostingsList<K>>,
    documents: usize,
}

impl<K: TermKey> Default for TermIndexBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TermKey> TermIndexBuilder<K> {
    pub fn new() -> Self {
        Self {
            lookup: FxHashMap::default(),
            lists: Vec::new(),
            documents: 0,
        }
    }

    /// Record one occurrence of `key`, creating its list on first use.
    ///
    /// `make_key` only runs when the key has not been seen before.
    pub(crate) fn append_with(
        &mut self,
        key: &str,
        make_key: impl FnOnce() -> K,
        doc_id: DocId,
        offset: Offset,
    ) {
        if let Some(&idx) = self.lookup.get(key) {
            self.lists[idx].append(doc_id, offset);
            return;
        }

        let key = make_key();
        let idx = self.lists.len();
        self.lists.push(PostingsList::with_posting(key.clone(), doc_id, offset));
        self.lookup.insert(key, idx);
    }

    pub(crate) fn count_document(&mut self) {
        self.documents += 1;
    }

    /// Number of distinct keys seen so far
    pub fn term_count(&self) -> usize {
        self.lists.len()
    }

    /// Freeze the index. Every list is put in (document, offset) order so
    /// merges can walk it with two cursors. No postings can be added
    /// afterwards.
    pub fn finish(mut self) -> TermIndex<K> {
        for list in &mut self.lists {
            list.sort_postings();
        }
        TermIndex {
            lookup: self.lookup,
            lists: self.lists,
            documents: self.documents,
        }
    }
}

impl TermIndexBuilder<Term> {
    /// Index one document's tokens, token `p` at offset `p`.
    ///
    /// Documents may arrive in any id order, each id once.
    pub fn add_document(&mut self, doc_id: DocId, tokens: &[String]) {
        for (pos, token) in tokens.iter().enumerate() {
            self.append_with(token, || Term::new(token), doc_id, pos as Offset);
        }
        self.count_document();
    }
}

/// Read-only map from term key to postings list.
///
/// Lists are kept in first-insertion order, which is the tie-break order of
/// the frequency export.
#[derive(Debug)]
pub struct TermIndex<K> {
    lookup: FxHashMap<K, usize>,
    lists: Vec<PostingsList<K>>,
    documents: usize,
}

impl<K: TermKey> TermIndex<K> {
    /// Postings of a single key, if it occurs in the corpus
    pub fn get(&self, key: &str) -> Option<&PostingsList<K>> {
        self.lookup.get(key).map(|&idx| &self.lists[idx])
    }

    /// Number of distinct keys
    pub fn term_count(&self) -> usize {
        self.lists.len()
    }

    /// Number of documents that went through the builder
    pub fn document_count(&self) -> usize {
        self.documents
    }

    /// All postings lists in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = &PostingsList<K>> {
        self.lists.iter()
    }

    /// Positions where `words` occur contiguously and in order.
    ///
    /// Returns `Ok(None)` when any word is missing or the words never occur
    /// next to each other. A returned list is never empty; for a single word
    /// it is that word's own list. Postings point at the offset of the last
    /// word of the phrase.
    pub fn phrase_query<S: AsRef<str>>(
        &self,
        words: &[S],
    ) -> Result<Option<Cow<'_, PostingsList<K>>>> {
        let Some((first, rest)) = words.split_first() else {
            return Err(Error::InvalidQuery(
                "the number of words in a phrase query cannot be zero".to_string(),
            ));
        };

        let Some(first) = self.get(first.as_ref()) else {
            return Ok(None);
        };

        let mut resolved = Cow::Borrowed(first);
        for word in rest {
            let Some(next) = self.get(word.as_ref()) else {
                return Ok(None);
            };

            let label = resolved.key().followed_by(next.key());
            let merged = resolved.merge_adjacent(next, label);
            if merged.is_empty() {
                return Ok(None);
            }
            resolved = Cow::Owned(merged);
        }

        Ok(Some(resolved))
    }

    /// Documents containing every one of `words`, in any order.
    ///
    /// Returns `Ok(None)` when any word is missing or no document holds all
    /// of them. A returned set is never empty.
    pub fn boolean_and_query<S: AsRef<str>>(
        &self,
        words: &[S],
    ) -> Result<Option<FxHashSet<DocId>>> {
        let Some((first, rest)) = words.split_first() else {
            return Err(Error::InvalidQuery(
                "the number of words in a boolean query cannot be zero".to_string(),
            ));
        };

        let Some(first) = self.get(first.as_ref()) else {
            return Ok(None);
        };

        let mut docs = first.document_ids();
        for word in rest {
            let Some(next) = self.get(word.as_ref()) else {
                return Ok(None);
            };

            docs = intersect_doc_ids(&docs, &next.document_ids());
            if docs.is_empty() {
                return Ok(None);
            }
        }

        Ok(Some(docs))
    }

    /// `(frequency, key)` pairs, most frequent first. Equal frequencies keep
    /// first-insertion order.
    pub fn terms_by_frequency_descending(&self) -> Vec<(usize, &K)> {
        let mut terms: Vec<(usize, &K)> = self.lists.iter().map(|l| (l.count(), l.key())).collect();
        // sort_by is stable
        terms.sort_by(|a, b| b.0.cmp(&a.0));
        terms
    }

    /// All keys in ascending string order
    pub fn terms_alphabetical(&self) -> Vec<&K> {
        let mut terms: Vec<&K> = self.lists.iter().map(|l| l.key()).collect();
        terms.sort_by(|a, b| a.as_key().cmp(b.as_key()));
        terms
    }
}

impl TermIndex<Term> {
    /// Build an inverted index from `(id, text)` pairs in one go
    pub fn from_documents<'a, I>(tokenizer: &Tokenizer, documents: I) -> Self
    where
        I: IntoIterator<Item = (DocId, &'a str)>,
    {
        let mut builder = InvertedIndexBuilder::new();
        for (doc_id, text) in documents {
            builder.add_document(doc_id, &tokenizer.tokenize(text));
        }
        builder.finish()
    }
}

/// Intersect two document sets by walking the smaller one and probing the larger
pub fn intersect_doc_ids(a: &FxHashSet<DocId>, b: &FxHashSet<DocId>) -> FxHashSet<DocId> {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|id| large.contains(id)).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::Posting;
    use proptest::prelude::*;

    fn scenario() -> InvertedIndex {
        InvertedIndex::from_documents(
            &Tokenizer::default(),
            [(1, "cat dog"), (2, "dog cat"), (3, "cat dog cat")],
        )
    }

    fn sorted(set: FxHashSet<DocId>) -> Vec<DocId> {
        let mut ids: Vec<_> = set.into_iter().collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_positions_and_frequency() {
        let index = InvertedIndex::from_documents(&Tokenizer::default(), [(0, "a b a")]);

        let a = index.get("a").unwrap();
        assert_eq!(a.postings(), &[Posting::new(0, 0), Posting::new(0, 2)]);
        assert_eq!(a.count(), 2);
        assert_eq!(index.get("b").unwrap().postings(), &[Posting::new(0, 1)]);
        assert_eq!(index.term_count(), 2);
        assert_eq!(index.document_count(), 1);
    }

    #[test]
    fn test_single_word_phrase_is_identity() {
        let index = scenario();
        let result = index.phrase_query(&["cat"]).unwrap().unwrap();
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(&*result, index.get("cat").unwrap());
    }

    #[test]
    fn test_phrase_query_scenario() {
        let index = scenario();
        let result = index.phrase_query(&["cat", "dog"]).unwrap().unwrap();
        assert_eq!(result.key().as_key(), "cat dog");
        assert_eq!(result.postings(), &[Posting::new(1, 1), Posting::new(3, 1)]);
    }

    #[test]
    fn test_unsorted_document_ids() {
        let index = InvertedIndex::from_documents(
            &Tokenizer::default(),
            [(10, "cat dog"), (3, "dog cat"), (7, "cat dog cat")],
        );
        let result = index.phrase_query(&["cat", "dog"]).unwrap().unwrap();
        assert_eq!(result.postings(), &[Posting::new(7, 1), Posting::new(10, 1)]);
        assert_eq!(
            index.get("cat").unwrap().postings(),
            &[
                Posting::new(3, 1),
                Posting::new(7, 0),
                Posting::new(7, 2),
                Posting::new(10, 0)
            ]
        );
        let docs = index.boolean_and_query(&["dog", "cat"]).unwrap().unwrap();
        assert_eq!(sorted(docs), vec![3, 7, 10]);
    }

    #[test]
    fn test_phrase_query_trigram() {
        let index = InvertedIndex::from_documents(
            &Tokenizer::default(),
            [
                (0, "the quick brown fox"),
                (1, "quick brown the fox"),
                (2, "a quick brown fox and a quick brown fox"),
            ],
        );
        let result = index.phrase_query(&["quick", "brown", "fox"]).unwrap().unwrap();
        assert_eq!(result.key().as_key(), "quick brown fox");
        assert_eq!(
            result.postings(),
            &[Posting::new(0, 3), Posting::new(2, 3), Posting::new(2, 8)]
        );
    }

    #[test]
    fn test_phrase_not_found() {
        let index = scenario();
        assert!(index.phrase_query(&["xyz"]).unwrap().is_none());
        assert!(index.phrase_query(&["cat", "xyz"]).unwrap().is_none());
        // Both words exist but never in this order within one document
        assert!(index.phrase_query(&["dog", "dog"]).unwrap().is_none());
    }

    #[test]
    fn test_empty_queries_are_invalid() {
        let index = scenario();
        let none: [&str; 0] = [];
        assert!(matches!(index.phrase_query(&none), Err(Error::InvalidQuery(_))));
        assert!(matches!(index.boolean_and_query(&none), Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn test_boolean_and_scenario() {
        let index = scenario();
        let docs = index.boolean_and_query(&["cat", "dog"]).unwrap().unwrap();
        assert_eq!(sorted(docs), vec![1, 2, 3]);
    }

    #[test]
    fn test_boolean_and_not_found() {
        let index = InvertedIndex::from_documents(
            &Tokenizer::default(),
            [(0, "red apple"), (1, "green pear")],
        );
        assert!(index.boolean_and_query(&["red", "missing"]).unwrap().is_none());
        assert!(index.boolean_and_query(&["red", "pear"]).unwrap().is_none());
        let docs = index.boolean_and_query(&["pear"]).unwrap().unwrap();
        assert_eq!(sorted(docs), vec![1]);
    }

    #[test]
    fn test_frequency_export_is_stable() {
        let index = InvertedIndex::from_documents(
            &Tokenizer::default(),
            [(0, "b a c a"), (1, "c d")],
        );
        let terms: Vec<(usize, &str)> = index
            .terms_by_frequency_descending()
            .into_iter()
            .map(|(n, t)| (n, t.as_key()))
            .collect();
        // a and c tie at 2: a was seen after b but before c; b and d tie at 1
        assert_eq!(terms, vec![(2, "a"), (2, "c"), (1, "b"), (1, "d")]);
    }

    #[test]
    fn test_alphabetical_export() {
        let index = InvertedIndex::from_documents(&Tokenizer::default(), [(0, "pear apple fig apple")]);
        let terms: Vec<&str> = index.terms_alphabetical().into_iter().map(|t| t.as_key()).collect();
        assert_eq!(terms, vec!["apple", "fig", "pear"]);
    }

    #[test]
    fn test_intersect_doc_ids() {
        let a: FxHashSet<DocId> = [1, 2, 3, 4].into_iter().collect();
        let b: FxHashSet<DocId> = [3, 4, 5].into_iter().collect();
        assert_eq!(sorted(intersect_doc_ids(&a, &b)), vec![3, 4]);
        assert_eq!(sorted(intersect_doc_ids(&b, &a)), vec![3, 4]);
    }

    fn corpus_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
        let word = prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(str::to_string);
        prop::collection::vec(prop::collection::vec(word, 0..12), 1..20)
    }

    fn build(corpus: &[Vec<String>]) -> InvertedIndex {
        let mut builder = InvertedIndexBuilder::new();
        for (doc, tokens) in corpus.iter().enumerate() {
            builder.add_document(doc as DocId, tokens);
        }
        builder.finish()
    }

    proptest! {
        #[test]
        fn prop_postings_strictly_ascending(corpus in corpus_strategy()) {
            let index = build(&corpus);
            for list in index.iter() {
                for pair in list.postings().windows(2) {
                    prop_assert!(pair[0] < pair[1]);
                }
            }
        }

        #[test]
        fn prop_build_order_does_not_matter(corpus in corpus_strategy()) {
            let forward = build(&corpus);
            let mut builder = InvertedIndexBuilder::new();
            for (doc, tokens) in corpus.iter().enumerate().rev() {
                builder.add_document(doc as DocId, tokens);
            }
            let backward = builder.finish();

            prop_assert_eq!(forward.term_count(), backward.term_count());
            for list in forward.iter() {
                let other = backward.get(list.key().as_key());
                prop_assert_eq!(other.map(|l| l.postings()), Some(list.postings()));
            }
        }

        #[test]
        fn prop_phrase_matches_contiguous_occurrences(
            corpus in corpus_strategy(),
            phrase in prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 1..4),
        ) {
            let index = build(&corpus);
            let mut expected = Vec::new();
            for (doc, tokens) in corpus.iter().enumerate() {
                for (start, window) in tokens.windows(phrase.len()).enumerate() {
                    if window.iter().zip(&phrase).all(|(t, w)| t == w) {
                        let last = start + phrase.len() - 1;
                        expected.push(Posting::new(doc as DocId, last as Offset));
                    }
                }
            }

            match index.phrase_query(phrase.as_slice()).unwrap() {
                Some(found) => prop_assert_eq!(found.postings(), expected.as_slice()),
                None => prop_assert!(expected.is_empty()),
            }
        }

        #[test]
        fn prop_boolean_and_is_intersection_and_order_free(
            corpus in corpus_strategy(),
            words in prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d", "e", "z"]), 1..4),
        ) {
            let index = build(&corpus);
            let expected: Vec<DocId> = corpus
                .iter()
                .enumerate()
                .filter(|(_, tokens)| words.iter().all(|w| tokens.iter().any(|t| t == w)))
                .map(|(doc, _)| doc as DocId)
                .collect();

            let mut reversed = words.clone();
            reversed.reverse();

            let forward = index.boolean_and_query(words.as_slice()).unwrap().map(sorted);
            let backward = index.boolean_and_query(reversed.as_slice()).unwrap().map(sorted);
            prop_assert_eq!(&forward, &backward);
            match forward {
                Some(docs) => prop_assert_eq!(docs, expected),
                None => prop_assert!(expected.is_empty()),
            }
        }
    }
}
