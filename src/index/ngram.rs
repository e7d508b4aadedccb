//! Word n-gram index (word pairs by default) used to check whether a
//! phrase variant exists in the corpus.

use crate::error::{Error, Result};
use crate::index::inverted::{TermIndex, TermIndexBuilder};
use crate::index::postings::PostingsList;
use crate::index::types::{DocId, NGram, Offset};
use std::borrow::Cow;

/// Default window length: word pairs
pub const DEFAULT_NGRAM_LEN: usize = 2;

/// Builds an [`NGramIndex`] by sliding a window of `n` tokens over each document
#[derive(Debug)]
pub struct NGramIndexBuilder {
    n: usize,
    inner: TermIndexBuilder<NGram>,
}

impl NGramIndexBuilder {
    pub fn new(n: usize) -> Result<Self> {
        if n < 2 {
            return Err(Error::Configuration(format!(
                "n-gram length must be at least 2, got {}",
                n
            )));
        }

        Ok(Self {
            n,
            inner: TermIndexBuilder::new(),
        })
    }

    /// Window length
    pub fn n(&self) -> usize {
        self.n
    }

    /// Index the windows of one document. The window starting at token `p`
    /// is stored at offset `p`; documents shorter than `n` add nothing.
    pub fn add_document(&mut self, doc_id: DocId, tokens: &[String]) {
        for (pos, window) in tokens.windows(self.n).enumerate() {
            let key = window.join(" ");
            self.inner
                .append_with(&key, || NGram::new(window), doc_id, pos as Offset);
        }
        self.inner.count_document();
    }

    pub fn term_count(&self) -> usize {
        self.inner.term_count()
    }

    pub fn finish(self) -> NGramIndex {
        NGramIndex {
            n: self.n,
            index: self.inner.finish(),
        }
    }
}

/// Read-only n-gram index
#[derive(Debug)]
pub struct NGramIndex {
    n: usize,
    index: TermIndex<NGram>,
}

impl NGramIndex {
    /// Window length
    pub fn n(&self) -> usize {
        self.n
    }

    /// The underlying term index keyed by n-grams
    pub fn index(&self) -> &TermIndex<NGram> {
        &self.index
    }

    pub fn term_count(&self) -> usize {
        self.index.term_count()
    }

    /// Phrase query over n-gram keys such as `["thank you", "you very"]`.
    /// Same contract as [`TermIndex::phrase_query`].
    pub fn phrase_query<S: AsRef<str>>(
        &self,
        grams: &[S],
    ) -> Result<Option<Cow<'_, PostingsList<NGram>>>> {
        self.index.phrase_query(grams)
    }

    /// Resolve a token phrase by cutting it into its overlapping n-grams.
    ///
    /// Phrases shorter than the window cannot be expressed as n-grams and
    /// resolve to `Ok(None)`.
    pub fn phrase_query_tokens<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> Result<Option<Cow<'_, PostingsList<NGram>>>> {
        if tokens.is_empty() {
            return Err(Error::InvalidQuery(
                "the number of words in a phrase query cannot be zero".to_string(),
            ));
        }

        let grams: Vec<String> = tokens
            .windows(self.n)
            .map(|window| {
                window
                    .iter()
                    .map(|t| t.as_ref().to_lowercase())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        if grams.is_empty() {
            return Ok(None);
        }

        self.index.phrase_query(grams.as_slice())
    }
}
