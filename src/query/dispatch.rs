//! Keyword dispatch: the indexing pass with inline regex scanning, and the
//! resolution pass that runs phrase and boolean-AND keywords against the
//! frozen index.

use crate::error::{Error, Result};
use crate::index::{DocId, InvertedIndex, InvertedIndexBuilder, NGramIndex, NGramIndexBuilder};
use crate::query::keyword::{Keyword, KeywordCatalog, KeywordId, QueryType};
use crate::query::ledger::DocumentQueryLedger;
use crate::source::{Row, RowSource};
use crate::utils::Tokenizer;
use log::{debug, info, warn};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

/// Keyword id -> number of matches, filled by the dispatch passes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchCounts {
    counts: BTreeMap<KeywordId, usize>,
}

impl MatchCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, id: KeywordId) {
        *self.counts.entry(id).or_insert(0) += 1;
    }

    pub fn set(&mut self, id: KeywordId, count: usize) {
        self.counts.insert(id, count);
    }

    /// Matches recorded for `id`, zero when none were
    pub fn get(&self, id: KeywordId) -> usize {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeywordId, usize)> + '_ {
        self.counts.iter().map(|(&id, &count)| (id, count))
    }
}

/// Column names of the document table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentColumns {
    pub text: String,
    /// Row id column; `None` numbers rows from 0 in file order
    pub row_id: Option<String>,
}

impl DocumentColumns {
    pub fn new(text: impl Into<String>, row_id: Option<String>) -> Self {
        Self {
            text: text.into(),
            row_id: row_id.filter(|c| !c.is_empty()),
        }
    }
}

/// Id of a document row: the row id column when configured, else `ordinal`.
pub fn document_id(row: &Row, columns: &DocumentColumns, ordinal: u64) -> Result<DocId> {
    let Some(column) = &columns.row_id else {
        return DocId::try_from(ordinal).map_err(|_| Error::SourceFormat {
            line: row.line(),
            message: format!("row ordinal {} does not fit a document id", ordinal),
        });
    };

    let raw = row.get(column).ok_or_else(|| Error::SourceFormat {
        line: row.line(),
        message: format!("row id column '{}' is missing", column),
    })?;

    match raw.trim().parse::<DocId>() {
        Ok(id) if id >= 0 => Ok(id),
        _ => Err(Error::SourceFormat {
            line: row.line(),
            message: format!("row id '{}' is not a non-negative integer", raw),
        }),
    }
}

/// Result of the indexing pass
#[derive(Debug)]
pub struct BuildOutcome {
    pub inverted: InvertedIndex,
    pub ngram: Option<NGramIndex>,
    /// Rows iterated, including rows without text
    pub rows_read: u64,
    /// Rows that went into the indexes
    pub documents_indexed: u64,
    /// Documents matched per regex keyword
    pub regex_counts: MatchCounts,
}

/// Resolution of one keyword, in catalog order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordOutcome {
    pub id: KeywordId,
    pub query_type: QueryType,
    /// Normalized query text for found phrase/bool keywords, the keyword
    /// text otherwise
    pub label: String,
    /// `None` when the keyword was not found in the corpus
    pub matches: Option<usize>,
}

impl KeywordOutcome {
    pub fn is_found(&self) -> bool {
        self.matches.is_some()
    }
}

/// A phrase variant that exists in the corpus but is not a keyword yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// The hyphenated keyword the variant was derived from
    pub keyword: String,
    pub variant: String,
    pub inverted_frequency: usize,
    /// Only known when the n-gram index was built
    pub ngram_frequency: Option<usize>,
}

/// Result of the resolution pass
#[derive(Debug, Default)]
pub struct Resolution {
    pub outcomes: Vec<KeywordOutcome>,
    pub suggestions: Vec<Suggestion>,
    pub counts: MatchCounts,
}

impl Resolution {
    pub fn found(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_found()).count()
    }

    pub fn not_found(&self) -> usize {
        self.outcomes.len() - self.found()
    }
}

/// Ties a keyword catalog to the corpus through the shared tokenizer
pub struct QueryDispatcher<'a> {
    tokenizer: &'a Tokenizer,
    catalog: &'a KeywordCatalog,
}

impl<'a> QueryDispatcher<'a> {
    pub fn new(tokenizer: &'a Tokenizer, catalog: &'a KeywordCatalog) -> Self {
        Self { tokenizer, catalog }
    }

    /// Pass 1: stream every row into the builders and test regex keywords
    /// against the raw text on the way.
    ///
    /// Rows without a text field are skipped but still consume an ordinal.
    /// Ids may come in any order but each document id only once.
    pub fn index_documents<S: RowSource + ?Sized>(
        &self,
        source: &mut S,
        columns: &DocumentColumns,
        mut inverted: InvertedIndexBuilder,
        mut ngram: Option<NGramIndexBuilder>,
        ledger: &mut DocumentQueryLedger,
    ) -> Result<BuildOutcome> {
        if let Some(column) = &columns.row_id
            && !source.has_column(column)
        {
            return Err(Error::Configuration(format!(
                "row id column '{}' is not in the document header",
                column
            )));
        }
        if !source.has_column(&columns.text) {
            warn!(
                "text column '{}' is not in the document header; every row will be skipped",
                columns.text
            );
        }

        let mut regex_counts = MatchCounts::new();
        let mut rows_read: u64 = 0;
        let mut documents_indexed: u64 = 0;
        let mut seen: FxHashSet<DocId> = FxHashSet::default();

        while let Some(row) = source.next_row()? {
            let ordinal = rows_read;
            rows_read += 1;

            let Some(text) = row.get(&columns.text) else {
                continue;
            };

            let doc_id = document_id(&row, columns, ordinal)?;
            if !seen.insert(doc_id) {
                return Err(Error::SourceFormat {
                    line: row.line(),
                    message: format!("document id {} appears more than once", doc_id),
                });
            }

            let tokens = self.tokenizer.tokenize(text);
            inverted.add_document(doc_id, &tokens);
            if let Some(ngram) = ngram.as_mut() {
                ngram.add_document(doc_id, &tokens);
            }
            self.scan_regex(doc_id, text, ledger, &mut regex_counts);
            documents_indexed += 1;
        }

        let inverted = inverted.finish();
        let ngram = ngram.map(NGramIndexBuilder::finish);
        info!(
            "indexed {} of {} rows: {} terms{}",
            documents_indexed,
            rows_read,
            inverted.term_count(),
            ngram
                .as_ref()
                .map(|n| format!(", {} {}-grams", n.term_count(), n.n()))
                .unwrap_or_default()
        );

        Ok(BuildOutcome {
            inverted,
            ngram,
            rows_read,
            documents_indexed,
            regex_counts,
        })
    }

    /// Test every regex keyword against one document's raw text
    pub fn scan_regex(
        &self,
        doc_id: DocId,
        raw_text: &str,
        ledger: &mut DocumentQueryLedger,
        counts: &mut MatchCounts,
    ) {
        for keyword in self.catalog.regex_keywords() {
            if keyword.matches_raw(raw_text) {
                ledger.record_match(doc_id, keyword.text());
                counts.increment(keyword.id());
            }
        }
    }

    /// Pass 2: resolve phrase and boolean-AND keywords against the frozen
    /// index, in ascending keyword id order.
    ///
    /// Regex keywords are reported with the counts gathered in pass 1.
    pub fn resolve_keywords(
        &self,
        index: &InvertedIndex,
        ngram: Option<&NGramIndex>,
        regex_counts: &MatchCounts,
        ledger: &mut DocumentQueryLedger,
    ) -> Result<Resolution> {
        let mut resolution = Resolution::default();

        for keyword in self.catalog.iter() {
            let outcome = match keyword.query_type() {
                QueryType::Regex => {
                    let count = regex_counts.get(keyword.id());
                    resolution.counts.set(keyword.id(), count);
                    KeywordOutcome {
                        id: keyword.id(),
                        query_type: QueryType::Regex,
                        label: keyword.text().to_string(),
                        matches: Some(count),
                    }
                }
                QueryType::Phrase | QueryType::BooleanAnd => {
                    let outcome = self.resolve_one(keyword, index, ledger)?;
                    if let Some(count) = outcome.matches {
                        resolution.counts.set(keyword.id(), count);
                    }
                    outcome
                }
            };

            if keyword.query_type() == QueryType::Phrase
                && outcome.is_found()
                && let Some(suggestion) = self.suggest_variant(keyword, index, ngram)?
            {
                info!(
                    "proposed alternative term '{}|{}' with frequencies - inverted: {}{}",
                    QueryType::Phrase.id(),
                    suggestion.variant,
                    suggestion.inverted_frequency,
                    suggestion
                        .ngram_frequency
                        .map(|n| format!(" n-gram: {}", n))
                        .unwrap_or_default()
                );
                resolution.suggestions.push(suggestion);
            }

            resolution.outcomes.push(outcome);
        }

        info!(
            "resolved {} keywords: {} found, {} not found",
            resolution.outcomes.len(),
            resolution.found(),
            resolution.not_found()
        );
        Ok(resolution)
    }

    fn resolve_one(
        &self,
        keyword: &Keyword,
        index: &InvertedIndex,
        ledger: &mut DocumentQueryLedger,
    ) -> Result<KeywordOutcome> {
        let not_found = || KeywordOutcome {
            id: keyword.id(),
            query_type: keyword.query_type(),
            label: keyword.text().to_string(),
            matches: None,
        };

        let words = self.tokenizer.tokenize(keyword.text());
        if words.is_empty() {
            warn!(
                "keyword {} '{}' has no words left after masking; reported as not found",
                keyword.id(),
                keyword.text()
            );
            return Ok(not_found());
        }
        let label = words.join(" ");

        let matches = match keyword.query_type() {
            QueryType::Phrase => index.phrase_query(words.as_slice())?.map(|list| {
                for doc_id in list.document_ids() {
                    ledger.record_match(doc_id, &label);
                }
                list.count()
            }),
            QueryType::BooleanAnd => index.boolean_and_query(words.as_slice())?.map(|docs| {
                for &doc_id in &docs {
                    ledger.record_match(doc_id, &label);
                }
                docs.len()
            }),
            QueryType::Regex => None,
        };

        match matches {
            Some(count) => {
                debug!("keyword {} '{}': {} matches", keyword.id(), label, count);
                Ok(KeywordOutcome {
                    id: keyword.id(),
                    query_type: keyword.query_type(),
                    label,
                    matches: Some(count),
                })
            }
            None => {
                warn!("item not found: '{}'", keyword.text());
                Ok(not_found())
            }
        }
    }

    /// Check whether the hyphen-free spelling of a found phrase keyword
    /// occurs in the corpus without being a keyword itself.
    fn suggest_variant(
        &self,
        keyword: &Keyword,
        index: &InvertedIndex,
        ngram: Option<&NGramIndex>,
    ) -> Result<Option<Suggestion>> {
        if !keyword.text().contains('-') {
            return Ok(None);
        }

        let tokens = self.tokenizer.tokenize(&keyword.text().replace('-', " "));
        if tokens.is_empty() {
            return Ok(None);
        }
        let variant = tokens.join(" ");
        if self.catalog.contains_text(&variant) {
            return Ok(None);
        }

        let Some(found) = index.phrase_query(tokens.as_slice())? else {
            return Ok(None);
        };

        let ngram_frequency = match ngram {
            Some(ngram) => Some(
                ngram
                    .phrase_query_tokens(tokens.as_slice())?
                    .map(|list| list.count())
                    .unwrap_or(0),
            ),
            None => None,
        };

        Ok(Some(Suggestion {
            keyword: keyword.text().to_string(),
            variant,
            inverted_frequency: found.count(),
            ngram_frequency,
        }))
    }
}
