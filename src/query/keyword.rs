//! Keyword catalog: the phrase, regex and boolean-AND queries to run
//! against a corpus, loaded from a `regex|text` table.

use crate::error::{Error, Result};
use crate::source::RowSource;
use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;
use std::fmt;

/// Column holding the query type selector
pub const REGEX_COLUMN: &str = "regex";

/// Column holding the keyword literal or pattern
pub const TEXT_COLUMN: &str = "text";

/// Stand-in for `|` inside regex patterns, since `|` delimits fields
pub const PIPE_ESCAPE: &str = "_pipe_";

/// Keyword identifier: the 1-based data row the keyword was read from
pub type KeywordId = i64;

/// How a keyword is matched against documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// Tokens must occur contiguously and in order
    Phrase,
    /// Pattern searched in the raw, untokenized text
    Regex,
    /// All tokens must occur somewhere in the document
    BooleanAnd,
}

impl QueryType {
    /// Selector value used in keyword tables and reports
    pub fn id(self) -> u8 {
        match self {
            QueryType::Phrase => 0,
            QueryType::Regex => 1,
            QueryType::BooleanAnd => 2,
        }
    }
}

impl TryFrom<i64> for QueryType {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(QueryType::Phrase),
            1 => Ok(QueryType::Regex),
            2 => Ok(QueryType::BooleanAnd),
            other => Err(Error::Configuration(format!(
                "unknown type of query identifier {}",
                other
            ))),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryType::Phrase => "phrase",
            QueryType::Regex => "regex",
            QueryType::BooleanAnd => "bool-and",
        };
        f.write_str(name)
    }
}

/// One query definition. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Keyword {
    id: KeywordId,
    query_type: QueryType,
    text: String,
    pattern: Option<Regex>,
}

impl Keyword {
    /// Create a keyword. The text is lowercased; regex patterns get `_pipe_`
    /// replaced by `|` and are compiled case-insensitively.
    pub fn new(id: KeywordId, query_type: QueryType, text: &str) -> Result<Self> {
        let text = text.to_lowercase();

        let pattern = match query_type {
            QueryType::Regex => {
                let source = text.replace(PIPE_ESCAPE, "|");
                let regex = RegexBuilder::new(&source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        Error::InvalidQuery(format!("regex '{}' does not compile: {}", source, e))
                    })?;
                Some(regex)
            }
            QueryType::Phrase | QueryType::BooleanAnd => None,
        };

        Ok(Self {
            id,
            query_type,
            text,
            pattern,
        })
    }

    pub fn id(&self) -> KeywordId {
        self.id
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// Lowercased literal (or pattern as written in the table)
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_regex(&self) -> bool {
        self.query_type == QueryType::Regex
    }

    /// Compiled pattern of a regex keyword
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Whether the pattern occurs anywhere in `raw_text`. Always false for
    /// non-regex keywords.
    pub fn matches_raw(&self, raw_text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(raw_text))
    }
}

/// Loaded keywords, iterated in ascending id order.
///
/// Keywords are unique by their lowercased text; a later row with the same
/// text replaces the earlier definition.
#[derive(Debug, Clone, Default)]
pub struct KeywordCatalog {
    keywords: Vec<Keyword>,
    by_text: FxHashMap<String, usize>,
}

impl KeywordCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every row of a `regex|text` table.
    ///
    /// Any bad row aborts the load; no partial catalog is returned.
    pub fn load<S: RowSource + ?Sized>(source: &mut S) -> Result<Self> {
        let mut catalog = Self::new();
        let mut id: KeywordId = 1;

        while let Some(row) = source.next_row()? {
            let line = row.line();
            let (Some(selector), Some(text)) = (row.get(REGEX_COLUMN), row.get(TEXT_COLUMN)) else {
                return Err(Error::CatalogLoad {
                    line,
                    message: format!(
                        "cannot read the '{}' and '{}' columns; make sure both are present",
                        REGEX_COLUMN, TEXT_COLUMN
                    ),
                });
            };

            let selector: i64 = selector.trim().parse().map_err(|_| Error::CatalogLoad {
                line,
                message: format!("query type selector '{}' is not an integer", selector),
            })?;
            let query_type = QueryType::try_from(selector)?;

            let keyword = Keyword::new(id, query_type, text).map_err(|e| Error::CatalogLoad {
                line,
                message: e.to_string(),
            })?;
            debug!("keyword {}: {} '{}'", id, query_type, keyword.text());
            catalog.insert(keyword);

            id += 1;
        }

        Ok(catalog)
    }

    /// Add a keyword, replacing any earlier keyword with the same text
    pub fn insert(&mut self, keyword: Keyword) {
        if let Some(&idx) = self.by_text.get(keyword.text()) {
            warn!(
                "keyword '{}' is defined more than once; keeping the definition with id {}",
                keyword.text(),
                keyword.id()
            );
            self.keywords.remove(idx);
        } else if self.keywords.last().is_none_or(|k| k.id() < keyword.id()) {
            self.by_text.insert(keyword.text().to_string(), self.keywords.len());
            self.keywords.push(keyword);
            return;
        }

        let pos = self.keywords.partition_point(|k| k.id() < keyword.id());
        self.keywords.insert(pos, keyword);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.by_text = self
            .keywords
            .iter()
            .enumerate()
            .map(|(idx, k)| (k.text().to_string(), idx))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// All keywords by ascending id
    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    /// Regex keywords only
    pub fn regex_keywords(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter().filter(|k| k.is_regex())
    }

    /// Look up a keyword by its (lowercased) text
    pub fn get(&self, text: &str) -> Option<&Keyword> {
        self.by_text.get(text).map(|&idx| &self.keywords[idx])
    }

    /// Whether `text` is the literal of some keyword
    pub fn contains_text(&self, text: &str) -> bool {
        self.by_text.contains_key(text)
    }
}
