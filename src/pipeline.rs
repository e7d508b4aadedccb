//! The three-pass extraction run and ad hoc queries.
//!
//! 1. Index every document and scan regex keywords inline
//! 2. Resolve phrase and boolean-AND keywords against the frozen index
//! 3. Re-read the documents and split them into matched and unmatched tables

use crate::config::RunConfig;
use crate::error::Error;
use crate::index::{DocId, InvertedIndexBuilder, NGramIndexBuilder};
use crate::output::{
    ALPHABETICAL_HEADER, FREQUENCY_HEADER, KEYWORD_HEADER, MATCHED_HEADER, ReportWriter,
    UNMATCHED_HEADER, write_alphabetical_table, write_frequency_table, write_keyword_table,
};
use crate::query::{
    DocumentColumns, DocumentQueryLedger, KeywordCatalog, QueryDispatcher, QueryType, Suggestion,
    document_id,
};
use crate::source::{DelimitedSource, Row, RowSource};
use crate::utils::{PassProgress, Tokenizer};
use anyhow::{Context, Result, bail};
use log::info;
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Statistics of a finished run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows_read: u64,
    pub documents_indexed: u64,
    pub unique_terms: usize,
    /// Only when word pairs were requested
    pub unique_word_pairs: Option<usize>,
    /// Documents matched by at least one regex keyword
    pub regex_documents: usize,
    /// Documents matched by any keyword
    pub documents_matched: usize,
    pub keywords: usize,
    pub keywords_found: usize,
    pub keywords_not_found: usize,
    pub suggestions: Vec<Suggestion>,
    /// Report files written, in order
    pub outputs: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Report file names of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub keyword_frequencies: PathBuf,
    pub matched_documents: PathBuf,
    pub unmatched_documents: PathBuf,
    pub word_frequencies: PathBuf,
    pub word_pair_frequencies: PathBuf,
    pub remaining_words: PathBuf,
}

impl OutputFiles {
    pub fn new(config: &RunConfig) -> Self {
        let dir = &config.output_dir;
        let key = config.key_stem();
        let text = config.text_stem();

        Self {
            keyword_frequencies: dir.join(format!("{}_Keyword_Frequs.csv", key)),
            matched_documents: dir.join(format!("{}_DocsWithKeywords.csv", key)),
            unmatched_documents: dir.join(format!("{}_NoMatchDocsWithKeywords.csv", key)),
            word_frequencies: dir.join(format!("{}_AllWord_Frequs.csv", text)),
            word_pair_frequencies: dir.join(format!("{}_AllWord_WordPair_Frequs.csv", text)),
            remaining_words: dir.join(format!("{}_AllWord_Remaining_Words.csv", key)),
        }
    }
}

/// Counts rows on a progress bar as they are read
struct TickingSource<'a, S: RowSource> {
    inner: &'a mut S,
    progress: &'a PassProgress,
}

impl<S: RowSource> RowSource for TickingSource<'_, S> {
    fn header(&self) -> &[String] {
        self.inner.header()
    }

    fn next_row(&mut self) -> crate::Result<Option<Row>> {
        let row = self.inner.next_row()?;
        if row.is_some() {
            self.progress.tick();
        }
        Ok(row)
    }

    fn reset(&mut self) -> crate::Result<()> {
        self.inner.reset()
    }
}

fn load_catalog(config: &RunConfig) -> Result<KeywordCatalog> {
    let Some(key_file) = &config.key_file else {
        info!("no KeyFile configured; skipping keyword extraction");
        return Ok(KeywordCatalog::new());
    };

    let mut source = DelimitedSource::open(key_file)
        .with_context(|| format!("Failed to open keyword file {}", key_file.display()))?;
    let catalog = KeywordCatalog::load(&mut source)
        .with_context(|| format!("Failed to load keywords from {}", key_file.display()))?;
    info!("loaded {} keywords from {}", catalog.len(), key_file.display());
    Ok(catalog)
}

/// Run a full extraction as configured.
pub fn run(config: &RunConfig, silent: bool) -> Result<RunSummary> {
    let start = Instant::now();
    let files = OutputFiles::new(config);
    let tokenizer = config.tokenizer()?;
    let catalog = load_catalog(config)?;
    let columns = config.columns();

    let mut source = DelimitedSource::open(&config.text_file)
        .with_context(|| format!("Failed to open text file {}", config.text_file.display()))?;
    let rows = source
        .check_format()
        .with_context(|| format!("Invalid text file {}", config.text_file.display()))?;
    if rows == 0 {
        bail!("No data rows in {}", config.text_file.display());
    }
    info!("processing {} data rows from {}", rows, source.describe());

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory {}", config.output_dir.display())
    })?;

    // Pass 1
    let dispatcher = QueryDispatcher::new(&tokenizer, &catalog);
    let mut ledger = DocumentQueryLedger::new();
    let ngram = if config.word_pairs {
        Some(NGramIndexBuilder::new(config.ngram_length)?)
    } else {
        None
    };

    let progress = PassProgress::new(rows, "Indexing documents...", silent);
    let built = dispatcher.index_documents(
        &mut TickingSource {
            inner: &mut source,
            progress: &progress,
        },
        &columns,
        InvertedIndexBuilder::new(),
        ngram,
        &mut ledger,
    )?;
    progress.finish(format!("Indexed {} documents", built.documents_indexed));
    let regex_documents = ledger.matched_document_count();

    // Pass 2
    let resolution = dispatcher.resolve_keywords(
        &built.inverted,
        built.ngram.as_ref(),
        &built.regex_counts,
        &mut ledger,
    )?;

    let mut outputs = Vec::new();
    if config.key_file.is_some() {
        let path = &files.keyword_frequencies;
        let mut out = ReportWriter::create(path, &KEYWORD_HEADER)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_keyword_table(&mut out, &resolution.outcomes)?;
        out.finish()?;
        outputs.push(path.clone());
    }

    // Pass 3
    if ledger.is_empty() {
        info!("no document matched a keyword; skipping the document tables");
    } else {
        source.reset()?;
        let progress = PassProgress::new(rows, "Writing document tables...", silent);
        let written = write_document_tables(
            &mut TickingSource {
                inner: &mut source,
                progress: &progress,
            },
            &columns,
            &ledger,
            &files,
        )?;
        progress.finish(format!("Wrote {} matched documents", written));
        outputs.push(files.matched_documents.clone());
        outputs.push(files.unmatched_documents.clone());
    }

    let mut out = ReportWriter::create(&files.word_frequencies, &FREQUENCY_HEADER)
        .with_context(|| format!("Failed to create {}", files.word_frequencies.display()))?;
    write_frequency_table(&mut out, &built.inverted)?;
    out.finish()?;
    outputs.push(files.word_frequencies.clone());

    if let Some(ngram) = &built.ngram {
        let path = &files.word_pair_frequencies;
        let mut out = ReportWriter::create(path, &FREQUENCY_HEADER)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_frequency_table(&mut out, ngram.index())?;
        out.finish()?;
        outputs.push(path.clone());
    }

    let mut out = ReportWriter::create(&files.remaining_words, &ALPHABETICAL_HEADER)
        .with_context(|| format!("Failed to create {}", files.remaining_words.display()))?;
    write_alphabetical_table(&mut out, &built.inverted, &catalog)?;
    out.finish()?;
    outputs.push(files.remaining_words.clone());

    Ok(RunSummary {
        rows_read: built.rows_read,
        documents_indexed: built.documents_indexed,
        unique_terms: built.inverted.term_count(),
        unique_word_pairs: built.ngram.as_ref().map(|n| n.term_count()),
        regex_documents,
        documents_matched: ledger.matched_document_count(),
        keywords: catalog.len(),
        keywords_found: resolution.found(),
        keywords_not_found: resolution.not_found(),
        suggestions: resolution.suggestions,
        outputs,
        elapsed: start.elapsed(),
    })
}

/// Pass 3: every document with text goes to exactly one of the two tables.
/// Returns the number of matched documents written.
fn write_document_tables<S: RowSource + ?Sized>(
    source: &mut S,
    columns: &DocumentColumns,
    ledger: &DocumentQueryLedger,
    files: &OutputFiles,
) -> Result<u64> {
    let mut matched = ReportWriter::create(&files.matched_documents, &MATCHED_HEADER)
        .with_context(|| format!("Failed to create {}", files.matched_documents.display()))?;
    let mut unmatched = ReportWriter::create(&files.unmatched_documents, &UNMATCHED_HEADER)
        .with_context(|| format!("Failed to create {}", files.unmatched_documents.display()))?;

    let mut ordinal: u64 = 0;
    while let Some(row) = source.next_row()? {
        let current = ordinal;
        ordinal += 1;

        let Some(text) = row.get(&columns.text) else {
            continue;
        };
        let doc_id = document_id(&row, columns, current)?;
        let id_field = doc_id.to_string();

        match ledger.joined_labels(doc_id) {
            Some(labels) => matched.write_row([id_field.as_str(), labels.as_str(), text])?,
            None => unmatched.write_row([id_field.as_str(), text])?,
        }
    }

    let written = matched.rows();
    matched.finish()?;
    unmatched.finish()?;
    Ok(written)
}

/// Settings of an ad hoc query
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub text_file: PathBuf,
    pub columns: DocumentColumns,
    pub mask: String,
    /// Boolean-AND instead of phrase
    pub all: bool,
    pub words: Vec<String>,
}

/// One matching document of an ad hoc query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHit {
    pub doc_id: DocId,
    /// Phrase occurrences in the document; `None` for boolean-AND queries
    pub occurrences: Option<usize>,
    pub text: String,
}

/// Result of an ad hoc query, documents in ascending id order
#[derive(Debug, Clone)]
pub struct QueryReport {
    pub label: String,
    pub query_type: QueryType,
    pub hits: Vec<DocumentHit>,
}

/// Index a document table and run one phrase or boolean-AND query on it.
pub fn query(options: &QueryOptions, silent: bool) -> Result<QueryReport> {
    let tokenizer = Tokenizer::new(&options.mask)?;
    let words = tokenizer.tokenize(&options.words.join(" "));
    if words.is_empty() {
        return Err(Error::InvalidQuery(format!(
            "'{}' has no words left after masking",
            options.words.join(" ")
        ))
        .into());
    }
    let label = words.join(" ");

    let mut source = open_documents(&options.text_file)?;
    let rows = source
        .check_format()
        .with_context(|| format!("Invalid text file {}", options.text_file.display()))?;
    let catalog = KeywordCatalog::new();
    let dispatcher = QueryDispatcher::new(&tokenizer, &catalog);
    let mut ledger = DocumentQueryLedger::new();

    let progress = PassProgress::new(rows, "Indexing documents...", silent);
    let built = dispatcher.index_documents(
        &mut TickingSource {
            inner: &mut source,
            progress: &progress,
        },
        &options.columns,
        InvertedIndexBuilder::new(),
        None,
        &mut ledger,
    )?;
    progress.finish(format!("Indexed {} documents", built.documents_indexed));

    let (query_type, occurrences): (QueryType, FxHashMap<DocId, Option<usize>>) = if options.all {
        let docs = built.inverted.boolean_and_query(words.as_slice())?;
        let hits = docs.into_iter().flatten().map(|doc| (doc, None)).collect();
        (QueryType::BooleanAnd, hits)
    } else {
        let mut counts: FxHashMap<DocId, usize> = FxHashMap::default();
        if let Some(list) = built.inverted.phrase_query(words.as_slice())? {
            for posting in list.postings() {
                *counts.entry(posting.doc_id).or_insert(0) += 1;
            }
        }
        let hits = counts.into_iter().map(|(doc, n)| (doc, Some(n))).collect();
        (QueryType::Phrase, hits)
    };
    info!("'{}' matched {} documents", label, occurrences.len());

    // Second read to fetch the raw text of the hits
    let mut hits = Vec::with_capacity(occurrences.len());
    if !occurrences.is_empty() {
        source.reset()?;
        let mut ordinal: u64 = 0;
        while let Some(row) = source.next_row()? {
            let current = ordinal;
            ordinal += 1;
            let Some(text) = row.get(&options.columns.text) else {
                continue;
            };
            let doc_id = document_id(&row, &options.columns, current)?;
            if let Some(&count) = occurrences.get(&doc_id) {
                hits.push(DocumentHit {
                    doc_id,
                    occurrences: count,
                    text: text.to_string(),
                });
            }
        }
        hits.sort_unstable_by_key(|hit| hit.doc_id);
    }

    Ok(QueryReport {
        label,
        query_type,
        hits,
    })
}

fn open_documents(path: &Path) -> Result<DelimitedSource> {
    DelimitedSource::open(path)
        .with_context(|| format!("Failed to open text file {}", path.display()))
}
