//! Report tables and terminal output

use crate::error::{Error, Result};
use crate::index::{InvertedIndex, TermIndex, TermKey};
use crate::pipeline::{QueryReport, RunSummary};
use crate::query::{KeywordCatalog, KeywordOutcome};
use crate::source::DELIMITER;
use csv::{QuoteStyle, WriterBuilder};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub const KEYWORD_HEADER: [&str; 3] = ["regex", "word_freq", "word"];
pub const FREQUENCY_HEADER: [&str; 2] = ["frequency", "word"];
pub const ALPHABETICAL_HEADER: [&str; 2] = ["keyed", "word"];
pub const MATCHED_HEADER: [&str; 3] = ["rowid", "queries", "text"];
pub const UNMATCHED_HEADER: [&str; 2] = ["rowid", "text"];

/// Pipe-delimited table sink. Fields are written as they are, without
/// quoting, matching how tables are read back.
pub struct ReportWriter<W: Write> {
    inner: csv::Writer<W>,
    rows: u64,
}

impl ReportWriter<File> {
    /// Create (or truncate) a report file and write its header
    pub fn create(path: &Path, header: &[&str]) -> Result<Self> {
        Self::from_writer(File::create(path)?, header)
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn from_writer(writer: W, header: &[&str]) -> Result<Self> {
        let mut inner = WriterBuilder::new()
            .delimiter(DELIMITER)
            .quote_style(QuoteStyle::Never)
            .from_writer(writer);
        inner.write_record(header)?;
        Ok(Self { inner, rows: 0 })
    }

    pub fn write_row<I, T>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.inner.write_record(fields)?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and hand back the underlying writer
    pub fn finish(self) -> Result<W> {
        self.inner.into_inner().map_err(|e| Error::Io(e.into_error()))
    }
}

/// One row per keyword: query type, match count and label. Keywords that
/// were not found get a count of 0.
pub fn write_keyword_table<W: Write>(
    out: &mut ReportWriter<W>,
    outcomes: &[KeywordOutcome],
) -> Result<()> {
    for outcome in outcomes {
        let type_id = outcome.query_type.id().to_string();
        let count = outcome.matches.unwrap_or(0).to_string();
        out.write_row([type_id.as_str(), count.as_str(), outcome.label.as_str()])?;
    }
    Ok(())
}

/// Term frequencies, most frequent first
pub fn write_frequency_table<W: Write, K: TermKey>(
    out: &mut ReportWriter<W>,
    index: &TermIndex<K>,
) -> Result<()> {
    for (frequency, term) in index.terms_by_frequency_descending() {
        out.write_row([frequency.to_string().as_str(), term.as_key()])?;
    }
    Ok(())
}

/// All terms in ascending order, flagged `1` when the term is itself a keyword
pub fn write_alphabetical_table<W: Write>(
    out: &mut ReportWriter<W>,
    index: &InvertedIndex,
    catalog: &KeywordCatalog,
) -> Result<()> {
    for term in index.terms_alphabetical() {
        let keyed = if catalog.contains_text(term.as_key()) { "1" } else { "0" };
        out.write_row([keyed, term.as_key()])?;
    }
    Ok(())
}

fn color_choice(color: bool) -> ColorChoice {
    if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn print_field(stdout: &mut StandardStream, label: &str, value: impl std::fmt::Display) -> io::Result<()> {
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    write!(stdout, "{:>24}: ", label)?;
    stdout.reset()?;
    writeln!(stdout, "{}", value)
}

/// Print the statistics of a finished run
pub fn print_run_summary(summary: &RunSummary, color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(color));

    print_field(&mut stdout, "Data rows", summary.rows_read)?;
    print_field(&mut stdout, "Documents parsed", summary.documents_indexed)?;
    print_field(&mut stdout, "Unique words found", summary.unique_terms)?;
    if let Some(pairs) = summary.unique_word_pairs {
        print_field(&mut stdout, "Unique word-pairs found", pairs)?;
    }
    print_field(&mut stdout, "Regex document matches", summary.regex_documents)?;
    print_field(&mut stdout, "Documents matched", summary.documents_matched)?;

    if summary.keywords > 0 {
        print_field(
            &mut stdout,
            "Keywords",
            format!(
                "{} ({} found, {} not found)",
                summary.keywords, summary.keywords_found, summary.keywords_not_found
            ),
        )?;
    }

    for suggestion in &summary.suggestions {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(stdout, "Proposed alternative term: ")?;
        stdout.reset()?;
        write!(
            stdout,
            "'0|{}' for '{}' with frequencies - inverted: {}",
            suggestion.variant, suggestion.keyword, suggestion.inverted_frequency
        )?;
        if let Some(ngram) = suggestion.ngram_frequency {
            write!(stdout, " n-gram: {}", ngram)?;
        }
        writeln!(stdout)?;
    }

    for path in &summary.outputs {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(stdout, "{:>24}: ", "Wrote")?;
        stdout.reset()?;
        writeln!(stdout, "{}", path.display())?;
    }

    let secs = summary.elapsed.as_secs();
    print_field(
        &mut stdout,
        "Elapsed processing time",
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60),
    )?;

    Ok(())
}

/// Print the documents matched by an ad hoc query, one per line as
/// `id:occurrences:text` (phrase) or `id:text` (boolean-AND)
pub fn print_query_report(report: &QueryReport, color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(color));

    if report.hits.is_empty() {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        writeln!(stdout, "No documents match '{}'", report.label)?;
        stdout.reset()?;
        return Ok(());
    }

    for hit in &report.hits {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(stdout, "{}", hit.doc_id)?;
        stdout.reset()?;
        write!(stdout, ":")?;

        if let Some(occurrences) = hit.occurrences {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
            write!(stdout, "{}", occurrences)?;
            stdout.reset()?;
            write!(stdout, ":")?;
        }

        writeln!(stdout, "{}", hit.text)?;
    }

    Ok(())
}
