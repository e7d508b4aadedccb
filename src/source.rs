//! Row sources: pipe-delimited tables with a header line, read row by row
//! and re-readable from the start.

use crate::error::{Error, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Field delimiter of every table read or written by phrasetract
pub const DELIMITER: u8 = b'|';

/// One data row, addressed by column name
#[derive(Debug, Clone)]
pub struct Row {
    header: Arc<[String]>,
    fields: StringRecord,
    line: u64,
}

impl Row {
    /// Value of `column`, or `None` when the table has no such column
    pub fn get(&self, column: &str) -> Option<&str> {
        let idx = self.header.iter().position(|h| h == column)?;
        self.fields.get(idx)
    }

    /// 1-based line number in the underlying file (the header is line 1)
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A table that yields rows in file order and can start over.
pub trait RowSource {
    /// Column names from the header line
    fn header(&self) -> &[String];

    /// Next row, `Ok(None)` at end of stream
    fn next_row(&mut self) -> Result<Option<Row>>;

    /// Rewind to the first data row
    fn reset(&mut self) -> Result<()>;

    /// Whether the header names `column`
    fn has_column(&self, column: &str) -> bool {
        self.header().iter().any(|h| h == column)
    }
}

#[derive(Debug, Clone)]
enum Origin {
    File(PathBuf),
    Text(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Text(_) => f.write_str("<memory>"),
        }
    }
}

/// Pipe-delimited table with a header line.
///
/// Quotes carry no meaning: every `|` separates fields. A row whose field
/// count differs from the header is a [`Error::SourceFormat`].
pub struct DelimitedSource {
    origin: Origin,
    reader: csv::Reader<Box<dyn Read>>,
    header: Arc<[String]>,
    record: StringRecord,
}

impl DelimitedSource {
    /// Open a table stored in a file
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_origin(Origin::File(path.to_path_buf()))
    }

    /// Read a table held in memory
    pub fn from_text(text: impl Into<String>) -> Result<Self> {
        Self::from_origin(Origin::Text(text.into()))
    }

    fn from_origin(origin: Origin) -> Result<Self> {
        let mut reader = open_reader(&origin)?;
        let header: Arc<[String]> = reader.headers()?.iter().map(str::to_string).collect();

        Ok(Self {
            origin,
            reader,
            header,
            record: StringRecord::new(),
        })
    }

    /// Where the rows come from, for messages
    pub fn describe(&self) -> String {
        self.origin.to_string()
    }

    /// Read the whole table once to validate it, then rewind.
    /// Returns the number of data rows.
    pub fn check_format(&mut self) -> Result<u64> {
        self.reset()?;
        let mut rows = 0;
        while self.next_row()?.is_some() {
            rows += 1;
        }
        self.reset()?;
        Ok(rows)
    }
}

impl RowSource for DelimitedSource {
    fn header(&self) -> &[String] {
        &self.header
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }

        let line = self.record.position().map(|p| p.line()).unwrap_or(0);
        if self.record.len() != self.header.len() {
            return Err(Error::SourceFormat {
                line,
                message: format!(
                    "{} holds {} fields but the header names {}",
                    self.origin,
                    self.record.len(),
                    self.header.len()
                ),
            });
        }

        Ok(Some(Row {
            header: Arc::clone(&self.header),
            fields: self.record.clone(),
            line,
        }))
    }

    fn reset(&mut self) -> Result<()> {
        let mut reader = open_reader(&self.origin)?;
        // Skip the header line again
        reader.headers()?;
        self.reader = reader;
        Ok(())
    }
}

fn open_reader(origin: &Origin) -> Result<csv::Reader<Box<dyn Read>>> {
    let input: Box<dyn Read> = match origin {
        Origin::File(path) => Box::new(File::open(path)?),
        Origin::Text(text) => Box::new(Cursor::new(text.clone().into_bytes())),
    };

    Ok(ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(input))
}
