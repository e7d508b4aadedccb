//! Run configuration, read from a `Key=Value` properties file or a JSON file.

use crate::error::{Error, Result};
use crate::index::ngram::DEFAULT_NGRAM_LEN;
use crate::query::DocumentColumns;
use crate::utils::{DEFAULT_MASK, Tokenizer, file_stem, resolve_relative};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings of one extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Pipe-delimited document table
    pub text_file: PathBuf,
    pub text_column: String,
    /// `None` numbers documents from 0 in file order
    pub row_id_column: Option<String>,
    /// Keyword table; `None` skips keyword extraction
    pub key_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Also build the n-gram index and write its frequency table
    pub word_pairs: bool,
    pub regex_mask: String,
    pub ngram_length: usize,
}

/// Values as they appear in either file format. Properties files carry
/// everything as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawConfig {
    text_file: Option<String>,
    text_column_name: Option<String>,
    #[serde(rename = "RowIDColumnName")]
    row_id_column_name: Option<String>,
    key_file: Option<String>,
    output_dir: Option<String>,
    word_pair_frequency: Option<Scalar>,
    regex_mask: Option<String>,
    #[serde(rename = "NGramLength")]
    ngram_length: Option<Scalar>,
}

impl RunConfig {
    /// Load a configuration file. `.json` files are read as JSON, anything
    /// else as a properties file. Relative paths starting with `.` resolve
    /// against the directory holding the configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content, base_dir)
        } else {
            Self::from_properties_str(&content, base_dir)
        }
    }

    pub fn from_json_str(content: &str, base_dir: &Path) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(content)
            .map_err(|e| Error::Configuration(format!("cannot parse JSON configuration: {}", e)))?;
        raw.validate(base_dir)
    }

    /// Parse `Key=Value` lines. Blank lines and `#` comments are skipped;
    /// the key ends at the first `=`.
    pub fn from_properties_str(content: &str, base_dir: &Path) -> Result<Self> {
        let mut map = Map::new();

        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(Error::Configuration(format!(
                    "invalid line '{}' in line {} of the configuration file",
                    line,
                    idx + 1
                )));
            };
            map.insert(key.trim().to_string(), Value::String(value.trim().to_string()));
        }

        let raw: RawConfig = serde_json::from_value(Value::Object(map))
            .map_err(|e| Error::Configuration(format!("cannot read configuration: {}", e)))?;
        raw.validate(base_dir)
    }

    /// Column names of the document table
    pub fn columns(&self) -> DocumentColumns {
        DocumentColumns::new(self.text_column.clone(), self.row_id_column.clone())
    }

    /// Tokenizer built from the configured mask
    pub fn tokenizer(&self) -> Result<Tokenizer> {
        Tokenizer::new(&self.regex_mask)
    }

    /// Stem naming the keyword reports: the key file, or the text file
    /// when no key file is configured
    pub fn key_stem(&self) -> String {
        file_stem(self.key_file.as_deref().unwrap_or(&self.text_file))
    }

    /// Stem naming the corpus reports
    pub fn text_stem(&self) -> String {
        file_stem(&self.text_file)
    }
}

impl RawConfig {
    fn validate(self, base_dir: &Path) -> Result<RunConfig> {
        let text_file = required(self.text_file, "TextFile")?;
        let text_column = required(self.text_column_name, "TextColumnName")?;
        let output_dir = required(self.output_dir, "OutputDir")?;

        let word_pairs = match self.word_pair_frequency {
            None => false,
            Some(value) => parse_bool(value, "WordPairFrequency")?,
        };

        let ngram_length = match self.ngram_length {
            None => DEFAULT_NGRAM_LEN,
            Some(value) => parse_len(value, "NGramLength")?,
        };
        if ngram_length < 2 {
            return Err(Error::Configuration(format!(
                "NGramLength must be at least 2, got {}",
                ngram_length
            )));
        }

        let regex_mask = self
            .regex_mask
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MASK.to_string());
        // Reject a bad mask before any file is touched
        Tokenizer::new(&regex_mask)?;

        Ok(RunConfig {
            text_file: resolve_relative(base_dir, &text_file),
            text_column,
            row_id_column: non_empty(self.row_id_column_name),
            key_file: non_empty(self.key_file).map(|k| resolve_relative(base_dir, &k)),
            output_dir: resolve_relative(base_dir, &output_dir),
            word_pairs,
            regex_mask,
            ngram_length,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    non_empty(value).ok_or_else(|| {
        Error::Configuration(format!(
            "{} property in program config file cannot be empty",
            key
        ))
    })
}

fn parse_bool(value: Scalar, key: &str) -> Result<bool> {
    match value {
        Scalar::Bool(b) => Ok(b),
        Scalar::Text(text) if text.trim().is_empty() => Ok(false),
        Scalar::Text(text) if text.trim().eq_ignore_ascii_case("true") => Ok(true),
        Scalar::Text(text) if text.trim().eq_ignore_ascii_case("false") => Ok(false),
        other => Err(Error::Configuration(format!(
            "{} must be true or false, got {:?}",
            key, other
        ))),
    }
}

fn parse_len(value: Scalar, key: &str) -> Result<usize> {
    let parsed = match &value {
        Scalar::Int(n) => usize::try_from(*n).ok(),
        Scalar::Text(text) => text.trim().parse().ok(),
        Scalar::Bool(_) => None,
    };
    parsed.ok_or_else(|| {
        Error::Configuration(format!("{} must be a positive integer, got {:?}", key, value))
    })
}
