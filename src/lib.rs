//! # phrasetract - keyword, phrase and regex extraction
//!
//! phrasetract reads a pipe-delimited table of text documents, builds an
//! in-memory positional inverted index over it and resolves a catalog of
//! keywords (exact phrases, boolean-AND word sets and regular expressions)
//! against every document.
//!
//! ## Architecture
//!
//! - [`index`] - Postings lists, the inverted index and the word n-gram index
//! - [`query`] - Keyword catalog, match ledger and the dispatch passes
//! - [`source`] - Pipe-delimited row sources that can be re-read
//! - [`output`] - Report tables and terminal output
//! - [`config`] - Properties/JSON run configuration
//! - [`pipeline`] - The three-pass extraction run and ad hoc queries
//! - [`utils`] - Tokenizer, paths and progress bars
//!
//! ## Quick Start
//!
//! ```
//! use phrasetract::index::InvertedIndex;
//! use phrasetract::utils::Tokenizer;
//!
//! let tokenizer = Tokenizer::default();
//! let index = InvertedIndex::from_documents(
//!     &tokenizer,
//!     [(1, "cat dog"), (2, "dog cat"), (3, "cat dog cat")],
//! );
//!
//! let phrase = index.phrase_query(&["cat", "dog"]).unwrap().unwrap();
//! assert_eq!(phrase.document_ids().len(), 2);
//!
//! let docs = index.boolean_and_query(&["cat", "dog"]).unwrap().unwrap();
//! assert_eq!(docs.len(), 3);
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod source;
pub mod utils;

pub use error::{Error, Result};
