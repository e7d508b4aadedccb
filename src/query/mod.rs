//! Keyword queries against the built indexes.
//!
//! - [`keyword`] - Query definitions and the catalog they are loaded into
//! - [`ledger`] - Which query labels matched which document
//! - [`dispatch`] - Indexing pass with regex scanning, and keyword resolution

pub mod dispatch;
pub mod keyword;
pub mod ledger;

pub use dispatch::{
    BuildOutcome, DocumentColumns, KeywordOutcome, MatchCounts, QueryDispatcher, Resolution,
    Suggestion, document_id,
};
pub use keyword::{Keyword, KeywordCatalog, KeywordId, QueryType};
pub use ledger::DocumentQueryLedger;
