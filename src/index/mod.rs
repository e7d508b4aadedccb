pub mod inverted;
pub mod ngram;
pub mod postings;
pub mod types;

pub use inverted::{InvertedIndex, InvertedIndexBuilder, TermIndex, TermIndexBuilder};
pub use ngram::{NGramIndex, NGramIndexBuilder};
pub use postings::PostingsList;
pub use types::*;
