//! Shared helpers.
//!
//! - [`tokenizer`] - Mask-based tokenization shared by documents and keywords
//! - [`paths`] - Configuration-relative paths and report name stems
//! - [`progress`] - Pass progress bars (no-op without the `progress` feature)

pub mod paths;
pub mod progress;
pub mod tokenizer;

pub use paths::*;
pub use progress::PassProgress;
pub use tokenizer::*;
