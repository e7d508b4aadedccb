use thiserror::Error;

/// Errors raised while loading inputs, building indexes or resolving queries.
///
/// A term or phrase that is absent from the corpus is not an error: queries
/// report that as `Ok(None)`.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid run parameter, or an unknown query type selector
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A document row that cannot be interpreted
    #[error("Source format error in line {line}: {message}")]
    SourceFormat { line: u64, message: String },

    /// A keyword row that cannot be turned into a query
    #[error("Keyword catalog error in line {line}: {message}")]
    CatalogLoad { line: u64, message: String },

    /// A query without any words
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for phrasetract operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::SourceFormat {
            line: 7,
            message: "expected 3 fields, found 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Source format error in line 7: expected 3 fields, found 2"
        );
    }
}
