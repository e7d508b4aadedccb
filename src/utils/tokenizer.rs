use crate::error::{Error, Result};
use regex::Regex;

/// Separator mask used when the configuration does not name one.
/// Everything outside letters, digits, German umlauts and `-_#!` splits tokens.
pub const DEFAULT_MASK: &str = "[^a-zA-Z0-9-äüöÄÜÖß_#!]+";

/// Turns raw text into lowercase tokens.
///
/// Every match of the mask is replaced by a single space, the result is
/// lowercased, trimmed and split on whitespace runs. Documents and keyword
/// texts go through the same tokenizer so indexed terms and query terms
/// compare equal.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    mask: Regex,
}

impl Tokenizer {
    /// Compile a tokenizer from a character-class mask
    pub fn new(mask: &str) -> Result<Self> {
        if mask.trim().is_empty() {
            return Err(Error::Configuration(
                "RegexMask cannot be empty".to_string(),
            ));
        }

        let mask = Regex::new(mask).map_err(|e| {
            Error::Configuration(format!("RegexMask '{}' is not a valid pattern: {}", mask, e))
        })?;

        Ok(Self { mask })
    }

    /// The mask pattern this tokenizer splits on
    pub fn mask(&self) -> &str {
        self.mask.as_str()
    }

    /// Split `text` into its ordered token sequence.
    ///
    /// Text that is empty after masking yields no tokens at all.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let masked = self.mask.replace_all(text, " ");
        masked
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Tokenize and join with single spaces (the label form of a query)
    pub fn normalize(&self, text: &str) -> String {
        self.tokenize(text).join(" ")
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_MASK).expect("default mask is a valid pattern")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_positions() {
        let tokenizer = Tokenizer::default();
        assert_eq!(tokenizer.tokenize("a b a"), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_punctuation_and_case() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize("  Hello, World!  (Rust) ");
        assert_eq!(tokens, vec!["hello", "world!", "rust"]);
    }

    #[test]
    fn test_hyphen_and_umlauts_are_kept() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize("Über-Größe e-mail");
        assert_eq!(tokens, vec!["über-größe", "e-mail"]);
    }

    #[test]
    fn test_empty_after_mask_yields_no_tokens() {
        let tokenizer = Tokenizer::default();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("   ").is_empty());
        // Only separators: must not produce a single empty token
        assert!(tokenizer.tokenize("... ,;: ()").is_empty());
    }

    #[test]
    fn test_custom_mask() {
        let tokenizer = Tokenizer::new("[^a-z]+").unwrap();
        // Uppercase letters are masked before lowercasing
        assert_eq!(tokenizer.tokenize("abc1def GHI"), vec!["abc", "def"]);
        assert_eq!(tokenizer.mask(), "[^a-z]+");
    }

    #[test]
    fn test_normalize() {
        let tokenizer = Tokenizer::default();
        assert_eq!(tokenizer.normalize("  Thank   YOU,very much "), "thank you very much");
    }

    #[test]
    fn test_invalid_mask() {
        assert!(matches!(
            Tokenizer::new("[a-"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(Tokenizer::new("  "), Err(Error::Configuration(_))));
    }
}
