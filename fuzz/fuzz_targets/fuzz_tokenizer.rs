#![no_main]

use libfuzzer_sys::fuzz_target;
use phrasetract::utils::Tokenizer;

fuzz_target!(|data: &str| {
    let tokenizer = Tokenizer::default();
    let tokens = tokenizer.tokenize(data);
    // Tokens are never empty and never hold whitespace
    for token in &tokens {
        assert!(!token.is_empty());
        assert!(!token.chars().any(char::is_whitespace));
    }
    assert_eq!(tokenizer.tokenize(&tokenizer.normalize(data)), tokens);
});
