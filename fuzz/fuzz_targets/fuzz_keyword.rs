#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use phrasetract::index::InvertedIndex;
use phrasetract::query::{Keyword, QueryType};
use phrasetract::utils::Tokenizer;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    selector: u8,
    keyword: &'a str,
    document: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let Ok(query_type) = QueryType::try_from(i64::from(input.selector % 4)) else {
        return;
    };
    // Regex keywords may fail to compile; that must be an error, not a panic
    let Ok(keyword) = Keyword::new(1, query_type, input.keyword) else {
        return;
    };
    let _ = keyword.matches_raw(input.document);

    let tokenizer = Tokenizer::default();
    let index = InvertedIndex::from_documents(&tokenizer, [(0, input.document)]);
    let words = tokenizer.tokenize(keyword.text());
    if words.is_empty() {
        return;
    }
    if let Ok(Some(list)) = index.phrase_query(words.as_slice()) {
        assert!(!list.is_empty());
    }
    if let Ok(Some(docs)) = index.boolean_and_query(words.as_slice()) {
        assert!(docs.contains(&0));
    }
});
