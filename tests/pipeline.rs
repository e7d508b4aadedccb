//! End-to-end runs of the three-pass pipeline against files on disk.

mod common;

use common::{read, write_fixture};
use phrasetract::config::RunConfig;
use phrasetract::pipeline::{self, OutputFiles};
use std::fs;

#[test]
fn test_full_run_writes_all_reports() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::load(&write_fixture(dir.path(), true)).unwrap();
    let files = OutputFiles::new(&config);

    let summary = pipeline::run(&config, true).unwrap();
    assert_eq!(summary.rows_read, 5);
    assert_eq!(summary.documents_indexed, 5);
    assert_eq!(summary.unique_terms, 8);
    assert_eq!(summary.unique_word_pairs, Some(6));
    assert_eq!(summary.regex_documents, 3);
    assert_eq!(summary.documents_matched, 4);
    assert_eq!(summary.keywords, 6);
    assert_eq!(summary.keywords_found, 4);
    assert_eq!(summary.keywords_not_found, 2);
    assert_eq!(summary.outputs.len(), 6);

    assert_eq!(
        read(&files.keyword_frequencies),
        "regex|word_freq|word\n0|2|cat dog\n1|3|d.g\n2|3|dog cat\n0|0|xyz\n0|0|e-mail\n2|1|here\n"
    );
    assert_eq!(
        read(&files.matched_documents),
        "rowid|queries|text\n\
         1|cat dog,d.g,dog cat|Cat dog\n\
         2|d.g,dog cat|dog cat\n\
         3|cat dog,d.g,dog cat|cat dog cat\n\
         5|here|nothing here\n"
    );
    assert_eq!(
        read(&files.unmatched_documents),
        "rowid|text\n4|the e mail bounced\n"
    );
    assert_eq!(
        read(&files.word_frequencies),
        "frequency|word\n4|cat\n3|dog\n1|the\n1|e\n1|mail\n1|bounced\n1|nothing\n1|here\n"
    );
    assert_eq!(
        read(&files.word_pair_frequencies),
        "frequency|word\n2|cat dog\n2|dog cat\n1|the e\n1|e mail\n1|mail bounced\n1|nothing here\n"
    );
    assert_eq!(
        read(&files.remaining_words),
        "keyed|word\n0|bounced\n0|cat\n0|dog\n0|e\n1|here\n0|mail\n0|nothing\n0|the\n"
    );
}

#[test]
fn test_report_names_follow_input_stems() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::load(&write_fixture(dir.path(), false)).unwrap();
    let files = OutputFiles::new(&config);
    let out = dir.path().join("./out");

    assert_eq!(files.keyword_frequencies, out.join("keys_Keyword_Frequs.csv"));
    assert_eq!(files.matched_documents, out.join("keys_DocsWithKeywords.csv"));
    assert_eq!(files.unmatched_documents, out.join("keys_NoMatchDocsWithKeywords.csv"));
    assert_eq!(files.word_frequencies, out.join("docs_AllWord_Frequs.csv"));
    assert_eq!(files.word_pair_frequencies, out.join("docs_AllWord_WordPair_Frequs.csv"));
    assert_eq!(files.remaining_words, out.join("keys_AllWord_Remaining_Words.csv"));
}

#[test]
fn test_hyphen_suggestion_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::load(&write_fixture(dir.path(), true)).unwrap();

    // 'e-mail' never occurs in the fixture, so nothing is proposed
    let summary = pipeline::run(&config, true).unwrap();
    assert!(summary.suggestions.is_empty());

    fs::write(
        &config.text_file,
        "id|text\n1|the e-mail bounced\n2|an e mail arrived\n3|e mail again\n",
    )
    .unwrap();
    let summary = pipeline::run(&config, true).unwrap();
    assert_eq!(summary.suggestions.len(), 1);
    let suggestion = &summary.suggestions[0];
    assert_eq!(suggestion.keyword, "e-mail");
    assert_eq!(suggestion.variant, "e mail");
    assert_eq!(suggestion.inverted_frequency, 2);
    assert_eq!(suggestion.ngram_frequency, Some(2));
}

#[test]
fn test_unsorted_row_ids() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::load(&write_fixture(dir.path(), false)).unwrap();
    let files = OutputFiles::new(&config);
    fs::write(
        &config.text_file,
        "id|text\n10|cat dog\n3|dog cat\n7|cat dog cat\n",
    )
    .unwrap();

    pipeline::run(&config, true).unwrap();
    assert!(read(&files.keyword_frequencies).starts_with("regex|word_freq|word\n0|2|cat dog\n"));
    // Document tables keep file order
    assert_eq!(
        read(&files.matched_documents),
        "rowid|queries|text\n\
         10|cat dog,d.g,dog cat|cat dog\n\
         3|d.g,dog cat|dog cat\n\
         7|cat dog,d.g,dog cat|cat dog cat\n"
    );

    fs::write(&config.text_file, "id|text\n10|cat dog\n10|dog cat\n").unwrap();
    let err = pipeline::run(&config, true).unwrap_err();
    assert!(err.root_cause().to_string().contains("appears more than once"));
}

#[test]
fn test_without_word_pairs_or_matches() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = RunConfig::load(&write_fixture(dir.path(), false)).unwrap();
    let keys = dir.path().join("nomatch.csv");
    fs::write(&keys, "regex|text\n0|zebra\n").unwrap();
    config.key_file = Some(keys);
    let files = OutputFiles::new(&config);

    let summary = pipeline::run(&config, true).unwrap();
    assert_eq!(summary.documents_matched, 0);
    assert_eq!(summary.unique_word_pairs, None);
    assert!(files.keyword_frequencies.exists());
    assert!(!files.matched_documents.exists());
    assert!(!files.unmatched_documents.exists());
    assert!(!files.word_pair_frequencies.exists());
    assert!(files.word_frequencies.exists());
}

#[test]
fn test_ordinal_ids_without_key_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = RunConfig::load(&write_fixture(dir.path(), false)).unwrap();
    config.key_file = None;
    config.row_id_column = None;
    let files = OutputFiles::new(&config);

    let summary = pipeline::run(&config, true).unwrap();
    assert_eq!(summary.keywords, 0);
    assert!(!files.keyword_frequencies.exists());
    // Reports fall back to the text file stem
    assert!(dir.path().join("out").join("docs_AllWord_Remaining_Words.csv").exists());
}

#[test]
fn test_broken_inputs_abort() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = RunConfig::load(&write_fixture(dir.path(), false)).unwrap();

    fs::write(&config.text_file, "id|text\n").unwrap();
    let err = pipeline::run(&config, true).unwrap_err();
    assert!(err.to_string().contains("No data rows"));

    fs::write(&config.text_file, "id|text\n1|fine\n2|one|too many\n").unwrap();
    assert!(pipeline::run(&config, true).is_err());

    fs::write(&config.text_file, "id|text\n1|fine\n").unwrap();
    let keys = dir.path().join("bad_keys.csv");
    fs::write(&keys, "regex|text\n5|oops\n").unwrap();
    config.key_file = Some(keys);
    let err = pipeline::run(&config, true).unwrap_err();
    let root = err.root_cause().to_string();
    assert!(root.contains("unknown type of query identifier 5"), "{}", root);
}
