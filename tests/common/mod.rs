//! Shared corpus for the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const DOCS: &str = "\
id|text
1|Cat dog
2|dog cat
3|cat dog cat
4|the e mail bounced
5|nothing here
";

pub const KEYS: &str = "\
regex|text
0|cat dog
1|d.g
2|dog cat
0|xyz
0|e-mail
2|here
";

/// Write the corpus, keywords and a properties file using relative paths.
/// Returns the configuration file.
pub fn write_fixture(dir: &Path, word_pairs: bool) -> PathBuf {
    fs::write(dir.join("docs.csv"), DOCS).unwrap();
    fs::write(dir.join("keys.csv"), KEYS).unwrap();

    let config = dir.join("run.properties");
    fs::write(
        &config,
        format!(
            "# integration fixture\n\
             TextFile=./docs.csv\n\
             TextColumnName=text\n\
             RowIDColumnName=id\n\
             KeyFile=./keys.csv\n\
             OutputDir=./out\n\
             WordPairFrequency={}\n",
            word_pairs
        ),
    )
    .unwrap();
    config
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e))
}
