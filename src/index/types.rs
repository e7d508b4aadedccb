use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier of a document (row id column value or 0-based row ordinal)
pub type DocId = i64;

/// 0-based token position within a document
pub type Offset = i64;

/// One occurrence of a term: the document and the token position.
///
/// Ordering is by document first, then offset, which is the order postings
/// are appended during the build pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Posting {
    pub doc_id: DocId,
    pub offset: Offset,
}

impl Posting {
    pub fn new(doc_id: DocId, offset: Offset) -> Self {
        Self { doc_id, offset }
    }
}

/// Key of a postings list.
///
/// Identity (equality and hashing) is the normalized, space-joined string
/// form returned by [`TermKey::as_key`]. `Borrow<str>` lets index maps be
/// probed with a plain `&str`.
pub trait TermKey: Clone + Eq + Hash + Borrow<str> + fmt::Display {
    /// Normalized space-joined form of the key
    fn as_key(&self) -> &str;

    /// Key labelling the merge of `self` followed by `next`
    fn followed_by(&self, next: &Self) -> Self;
}

/// A single token (or a space-joined phrase when labelling merged lists)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Term(String);

impl Term {
    pub fn new(token: &str) -> Self {
        Self(token.to_lowercase())
    }
}

impl Borrow<str> for Term {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TermKey for Term {
    fn as_key(&self) -> &str {
        &self.0
    }

    fn followed_by(&self, next: &Self) -> Self {
        Self(format!("{} {}", self.0, next.0))
    }
}

/// An ordered tuple of consecutive tokens, e.g. `["thank", "you"]`.
///
/// Two n-grams are the same key when their lowercased, space-joined forms are
/// equal; the individual words never take part in comparisons.
#[derive(Debug, Clone)]
pub struct NGram {
    words: Vec<String>,
    joined: String,
}

impl NGram {
    pub fn new<S: AsRef<str>>(words: &[S]) -> Self {
        let words: Vec<String> = words.iter().map(|w| w.as_ref().to_lowercase()).collect();
        debug_assert!(words.iter().all(|w| !w.is_empty()), "n-gram component cannot be empty");
        let joined = words.join(" ");
        Self { words, joined }
    }

    /// Words making up this n-gram
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl PartialEq for NGram {
    fn eq(&self, other: &Self) -> bool {
        self.joined == other.joined
    }
}

impl Eq for NGram {}

impl Hash for NGram {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.joined.hash(state);
    }
}

impl Borrow<str> for NGram {
    fn borrow(&self) -> &str {
        &self.joined
    }
}

impl fmt::Display for NGram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined)
    }
}

impl TermKey for NGram {
    fn as_key(&self) -> &str {
        &self.joined
    }

    fn followed_by(&self, next: &Self) -> Self {
        let mut words = self.words.clone();
        words.extend(next.words.iter().cloned());
        let joined = format!("{} {}", self.joined, next.joined);
        Self { words, joined }
    }
}
