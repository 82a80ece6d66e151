use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A rendered page handed over by the site generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier relative to the content root, returned in search hits.
    pub path: String,
    pub title: String,
    /// Plain text with markup already stripped.
    pub body: String,
}

impl Document {
    pub fn new(path: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { path: path.into(), title: title.into(), body: body.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub path: String,
    pub point: i64,
}

/// Direction used both for posting lists and for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    Ascending,
    Descending,
}

impl RankOrder {
    pub fn compare(self, a: i64, b: i64) -> Ordering {
        match self {
            RankOrder::Ascending => a.cmp(&b),
            RankOrder::Descending => b.cmp(&a),
        }
    }
}

/// Lowest score first. Posting lists and query results both follow it.
pub const RANK_ORDER: RankOrder = RankOrder::Ascending;

/// Gram -> postings, one posting per document containing the gram,
/// ordered by [`RANK_ORDER`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvertedIndex {
    /// Gram length the index was built with.
    pub n: usize,
    #[serde(default)]
    pub postings: BTreeMap<String, Vec<Posting>>,
}

impl InvertedIndex {
    pub fn new(n: usize) -> Self {
        Self { n, postings: BTreeMap::new() }
    }

    pub fn get(&self, gram: &str) -> Option<&[Posting]> {
        self.postings.get(gram).map(Vec::as_slice)
    }

    /// Number of distinct grams.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn posting_count(&self) -> usize {
        self.postings.values().map(Vec::len).sum()
    }

    /// Check the shape every loaded index must have: each key is exactly
    /// `n` characters and owns at least one posting.
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.n == 0 {
            return Err("gram length is zero".into());
        }
        for (gram, postings) in &self.postings {
            if gram.chars().count() != self.n {
                return Err(format!("gram {gram:?} is not {} characters long", self.n));
            }
            if postings.is_empty() {
                return Err(format!("gram {gram:?} has no postings"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(path: &str, point: i64) -> Posting {
        Posting { path: path.into(), point }
    }

    #[test]
    fn ascending_is_the_shipped_order() {
        assert_eq!(RANK_ORDER, RankOrder::Ascending);
        assert_eq!(RANK_ORDER.compare(3, 5), Ordering::Less);
        assert_eq!(RankOrder::Descending.compare(3, 5), Ordering::Greater);
    }

    #[test]
    fn check_rejects_wrong_gram_length() {
        let mut index = InvertedIndex::new(2);
        index.postings.insert("abc".into(), vec![posting("a", 1)]);
        assert!(index.check().is_err());
    }

    #[test]
    fn check_rejects_empty_posting_list() {
        let mut index = InvertedIndex::new(2);
        index.postings.insert("ab".into(), vec![]);
        assert!(index.check().is_err());
    }

    #[test]
    fn check_counts_characters_not_bytes() {
        let mut index = InvertedIndex::new(2);
        index.postings.insert("検索".into(), vec![posting("a", 1)]);
        assert!(index.check().is_ok());
        assert_eq!(index.posting_count(), 1);
    }
}
