use crate::error::{IndexError, Result};
use crate::index::{InvertedIndex, RANK_ORDER};
use crate::tokenizer::ngrams;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Separates terms in a raw query; a URL-encoded space.
pub const TERM_DELIMITER: char = '+';

/// One ranked result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub path: String,
    pub point: i64,
}

/// Score `query` against `index` using grams of length `n`.
///
/// Points of every posting matched by every query gram are summed per
/// document. Grams missing from the index are skipped, so an empty query
/// or one made of terms shorter than `n` yields no hits. Hits are ordered
/// by [`RANK_ORDER`]; equal scores keep the order documents were first hit.
pub fn search(query: &str, index: &InvertedIndex, n: usize) -> Vec<Hit> {
    let mut hits: Vec<Hit> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    let grams = query.split(TERM_DELIMITER).flat_map(|term| ngrams(term, n));
    for gram in grams {
        let Some(postings) = index.get(gram) else { continue };
        for posting in postings {
            match slots.get(posting.path.as_str()) {
                Some(&slot) => hits[slot].point += posting.point,
                None => {
                    slots.insert(&posting.path, hits.len());
                    hits.push(Hit { path: posting.path.clone(), point: posting.point });
                }
            }
        }
    }

    hits.sort_by(|a, b| RANK_ORDER.compare(a.point, b.point));
    hits
}

/// A loaded index paired with the gram length queries are cut with.
/// Cheap to clone; every clone reads the same immutable index.
#[derive(Debug, Clone)]
pub struct Searcher {
    index: Arc<InvertedIndex>,
}

impl Searcher {
    /// Fails when `n` differs from the gram length the index was built with.
    pub fn new(index: InvertedIndex, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(IndexError::Config("gram length must be at least 1".into()));
        }
        if index.n != n {
            return Err(IndexError::Config(format!(
                "index was built with n = {} but queries use n = {n}",
                index.n
            )));
        }
        Ok(Self { index: Arc::new(index) })
    }

    pub fn n(&self) -> usize {
        self.index.n
    }

    pub fn search(&self, query: &str) -> Vec<Hit> {
        search(query, &self.index, self.index.n)
    }
}
