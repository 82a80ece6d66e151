use crate::config::IndexConfig;
use crate::document::{index_document, PartialIndex};
use crate::error::{IndexError, Result};
use crate::index::{Document, InvertedIndex, Posting, RANK_ORDER};
use rayon::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub documents: usize,
    pub grams: usize,
    pub postings: usize,
}

impl BuildStats {
    pub fn of(documents: usize, index: &InvertedIndex) -> Self {
        Self { documents, grams: index.len(), postings: index.posting_count() }
    }
}

/// Build the global inverted index for `docs`.
///
/// Documents are scored in parallel; once every task has finished the
/// partial results are merged on the calling thread, in input order, and
/// each posting list is sorted by [`RANK_ORDER`]. The sort is stable, so
/// equal scores keep input order.
pub fn build(docs: &[Document], config: &IndexConfig) -> Result<InvertedIndex> {
    config.validate()?;
    let mut seen = HashSet::with_capacity(docs.len());
    for doc in docs {
        if !seen.insert(doc.path.as_str()) {
            return Err(IndexError::DuplicatePath(doc.path.clone()));
        }
    }

    let partials: Vec<PartialIndex<'_>> = docs
        .par_iter()
        .map(|doc| index_document(doc, &config.point, config.n))
        .collect();

    Ok(merge(partials, config.n))
}

fn merge(partials: Vec<PartialIndex<'_>>, n: usize) -> InvertedIndex {
    let mut index = InvertedIndex::new(n);
    for partial in partials {
        for (gram, point) in partial.points {
            index
                .postings
                .entry(gram.to_owned())
                .or_default()
                .push(Posting { path: partial.path.to_owned(), point });
        }
    }
    for postings in index.postings.values_mut() {
        postings.sort_by(|a, b| RANK_ORDER.compare(a.point, b.point));
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoreWeights;

    fn config(n: usize) -> IndexConfig {
        IndexConfig { n, point: ScoreWeights { title: 2, content: 1 }, ..IndexConfig::default() }
    }

    fn paths_and_points(index: &InvertedIndex, gram: &str) -> Vec<(String, i64)> {
        index.get(gram).unwrap().iter().map(|p| (p.path.clone(), p.point)).collect()
    }

    #[test]
    fn postings_are_sorted_ascending() {
        // "xy" scores 5 in A (title 2 + 3 body) and 3 in B (body only).
        let docs = vec![
            Document::new("A", "xy", "xy xy xy"),
            Document::new("B", "", "xy xy xy"),
        ];
        let index = build(&docs, &config(2)).unwrap();
        assert_eq!(paths_and_points(&index, "xy"), vec![("B".to_string(), 3), ("A".to_string(), 5)]);
    }

    #[test]
    fn ties_keep_input_order() {
        let docs = vec![
            Document::new("first", "", "ab"),
            Document::new("second", "", "ab"),
            Document::new("third", "", "ab"),
        ];
        let index = build(&docs, &config(2)).unwrap();
        let order: Vec<String> = index.get("ab").unwrap().iter().map(|p| p.path.clone()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn empty_input_builds_empty_index() {
        let index = build(&[], &config(2)).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.n, 2);
    }

    #[test]
    fn gramless_documents_contribute_nothing() {
        let docs = vec![Document::new("a", "x", "y"), Document::new("b", "", "ok")];
        let index = build(&docs, &config(2)).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(paths_and_points(&index, "ok"), vec![("b".to_string(), 1)]);
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let docs = vec![Document::new("a", "", "ab"), Document::new("a", "", "cd")];
        assert!(matches!(build(&docs, &config(2)), Err(IndexError::DuplicatePath(p)) if p == "a"));
    }

    #[test]
    fn zero_gram_length_is_rejected() {
        assert!(matches!(build(&[], &config(0)), Err(IndexError::Config(_))));
    }

    #[test]
    fn every_key_has_n_characters() {
        let docs = vec![Document::new("a", "Rust 検索", "parallel n-gram indexing")];
        let index = build(&docs, &config(3)).unwrap();
        assert!(index.check().is_ok());
        assert_eq!(BuildStats::of(1, &index).postings, index.len());
    }
}
