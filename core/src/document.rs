use crate::config::ScoreWeights;
use crate::index::Document;
use crate::tokenizer::ngrams;
use std::collections::HashMap;

/// Per-document gram scores. Borrows both the path and the grams from the
/// document it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialIndex<'a> {
    pub path: &'a str,
    pub points: HashMap<&'a str, i64>,
}

impl<'a> PartialIndex<'a> {
    pub fn get(&self, gram: &str) -> Option<i64> {
        self.points.get(gram).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Score every gram of one document: `title` points per occurrence in the
/// title plus `content` points per occurrence in the body.
pub fn index_document<'a>(doc: &'a Document, weights: &ScoreWeights, n: usize) -> PartialIndex<'a> {
    let mut points: HashMap<&'a str, i64> = HashMap::new();
    for gram in ngrams(&doc.title, n) {
        *points.entry(gram).or_insert(0) += weights.title;
    }
    for gram in ngrams(&doc.body, n) {
        *points.entry(gram).or_insert(0) += weights.content;
    }
    tracing::debug!(path = %doc.path, grams = points.len(), "indexed document");
    PartialIndex { path: &doc.path, points }
}
