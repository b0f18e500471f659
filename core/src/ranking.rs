//! Scoring shared by both engines.
//!
//! Entries store plain TF. IDF is derived when a query runs, from the document
//! count at that moment, so repeated `add` calls never rescale stored weights.

use crate::index::{DocId, PostingsEntry, SearchResult};
use std::cmp::Ordering;
use std::collections::HashMap;

/// `ln(N / (df + 1)) + 1`, where `df` is the number of postings for the term.
pub fn idf(doc_count: usize, posting_count: usize) -> f32 {
    ((doc_count as f64 / (posting_count as f64 + 1.0)).ln() + 1.0) as f32
}

/// Add one term's TF-IDF contribution to every document in its postings.
pub fn accumulate(scores: &mut HashMap<DocId, f32>, entry: &PostingsEntry, idf: f32) {
    for (doc_id, tf) in entry.iter() {
        *scores.entry(doc_id).or_insert(0.0) += tf * idf;
    }
}

/// Order accumulated scores: highest first, equal scores by ascending id.
/// Documents whose total is zero are left out.
pub fn rank(scores: HashMap<DocId, f32>) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = scores
        .into_iter()
        .filter(|(_, score)| *score != 0.0)
        .map(|(doc_id, score)| SearchResult { doc_id, score })
        .collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    results
}
