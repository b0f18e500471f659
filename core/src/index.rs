use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = u32;

/// A document handed to the index. Only `id` and `text` are indexed; `title`
/// and `url` ride along for display layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub text: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Document {
    pub fn new(id: DocId, text: impl Into<String>) -> Self {
        Self { id, text: text.into(), ..Self::default() }
    }
}

/// Documents containing one term, with the per-document weight.
///
/// `doc_ids[i]` pairs with `weights[i]`; both vectors only grow through
/// [`PostingsEntry::push`], which keeps them the same length.
#[derive(Debug, Clone, Default)]
pub struct PostingsEntry {
    doc_ids: Vec<DocId>,
    weights: Vec<f32>,
}

impl PostingsEntry {
    pub fn new() -> Self {
        Self { doc_ids: Vec::with_capacity(64), weights: Vec::with_capacity(64) }
    }

    pub fn push(&mut self, doc_id: DocId, weight: f32) {
        self.doc_ids.push(doc_id);
        self.weights.push(weight);
    }

    /// Number of postings, which is the term's document frequency.
    pub fn len(&self) -> usize { self.doc_ids.len() }

    pub fn is_empty(&self) -> bool { self.doc_ids.is_empty() }

    pub fn doc_ids(&self) -> &[DocId] { &self.doc_ids }

    pub fn weights(&self) -> &[f32] { &self.weights }

    pub fn iter(&self) -> impl Iterator<Item = (DocId, f32)> + '_ {
        self.doc_ids.iter().copied().zip(self.weights.iter().copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub document_count: usize,
    pub term_count: usize,
}

/// The operations both index engines provide. Pick an engine once at
/// construction (see [`crate::IndexConfig`]) and use it through this trait.
pub trait Indexer: Send + Sync {
    /// Index a batch. Documents whose text analyzes to nothing are counted
    /// but contribute no postings.
    fn add(&mut self, docs: &[Document]);

    /// Ranked matches for `query`, best first, ties broken by ascending id.
    fn search(&self, query: &str) -> Vec<SearchResult>;

    fn stats(&self) -> IndexStats;

    /// Drop every posting and reset the document count.
    fn clear(&mut self);
}

/// Per-term occurrence counts for one analyzed document, and its total term
/// count. Returns `None` when the document has no terms.
pub(crate) fn term_counts(terms: Vec<String>) -> Option<(HashMap<String, u32>, usize)> {
    if terms.is_empty() {
        return None;
    }
    let total = terms.len();
    let mut counts: HashMap<String, u32> = HashMap::new();
    for term in terms {
        *counts.entry(term).or_insert(0) += 1;
    }
    Some((counts, total))
}

/// Term frequency as count over the document's total term count.
#[inline]
pub(crate) fn tf(count: u32, total: usize) -> f32 {
    (count as f64 / total as f64) as f32
}
