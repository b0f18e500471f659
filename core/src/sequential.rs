use crate::analyzer::analyze;
use crate::index::{tf, term_counts, Document, IndexStats, Indexer, PostingsEntry, SearchResult};
use crate::ranking::{accumulate, idf, rank};
use std::collections::HashMap;

/// Single-threaded inverted index over a plain map. No internal locking;
/// `&mut self` on `add` and `clear` is the only synchronization.
#[derive(Debug, Default)]
pub struct SequentialIndex {
    entries: HashMap<String, PostingsEntry>,
    doc_count: usize,
}

impl SequentialIndex {
    pub fn new() -> Self { Self::default() }

    /// Postings for an already analyzed term.
    pub fn entry(&self, term: &str) -> Option<&PostingsEntry> { self.entries.get(term) }
}

impl Indexer for SequentialIndex {
    fn add(&mut self, docs: &[Document]) {
        if docs.is_empty() {
            return;
        }
        self.doc_count += docs.len();

        let mut skipped = 0usize;
        for doc in docs {
            let Some((counts, total)) = term_counts(analyze(&doc.text)) else {
                skipped += 1;
                continue;
            };
            for (term, count) in counts {
                self.entries.entry(term).or_insert_with(PostingsEntry::new).push(doc.id, tf(count, total));
            }
        }
        tracing::debug!(batch = docs.len(), skipped, num_docs = self.doc_count, num_terms = self.entries.len(), "sequential add");
    }

    fn search(&self, query: &str) -> Vec<SearchResult> {
        let terms = analyze(query);
        if terms.is_empty() {
            return Vec::new();
        }
        let mut scores = HashMap::new();
        for term in &terms {
            if let Some(entry) = self.entries.get(term) {
                accumulate(&mut scores, entry, idf(self.doc_count, entry.len()));
            }
        }
        let results = rank(scores);
        tracing::debug!(query, terms = terms.len(), hits = results.len(), "sequential search");
        results
    }

    fn stats(&self) -> IndexStats {
        IndexStats { document_count: self.doc_count, term_count: self.entries.len() }
    }

    fn clear(&mut self) {
        self.entries = HashMap::new();
        self.doc_count = 0;
    }
}
