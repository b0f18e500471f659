//! Concurrent inverted index.
//!
//! Postings live in a sharded `DashMap`, each entry behind its own `RwLock`, so
//! workers appending to different terms never wait on each other. The document
//! count has a separate mutex. Lock order: entry lock before the count lock.

use crate::analyzer::analyze;
use crate::index::{tf, term_counts, DocId, Document, IndexStats, Indexer, PostingsEntry, SearchResult};
use crate::ranking::{accumulate, idf, rank};
use anyhow::{Context, Result};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type SharedEntry = Arc<RwLock<PostingsEntry>>;

pub struct ParallelIndex {
    entries: DashMap<String, SharedEntry>,
    doc_count: Mutex<usize>,
    pool: ThreadPool,
}

impl ParallelIndex {
    /// One worker per available CPU.
    pub fn new() -> Result<Self> { Self::with_workers(num_cpus::get()) }

    pub fn with_workers(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("index-worker-{i}"))
            .build()
            .context("failed to build index worker pool")?;
        Ok(Self { entries: DashMap::new(), doc_count: Mutex::new(0), pool })
    }

    pub fn workers(&self) -> usize { self.pool.current_num_threads() }

    /// Index a batch on the worker pool and block until every document is in.
    ///
    /// Safe to call from several threads at once. The new document count is
    /// published before any posting is written.
    pub fn add(&self, docs: &[Document]) {
        if docs.is_empty() {
            return;
        }
        let num_docs = {
            let mut count = self.doc_count.lock();
            *count += docs.len();
            *count
        };

        let skipped = AtomicUsize::new(0);
        self.pool.install(|| {
            docs.par_iter().for_each(|doc| {
                if !self.index_document(doc) {
                    skipped.fetch_add(1, Ordering::Relaxed);
                }
            });
        });
        tracing::debug!(
            batch = docs.len(),
            skipped = skipped.load(Ordering::Relaxed),
            num_docs,
            num_terms = self.entries.len(),
            workers = self.workers(),
            "parallel add"
        );
    }

    /// Returns false when the document analyzed to no terms.
    fn index_document(&self, doc: &Document) -> bool {
        let Some((counts, total)) = term_counts(analyze(&doc.text)) else {
            return false;
        };
        for (term, count) in counts {
            let entry = self.entry_or_insert(term);
            entry.write().push(doc.id, tf(count, total));
        }
        true
    }

    // The shard guard is released before the caller takes the entry lock.
    fn entry_or_insert(&self, term: String) -> SharedEntry {
        if let Some(entry) = self.entries.get(&term) {
            return Arc::clone(entry.value());
        }
        let entry = self.entries.entry(term).or_insert_with(|| Arc::new(RwLock::new(PostingsEntry::new())));
        Arc::clone(entry.value())
    }

    fn lookup(&self, term: &str) -> Option<SharedEntry> {
        self.entries.get(term).map(|e| Arc::clone(e.value()))
    }

    /// Query terms are scored on the pool. Each term's contribution is kept in
    /// its own slot and the slots are summed in query order, so the result
    /// does not depend on thread scheduling.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let terms = analyze(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let partials: Mutex<Vec<Option<HashMap<DocId, f32>>>> = Mutex::new(vec![None; terms.len()]);
        self.pool.install(|| {
            terms.par_iter().enumerate().for_each(|(slot, term)| {
                let Some(entry) = self.lookup(term) else { return };
                let postings = entry.read();
                let doc_count = *self.doc_count.lock();
                let mut partial = HashMap::with_capacity(postings.len());
                accumulate(&mut partial, &postings, idf(doc_count, postings.len()));
                drop(postings);
                partials.lock()[slot] = Some(partial);
            });
        });

        let mut scores: HashMap<DocId, f32> = HashMap::new();
        for partial in partials.into_inner().into_iter().flatten() {
            for (doc_id, score) in partial {
                *scores.entry(doc_id).or_insert(0.0) += score;
            }
        }
        let results = rank(scores);
        tracing::debug!(query, terms = terms.len(), hits = results.len(), "parallel search");
        results
    }

    /// Point-in-time counts; may lag a concurrent `add`.
    pub fn stats(&self) -> IndexStats {
        let document_count = *self.doc_count.lock();
        IndexStats { document_count, term_count: self.entries.len() }
    }

    /// Callers must not overlap this with `add` or `search`.
    pub fn clear(&self) {
        self.entries.clear();
        *self.doc_count.lock() = 0;
    }

    /// Copy of the postings for an already analyzed term.
    pub fn entry(&self, term: &str) -> Option<PostingsEntry> {
        self.lookup(term).map(|e| e.read().clone())
    }
}

impl Indexer for ParallelIndex {
    fn add(&mut self, docs: &[Document]) { ParallelIndex::add(self, docs) }

    fn search(&self, query: &str) -> Vec<SearchResult> { ParallelIndex::search(self, query) }

    fn stats(&self) -> IndexStats { ParallelIndex::stats(self) }

    fn clear(&mut self) { ParallelIndex::clear(self) }
}
