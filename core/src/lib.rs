//! In-memory full-text search over short documents, ranked by TF-IDF.
//!
//! Two interchangeable engines implement [`Indexer`]: [`SequentialIndex`] for
//! single-threaded use and [`ParallelIndex`], which indexes on a worker pool
//! with per-term locking. Both run text through the same [`analyzer`].

pub mod analyzer;
pub mod config;
pub mod corpus;
pub mod index;
pub mod parallel;
pub mod ranking;
pub mod sequential;

pub use config::{IndexConfig, IndexKind};
pub use index::{DocId, Document, IndexStats, Indexer, PostingsEntry, SearchResult};
pub use parallel::ParallelIndex;
pub use sequential::SequentialIndex;
