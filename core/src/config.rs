use crate::index::Indexer;
use crate::parallel::ParallelIndex;
use crate::sequential::SequentialIndex;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which engine backs an index. Chosen once, at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    #[default]
    Sequential,
    Parallel,
}

impl FromStr for IndexKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "simple" => Ok(IndexKind::Sequential),
            "parallel" | "concurrent" => Ok(IndexKind::Parallel),
            other => bail!("unknown index engine {other:?} (expected \"sequential\" or \"parallel\")"),
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Sequential => f.pad("sequential"),
            IndexKind::Parallel => f.pad("parallel"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    pub kind: IndexKind,
    /// Worker pool size for the parallel engine; defaults to the CPU count.
    #[serde(default)]
    pub workers: Option<usize>,
}

impl IndexConfig {
    pub fn new(kind: IndexKind) -> Self { Self { kind, workers: None } }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn build(&self) -> Result<Box<dyn Indexer>> {
        let index: Box<dyn Indexer> = match self.kind {
            IndexKind::Sequential => Box::new(SequentialIndex::new()),
            IndexKind::Parallel => {
                let workers = self.workers.unwrap_or_else(num_cpus::get);
                Box::new(ParallelIndex::with_workers(workers)?)
            }
        };
        tracing::debug!(kind = %self.kind, "built index");
        Ok(index)
    }
}
