//! Partitioned in-memory knowledge store.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use fops_core::config::defaults::DEFAULT_TIE_EPSILON;
use fops_core::config::RetrievalConfig;
use fops_core::errors::KnowledgeError;
use fops_core::models::{KnowledgeItem, KnowledgePartition, RetrievalHit};
use fops_core::traits::{IEmbeddingProvider, IKnowledgeStore};
use serde::Deserialize;

use crate::ranking;
use crate::similarity::cosine_similarity;

/// One line of a JSONL corpus.
#[derive(Debug, Deserialize)]
struct CorpusRecord {
    partition: KnowledgePartition,
    #[serde(flatten)]
    item: KnowledgeItem,
}

/// Items grouped by partition, each embedded with the store's own embedder.
///
/// Populated once, then shared read-only (`Arc<MemoryKnowledgeStore>`).
/// Partitions that were never populated are unavailable; partitions that
/// were declared but hold nothing are empty.
pub struct MemoryKnowledgeStore {
    embedder: Arc<dyn IEmbeddingProvider>,
    partitions: BTreeMap<KnowledgePartition, Vec<Arc<KnowledgeItem>>>,
    tie_epsilon: f64,
}

impl MemoryKnowledgeStore {
    pub fn new(embedder: Arc<dyn IEmbeddingProvider>) -> Self {
        Self {
            embedder,
            partitions: BTreeMap::new(),
            tie_epsilon: DEFAULT_TIE_EPSILON,
        }
    }

    /// Store ranking with the same tie band the retriever uses.
    pub fn from_config(embedder: Arc<dyn IEmbeddingProvider>, config: &RetrievalConfig) -> Self {
        Self::new(embedder).with_tie_epsilon(config.tie_epsilon)
    }

    pub fn with_tie_epsilon(mut self, tie_epsilon: f64) -> Self {
        self.tie_epsilon = tie_epsilon;
        self
    }

    /// Declare every partition, so searches on empty ones return no hits
    /// instead of failing.
    pub fn with_all_partitions(mut self) -> Self {
        for partition in KnowledgePartition::ALL {
            self.partitions.entry(*partition).or_default();
        }
        self
    }

    /// Add an item, embedding it first if it carries no vector.
    pub fn insert(
        &mut self,
        partition: KnowledgePartition,
        mut item: KnowledgeItem,
    ) -> Result<(), KnowledgeError> {
        if item.embedding.is_empty() {
            item.embedding = self.embedder.embed(&item.text)?;
        }
        let expected = self.embedder.dimensions();
        if item.embedding.len() != expected {
            return Err(KnowledgeError::DimensionMismatch {
                expected,
                actual: item.embedding.len(),
            });
        }
        self.partitions
            .entry(partition)
            .or_default()
            .push(Arc::new(item));
        Ok(())
    }

    /// Load a JSONL corpus. Blank lines are skipped; any malformed line
    /// fails the load with its 1-based line number.
    pub fn load_jsonl(
        path: &Path,
        embedder: Arc<dyn IEmbeddingProvider>,
    ) -> Result<Self, KnowledgeError> {
        let file = std::fs::File::open(path).map_err(|e| KnowledgeError::CorpusLoad {
            path: path.display().to_string(),
            line: 0,
            reason: e.to_string(),
        })?;
        let mut store = Self::new(embedder).with_all_partitions();
        let reader = std::io::BufReader::new(file);

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let corpus_error = |reason: String| KnowledgeError::CorpusLoad {
                path: path.display().to_string(),
                line: line_no,
                reason,
            };
            let line = line.map_err(|e| corpus_error(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let record: CorpusRecord =
                serde_json::from_str(&line).map_err(|e| corpus_error(e.to_string()))?;
            store
                .insert(record.partition, record.item)
                .map_err(|e| corpus_error(e.to_string()))?;
        }

        tracing::info!(
            path = %path.display(),
            items = store.len(),
            embedder = store.embedder.name(),
            "knowledge corpus loaded"
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.partitions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn partition_len(&self, partition: KnowledgePartition) -> usize {
        self.partitions.get(&partition).map_or(0, Vec::len)
    }
}

impl IKnowledgeStore for MemoryKnowledgeStore {
    fn embed(&self, text: &str) -> Result<Vec<f32>, KnowledgeError> {
        self.embedder.embed(text)
    }

    fn search(
        &self,
        partition: KnowledgePartition,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalHit>, KnowledgeError> {
        let items = self
            .partitions
            .get(&partition)
            .ok_or_else(|| KnowledgeError::PartitionUnavailable {
                partition: partition.to_string(),
            })?;
        let expected = self.embedder.dimensions();
        if query_embedding.len() != expected {
            return Err(KnowledgeError::DimensionMismatch {
                expected,
                actual: query_embedding.len(),
            });
        }

        let hits: Vec<RetrievalHit> = items
            .iter()
            .map(|item| RetrievalHit {
                score: cosine_similarity(query_embedding, &item.embedding),
                item: Arc::clone(item),
            })
            .collect();
        Ok(ranking::rank_with_ties(hits, self.tie_epsilon, top_k))
    }
}
