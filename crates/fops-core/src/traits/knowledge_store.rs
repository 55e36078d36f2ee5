use crate::errors::KnowledgeError;
use crate::models::{KnowledgePartition, RetrievalHit};

/// Read-only semantic knowledge store. The pipeline never writes to it.
pub trait IKnowledgeStore: Send + Sync {
    /// Embed text with the function used to index the corpus.
    fn embed(&self, text: &str) -> Result<Vec<f32>, KnowledgeError>;

    /// Nearest neighbours of `query_embedding` in `partition`, ranked
    /// descending. At least the best `top_k` hits; hits tied with the last
    /// of them may follow so the caller's tie-break can reach them.
    fn search(
        &self,
        partition: KnowledgePartition,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalHit>, KnowledgeError>;
}
