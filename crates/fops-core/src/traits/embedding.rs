use crate::errors::KnowledgeError;

/// Embedding generation provider. The same provider must index the corpus
/// and embed queries.
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed a single text, returning an L2-normalized vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, KnowledgeError>;

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}
