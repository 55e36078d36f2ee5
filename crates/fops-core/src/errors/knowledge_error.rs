use super::error_code::{self, FopsErrorCode};

/// Knowledge store errors. The retriever downgrades all of these to an
/// empty result; they never fail a run.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("knowledge partition unavailable: {partition}")]
    PartitionUnavailable { partition: String },

    #[error("embedding failed: {reason}")]
    EmbeddingFailed { reason: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("failed to load corpus {path} at line {line}: {reason}")]
    CorpusLoad {
        path: String,
        line: usize,
        reason: String,
    },
}

impl FopsErrorCode for KnowledgeError {
    fn error_code(&self) -> &'static str {
        error_code::KNOWLEDGE_ERROR
    }
}
