use serde::{Deserialize, Serialize};

use super::defaults;

/// Knowledge retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Hits kept per query.
    pub top_k: usize,
    /// Scores closer than this are ties, broken by recency.
    pub tie_epsilon: f64,
    /// Dimensions of the hashing embedder.
    pub embedding_dimensions: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::DEFAULT_TOP_K,
            tie_epsilon: defaults::DEFAULT_TIE_EPSILON,
            embedding_dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}
