//! # fops-knowledge
//!
//! Knowledge Retriever: embeds an intent, searches a read-only partitioned
//! corpus by cosine similarity, and ranks with a recency tie-break.

pub mod embedder;
pub mod plan;
pub mod ranking;
pub mod retriever;
pub mod similarity;
pub mod store;

pub use embedder::HashingEmbedder;
pub use plan::{retrieval_plan, RetrievalQuery};
pub use retriever::{KnowledgeRetriever, RetrievalOutcome};
pub use store::MemoryKnowledgeStore;
