//! Collaborator seams. Each stage talks to the outside world only through these.

pub mod audit_sink;
pub mod embedding;
pub mod knowledge_store;
pub mod submitter;
pub mod validator_tool;

pub use audit_sink::IAuditSink;
pub use embedding::IEmbeddingProvider;
pub use knowledge_store::IKnowledgeStore;
pub use submitter::IProposalSubmitter;
pub use validator_tool::IValidatorTool;
