//! # fops-core
//!
//! Foundation crate for the fops proposal pipeline.
//! Defines the run data model, collaborator traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;
pub mod tracing_setup;

// Re-export the most commonly used types at the crate root.
pub use config::FopsConfig;
pub use errors::{FopsError, FopsResult};
pub use models::{
    ArtifactFamily, AuditRecord, Citation, DraftArtifact, KnowledgeItem, Language, Platform,
    RetrievalResult, StackProfile, TerminalStatus, ValidationOutcome, ValidationReport,
};
