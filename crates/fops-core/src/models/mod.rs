//! Run data model. Everything except `AuditRecord` lives for one run only.

pub mod artifact;
pub mod audit_record;
pub mod citation;
pub mod degradation_event;
pub mod knowledge;
pub mod proposal;
pub mod stack_profile;
pub mod stage;
pub mod validation;

pub use artifact::{ArtifactFamily, DeployTarget, DraftArtifact, Platform, SectionProvenance};
pub use audit_record::{AuditRecord, RetrievalQueryLog};
pub use citation::Citation;
pub use degradation_event::DegradationEvent;
pub use knowledge::{KnowledgeItem, KnowledgePartition, RetrievalHit, RetrievalResult};
pub use proposal::{ProposalReference, ProposalRequest};
pub use stack_profile::{Language, PackageManager, StackProfile};
pub use stage::{Stage, StageFailure, TerminalStatus};
pub use validation::{
    DiagnosticFormat, Finding, Severity, SkipReason, ToolOutput, ValidationOutcome,
    ValidationReport, ValidationStatus,
};
