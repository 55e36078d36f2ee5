use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Citation, DegradationEvent, KnowledgePartition, ProposalReference, StackProfile,
    StageFailure, TerminalStatus, ValidationReport,
};

/// One knowledge-store query issued during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalQueryLog {
    pub partition: KnowledgePartition,
    pub intent: String,
    pub hit_count: usize,
}

/// Immutable record of one pipeline run. Corrections are new records whose
/// `supersedes` names the earlier `run_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub schema_version: u32,
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub target_repository: String,
    pub stack_profile: StackProfile,
    pub retrieval_queries: Vec<RetrievalQueryLog>,
    pub citations: Vec<Citation>,
    /// Absent when the run stopped before a draft existed.
    pub draft_artifact_digest: Option<String>,
    pub validation_report: ValidationReport,
    pub terminal_status: TerminalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<StageFailure>,
    #[serde(default)]
    pub degradations: Vec<DegradationEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal_reference: Option<ProposalReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<String>,
}

impl AuditRecord {
    /// Build the correction of this record: same run facts, a fresh id.
    pub fn superseded_by(&self, run_id: String, timestamp: DateTime<Utc>) -> AuditRecord {
        AuditRecord {
            run_id,
            timestamp,
            supersedes: Some(self.run_id.clone()),
            ..self.clone()
        }
    }
}
