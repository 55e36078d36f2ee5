use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Citation, ValidationReport};

/// Everything the proposal-submission collaborator receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub target_repository: String,
    pub branch_name: String,
    pub files: BTreeMap<String, String>,
    pub title: String,
    pub description: String,
    pub validation_report: ValidationReport,
    pub citations: Vec<Citation>,
}

/// Opaque handle to a created change-set (URL or bundle location).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalReference {
    pub uri: String,
}

impl std::fmt::Display for ProposalReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}
