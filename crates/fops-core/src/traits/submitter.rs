use crate::errors::SubmissionError;
use crate::models::{ProposalReference, ProposalRequest};

/// Creates a reviewable change-set. Called exactly once per run, never retried.
pub trait IProposalSubmitter: Send + Sync {
    fn submit(&self, request: &ProposalRequest) -> Result<ProposalReference, SubmissionError>;
}
