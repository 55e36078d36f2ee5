use super::error_code::{self, FopsErrorCode};

/// Proposal-submission errors. Never retried by the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("proposal submission target unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("change-set already exists for branch {branch}")]
    AlreadyExists { branch: String },

    #[error("proposal rejected: {reason}")]
    Rejected { reason: String },

    #[error("failed to write proposal bundle at {path}: {reason}")]
    Io { path: String, reason: String },
}

impl FopsErrorCode for SubmissionError {
    fn error_code(&self) -> &'static str {
        error_code::SUBMISSION_ERROR
    }
}
