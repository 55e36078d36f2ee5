use super::error_code::{self, FopsErrorCode};

/// Audit log errors.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit log I/O error at {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to serialize audit record {run_id}: {reason}")]
    Serialize { run_id: String, reason: String },

    #[error("corrupt audit record at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("audit record {run_id} already exists")]
    DuplicateRunId { run_id: String },
}

impl FopsErrorCode for AuditError {
    fn error_code(&self) -> &'static str {
        error_code::AUDIT_ERROR
    }
}
