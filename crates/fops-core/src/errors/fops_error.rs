//! Top-level error aggregating subsystem errors via `From` conversions.

use super::error_code::FopsErrorCode;
use super::{
    AuditError, CompositionError, ConfigError, KnowledgeError, SubmissionError, ToolError,
};

#[derive(Debug, thiserror::Error)]
pub enum FopsError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("composition error: {0}")]
    Composition(#[from] CompositionError),

    #[error("validator error: {0}")]
    Tool(#[from] ToolError),

    #[error("audit error: {0}")]
    Audit(#[from] AuditError),

    #[error("submission error: {0}")]
    Submission(#[from] SubmissionError),
}

impl FopsErrorCode for FopsError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Knowledge(e) => e.error_code(),
            Self::Composition(e) => e.error_code(),
            Self::Tool(e) => e.error_code(),
            Self::Audit(e) => e.error_code(),
            Self::Submission(e) => e.error_code(),
        }
    }
}

pub type FopsResult<T> = Result<T, FopsError>;
