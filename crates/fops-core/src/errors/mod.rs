//! Error handling for fops.
//! One error enum per subsystem, `thiserror` only.
//!
//! Degraded inputs (unknown stack, empty retrieval, missing validator) are not
//! errors; they are recorded as `DegradationEvent`s on the audit record.

pub mod audit_error;
pub mod composition_error;
pub mod config_error;
pub mod error_code;
pub mod fops_error;
pub mod knowledge_error;
pub mod submission_error;
pub mod tool_error;

pub use audit_error::AuditError;
pub use composition_error::CompositionError;
pub use config_error::ConfigError;
pub use error_code::FopsErrorCode;
pub use fops_error::{FopsError, FopsResult};
pub use knowledge_error::KnowledgeError;
pub use submission_error::SubmissionError;
pub use tool_error::ToolError;
