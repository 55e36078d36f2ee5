//! Stable error codes, written into audit records and structured failures.

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const KNOWLEDGE_ERROR: &str = "KNOWLEDGE_ERROR";
pub const COMPOSITION_PARSE_ERROR: &str = "COMPOSITION_PARSE_ERROR";
pub const COMPOSITION_UNSUPPORTED: &str = "COMPOSITION_UNSUPPORTED";
pub const TOOL_ERROR: &str = "TOOL_ERROR";
pub const AUDIT_ERROR: &str = "AUDIT_ERROR";
pub const SUBMISSION_ERROR: &str = "SUBMISSION_ERROR";

/// Maps an error to its stable code.
pub trait FopsErrorCode {
    fn error_code(&self) -> &'static str;
}
