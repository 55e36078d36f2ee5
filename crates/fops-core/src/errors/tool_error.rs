use super::error_code::{self, FopsErrorCode};

/// Errors raised while invoking an external validator tool.
/// Timeouts are enforced by the runner and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("validator binary not installed: {binary}")]
    NotInstalled { binary: String },

    #[error("failed to spawn {binary}: {reason}")]
    SpawnFailed { binary: String, reason: String },

    #[error("failed to stage draft for validation: {reason}")]
    Staging { reason: String },

    #[error("I/O error while running {tool}: {reason}")]
    Io { tool: String, reason: String },
}

impl FopsErrorCode for ToolError {
    fn error_code(&self) -> &'static str {
        error_code::TOOL_ERROR
    }
}
