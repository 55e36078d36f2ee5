use std::path::Path;

use async_trait::async_trait;

use crate::errors::ToolError;
use crate::models::{DiagnosticFormat, ToolOutput};

/// A read-only checker invoked against a staged draft.
#[async_trait]
pub trait IValidatorTool: Send + Sync {
    /// Check name reported in the validation outcome.
    fn name(&self) -> &str;

    /// How this tool reports problems.
    fn diagnostics(&self) -> DiagnosticFormat;

    /// Run the check with the draft staged under `workdir`. `files` are the
    /// draft's relative paths. Timeouts are enforced by the caller.
    async fn invoke(&self, workdir: &Path, files: &[String]) -> Result<ToolOutput, ToolError>;
}
