//! Built-in syntax checks. They reuse the composition grammars against the
//! staged copy, so a report always has at least one verdict even when no
//! external tool is installed.

use std::path::Path;

use async_trait::async_trait;
use fops_compose::grammar::{self, Grammar};
use fops_core::errors::{CompositionError, ToolError};
use fops_core::models::{DiagnosticFormat, ToolOutput};
use fops_core::traits::IValidatorTool;

pub struct SyntaxTool {
    name: &'static str,
    grammars: &'static [Grammar],
}

impl SyntaxTool {
    pub fn yaml() -> Self {
        Self {
            name: "yaml-syntax",
            grammars: &[Grammar::Yaml],
        }
    }

    pub fn hcl() -> Self {
        Self {
            name: "hcl-syntax",
            grammars: &[Grammar::Hcl],
        }
    }

    pub fn helm_template() -> Self {
        Self {
            name: "helm-template-syntax",
            grammars: &[Grammar::HelmTemplate, Grammar::HelmText],
        }
    }
}

#[async_trait]
impl IValidatorTool for SyntaxTool {
    fn name(&self) -> &str {
        self.name
    }

    fn diagnostics(&self) -> DiagnosticFormat {
        DiagnosticFormat::LineColumn
    }

    async fn invoke(&self, workdir: &Path, files: &[String]) -> Result<ToolOutput, ToolError> {
        let mut stdout = String::new();
        for file in files {
            let Some(g) = Grammar::for_path(file) else {
                continue;
            };
            if !self.grammars.contains(&g) {
                continue;
            }
            let content = tokio::fs::read_to_string(workdir.join(file))
                .await
                .map_err(|e| ToolError::Io {
                    tool: self.name.to_string(),
                    reason: format!("{file}: {e}"),
                })?;
            if let Err(CompositionError::ParseFailure { line, message, .. }) =
                grammar::check(file, &content)
            {
                let message = message.replace('\n', " ");
                stdout.push_str(&format!("{file}:{line}:1: [error] {message}\n"));
            }
        }
        Ok(ToolOutput {
            exit_status: Some(if stdout.is_empty() { 0 } else { 1 }),
            stdout,
            stderr: String::new(),
        })
    }
}
