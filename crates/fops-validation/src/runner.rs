//! Validation runner.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fops_core::config::ValidationConfig;
use fops_core::errors::ToolError;
use fops_core::models::{DraftArtifact, SkipReason, ValidationOutcome, ValidationReport};
use fops_core::tracing_setup::events;
use fops_core::validate_span;
use tempfile::TempDir;
use tracing::Instrument;

use crate::catalog::{Tool, ValidatorCatalog};
use crate::classify::{classify, from_tool_error};

pub struct ValidationRunner {
    config: ValidationConfig,
    catalog: ValidatorCatalog,
}

impl ValidationRunner {
    /// Runner over the standard validator catalog.
    pub fn new(config: ValidationConfig) -> Self {
        Self::with_catalog(config, ValidatorCatalog::standard())
    }

    pub fn with_catalog(config: ValidationConfig, catalog: ValidatorCatalog) -> Self {
        Self { config, catalog }
    }

    pub fn catalog(&self) -> &ValidatorCatalog {
        &self.catalog
    }

    /// Run every validator for the draft's platform. Never fails: absent,
    /// disabled, timed-out or crashed validators become skipped outcomes,
    /// reported in catalog order whatever order they finished in.
    pub async fn run(&self, draft: &DraftArtifact) -> ValidationReport {
        let span = validate_span!(draft.platform, draft.files.len());
        self.run_inner(draft).instrument(span).await
    }

    async fn run_inner(&self, draft: &DraftArtifact) -> ValidationReport {
        let tools = self.catalog.tools(draft.platform);
        let staged = match stage(draft).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!(error = %e, "could not stage draft");
                let outcomes = tools.iter().map(|t| from_tool_error(t.name(), &e)).collect();
                return ValidationReport { outcomes };
            }
        };
        let workdir = staged.path().to_path_buf();
        let files: Vec<String> = draft.files.keys().cloned().collect();
        let timeout = self.config.timeout();

        let mut outcomes = Vec::with_capacity(tools.len());
        if self.config.concurrent {
            let mut handles = Vec::with_capacity(tools.len());
            for tool in tools {
                if self.config.is_disabled(tool.name()) {
                    handles.push((tool.name().to_string(), None));
                    continue;
                }
                let name = tool.name().to_string();
                let (tool, workdir, files) = (Arc::clone(tool), workdir.clone(), files.clone());
                let handle =
                    tokio::spawn(async move { run_one(&tool, &workdir, &files, timeout).await });
                handles.push((name, Some(handle)));
            }
            for (name, handle) in handles {
                let outcome = match handle {
                    None => disabled(&name),
                    Some(handle) => handle.await.unwrap_or_else(|e| {
                        ValidationOutcome::skipped(&name, SkipReason::Crashed, format!("validator task failed: {e}"))
                    }),
                };
                outcomes.push(outcome);
            }
        } else {
            for tool in tools {
                let outcome = if self.config.is_disabled(tool.name()) {
                    disabled(tool.name())
                } else {
                    run_one(tool, &workdir, &files, timeout).await
                };
                outcomes.push(outcome);
            }
        }

        for o in &outcomes {
            events::validator_finished(
                &o.check_name,
                &format!("{:?}", o.status).to_lowercase(),
                o.findings.len(),
                o.duration_ms,
            );
        }
        // Keep the staging directory alive until every validator is done.
        drop(staged);
        ValidationReport { outcomes }
    }
}

async fn run_one(tool: &Tool, workdir: &Path, files: &[String], timeout: Duration) -> ValidationOutcome {
    let started = Instant::now();
    match tokio::time::timeout(timeout, tool.invoke(workdir, files)).await {
        Ok(Ok(output)) => classify(
            tool.name(),
            tool.diagnostics(),
            &output,
            started.elapsed().as_millis() as u64,
        ),
        Ok(Err(e)) => {
            tracing::warn!(tool = %tool.name(), error = %e, "validator unavailable");
            from_tool_error(tool.name(), &e)
        }
        Err(_) => {
            tracing::warn!(tool = %tool.name(), timeout_secs = timeout.as_secs(), "validator timed out");
            let mut outcome = ValidationOutcome::skipped(
                tool.name(),
                SkipReason::TimedOut,
                format!("exceeded {}s timeout", timeout.as_secs()),
            );
            outcome.duration_ms = started.elapsed().as_millis() as u64;
            outcome
        }
    }
}

fn disabled(name: &str) -> ValidationOutcome {
    ValidationOutcome::skipped(name, SkipReason::Disabled, "disabled by configuration".to_string())
}

/// Write the draft under a fresh temporary directory, removed on drop.
async fn stage(draft: &DraftArtifact) -> Result<TempDir, ToolError> {
    let staging = |e: std::io::Error| ToolError::Staging {
        reason: e.to_string(),
    };
    let dir = tempfile::Builder::new()
        .prefix("fops-draft-")
        .tempdir()
        .map_err(staging)?;
    for (path, content) in &draft.files {
        let target: PathBuf = dir.path().join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(staging)?;
        }
        tokio::fs::write(&target, content).await.map_err(staging)?;
    }
    Ok(dir)
}
