//! External validator binaries.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use fops_core::errors::ToolError;
use fops_core::models::{DiagnosticFormat, ToolOutput};
use fops_core::traits::IValidatorTool;
use tokio::process::Command;

/// Which staged files are appended to the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileArgs {
    None,
    Yaml,
}

/// A validator run as a child process in the staging directory. The child
/// is killed when the invocation future is dropped, which is how the
/// runner's timeout stops it.
#[derive(Debug, Clone)]
pub struct ProcessTool {
    name: String,
    binary: String,
    args: Vec<String>,
    prepare: Option<Vec<String>>,
    files: FileArgs,
    diagnostics: DiagnosticFormat,
}

impl ProcessTool {
    pub fn new(name: impl Into<String>, binary: impl Into<String>, diagnostics: DiagnosticFormat) -> Self {
        Self {
            name: name.into(),
            binary: binary.into(),
            args: Vec::new(),
            prepare: None,
            files: FileArgs::None,
            diagnostics,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Arguments for a preparatory run of the same binary (e.g. `init`).
    /// A non-zero preparatory run is reported as the tool's result.
    pub fn prepare<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prepare = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn files(mut self, files: FileArgs) -> Self {
        self.files = files;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn resolve(&self) -> Result<PathBuf, ToolError> {
        which::which(&self.binary).map_err(|_| ToolError::NotInstalled {
            binary: self.binary.clone(),
        })
    }

    async fn exec(&self, binary: &Path, args: &[String], workdir: &Path) -> Result<ToolOutput, ToolError> {
        tracing::debug!(tool = %self.name, ?args, "spawning validator");
        let child = Command::new(binary)
            .args(args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ToolError::NotInstalled {
                        binary: self.binary.clone(),
                    }
                } else {
                    ToolError::SpawnFailed {
                        binary: self.binary.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let output = child.wait_with_output().await.map_err(|e| ToolError::Io {
            tool: self.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(ToolOutput {
            exit_status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[async_trait]
impl IValidatorTool for ProcessTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn diagnostics(&self) -> DiagnosticFormat {
        self.diagnostics
    }

    async fn invoke(&self, workdir: &Path, files: &[String]) -> Result<ToolOutput, ToolError> {
        let binary = self.resolve()?;

        if let Some(prepare) = &self.prepare {
            let output = self.exec(&binary, prepare, workdir).await?;
            if output.exit_status != Some(0) {
                return Ok(output);
            }
        }

        let mut args = self.args.clone();
        match self.files {
            FileArgs::None => {}
            FileArgs::Yaml => args.extend(
                files
                    .iter()
                    .filter(|f| f.ends_with(".yml") || f.ends_with(".yaml"))
                    .cloned(),
            ),
        }
        self.exec(&binary, &args, workdir).await
    }
}
