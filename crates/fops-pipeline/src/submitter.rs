//! Local proposal submitter: writes a reviewable change-set bundle to disk.
//!
//! Layout of `<bundle_dir>/<branch>/`:
//! - `changes.diff`: unified diff of the draft against the checkout
//! - `files/…`: the draft's files at their repository paths
//! - `validation_report.json`, `citations.json`
//! - `PROPOSAL.md`: title and description
//!
//! The bundle is assembled in a sibling temp directory and renamed into
//! place, so a bundle directory is either complete or absent. An existing
//! bundle is never overwritten.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use fops_core::errors::SubmissionError;
use fops_core::models::{ProposalReference, ProposalRequest};
use fops_core::traits::IProposalSubmitter;

pub const DIFF_FILE: &str = "changes.diff";
pub const FILES_DIR: &str = "files";
pub const REPORT_FILE: &str = "validation_report.json";
pub const CITATIONS_FILE: &str = "citations.json";
pub const PROPOSAL_FILE: &str = "PROPOSAL.md";

pub struct LocalBundleSubmitter {
    bundle_dir: PathBuf,
    checkout_root: Option<PathBuf>,
}

impl LocalBundleSubmitter {
    pub fn new(bundle_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundle_dir: bundle_dir.into(),
            checkout_root: None,
        }
    }

    /// Diff against files in this checkout instead of treating every file as new.
    pub fn with_checkout(mut self, root: impl Into<PathBuf>) -> Self {
        self.checkout_root = Some(root.into());
        self
    }

    pub fn bundle_path(&self, branch: &str) -> PathBuf {
        self.bundle_dir.join(branch)
    }

    fn write_bundle(&self, dir: &Path, request: &ProposalRequest) -> Result<(), SubmissionError> {
        for (path, content) in &request.files {
            write(&dir.join(FILES_DIR).join(path), content)?;
        }
        write(
            &dir.join(DIFF_FILE),
            &unified_diff(self.checkout_root.as_deref(), &request.files),
        )?;
        write(
            &dir.join(REPORT_FILE),
            &to_json(&dir.join(REPORT_FILE), &request.validation_report)?,
        )?;
        write(
            &dir.join(CITATIONS_FILE),
            &to_json(&dir.join(CITATIONS_FILE), &request.citations)?,
        )?;
        let proposal = format!(
            "# {}\n\nRepository: `{}`\nBranch: `{}`\n\n{}",
            request.title, request.target_repository, request.branch_name, request.description
        );
        write(&dir.join(PROPOSAL_FILE), &proposal)
    }
}

impl IProposalSubmitter for LocalBundleSubmitter {
    fn submit(&self, request: &ProposalRequest) -> Result<ProposalReference, SubmissionError> {
        if !is_confined(&request.branch_name) {
            return Err(SubmissionError::Rejected {
                reason: format!("branch name {:?} escapes the bundle directory", request.branch_name),
            });
        }
        if let Some(path) = request.files.keys().find(|p| !is_confined(p)) {
            return Err(SubmissionError::Rejected {
                reason: format!("file path {path:?} is not repository-relative"),
            });
        }

        let target = self.bundle_path(&request.branch_name);
        let already_exists = || SubmissionError::AlreadyExists {
            branch: request.branch_name.clone(),
        };
        if target.exists() {
            return Err(already_exists());
        }
        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.bundle_dir.clone());
        fs::create_dir_all(&parent).map_err(|e| io_error(&parent, e))?;

        let staging = tempfile::Builder::new()
            .prefix(".fops-bundle-")
            .tempdir_in(&parent)
            .map_err(|e| io_error(&parent, e))?;
        self.write_bundle(staging.path(), request)?;
        if let Err(e) = fs::rename(staging.path(), &target) {
            return Err(if target.exists() {
                already_exists()
            } else {
                io_error(&target, e)
            });
        }

        let location = target.canonicalize().unwrap_or(target);
        tracing::info!(
            bundle = %location.display(),
            files = request.files.len(),
            "proposal bundle written"
        );
        Ok(ProposalReference {
            uri: format!("file://{}", location.display()),
        })
    }
}

/// Unified diff of `files` against the checkout. Files absent from the
/// checkout diff against `/dev/null`; unchanged files are left out.
pub fn unified_diff(checkout_root: Option<&Path>, files: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (path, new) in files {
        let old = checkout_root.and_then(|root| fs::read_to_string(root.join(path)).ok());
        let (old_text, old_header) = match &old {
            Some(text) => (text.as_str(), format!("a/{path}")),
            None => ("", "/dev/null".to_string()),
        };
        if old.is_some() && old_text == new {
            continue;
        }
        let new_header = format!("b/{path}");
        let diff = similar::TextDiff::from_lines(old_text, new.as_str())
            .unified_diff()
            .context_radius(3)
            .header(&old_header, &new_header)
            .to_string();
        out.push_str(&format!("diff --git a/{path} b/{path}\n"));
        out.push_str(&diff);
        if !diff.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Relative, and never climbs out of its root.
fn is_confined(path: &str) -> bool {
    !path.trim().is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn write(path: &Path, content: &str) -> Result<(), SubmissionError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    fs::write(path, content).map_err(|e| io_error(path, e))
}

fn to_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<String, SubmissionError> {
    serde_json::to_string_pretty(value).map_err(|e| SubmissionError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn io_error(path: &Path, e: std::io::Error) -> SubmissionError {
    SubmissionError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
