//! Repository snapshot: the only input the classifier sees.

use std::collections::BTreeMap;
use std::path::Path;

use fops_core::constants::{MAX_LISTED_FILES, MAX_MARKER_FILE_BYTES};
use ignore::WalkBuilder;

use crate::markers;

/// Bounds on how much of a checkout is listed and read.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotLimits {
    pub max_files: usize,
    pub max_marker_bytes: u64,
}

impl Default for SnapshotLimits {
    fn default() -> Self {
        Self {
            max_files: MAX_LISTED_FILES,
            max_marker_bytes: MAX_MARKER_FILE_BYTES,
        }
    }
}

/// File listing plus the contents of well-known marker files.
///
/// Paths are repository-relative, `/`-separated, and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySnapshot {
    pub files: Vec<String>,
    pub markers: BTreeMap<String, String>,
}

impl RepositorySnapshot {
    pub fn new(files: Vec<String>, markers: BTreeMap<String, String>) -> Self {
        let mut files = files;
        files.sort();
        files.dedup();
        Self { files, markers }
    }

    /// Build from in-memory `(path, content)` pairs. Every path is listed;
    /// contents are kept only for marker files.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut files = Vec::new();
        let mut marker_contents = BTreeMap::new();
        for (path, content) in entries {
            let path = normalize(path);
            if markers::is_marker_path(&path) {
                marker_contents.insert(path.clone(), content.to_string());
            }
            files.push(path);
        }
        Self::new(files, marker_contents)
    }

    /// Walk a checkout, honoring `.gitignore`, listing at most
    /// `limits.max_files` files and reading marker files under the size cap.
    /// Unreadable entries are skipped.
    pub fn from_dir(root: &Path, limits: &SnapshotLimits) -> Self {
        let mut files = Vec::new();
        let mut marker_contents = BTreeMap::new();

        let walker = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .require_git(false)
            .filter_entry(|e| e.file_name() != ".git")
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let path = normalize(&relative.to_string_lossy());

            if markers::is_marker_path(&path) {
                let small_enough = entry
                    .metadata()
                    .map(|m| m.len() <= limits.max_marker_bytes)
                    .unwrap_or(false);
                if small_enough {
                    match std::fs::read_to_string(entry.path()) {
                        Ok(content) => {
                            marker_contents.insert(path.clone(), content);
                        }
                        Err(e) => tracing::debug!(path = %path, error = %e, "marker not readable"),
                    }
                }
            }

            files.push(path);
            if files.len() >= limits.max_files {
                tracing::warn!(limit = limits.max_files, "file listing truncated");
                break;
            }
        }

        Self::new(files, marker_contents)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn marker(&self, path: &str) -> Option<&str> {
        self.markers.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.binary_search_by(|f| f.as_str().cmp(path)).is_ok()
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").to_string()
}

/// Last path component.
pub(crate) fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Number of directories above the file.
pub(crate) fn depth(path: &str) -> usize {
    path.matches('/').count()
}
