//! JSONL audit log.
//!
//! Appends take an exclusive `fd-lock` on a sidecar lock file, write the
//! whole log plus the new line to a temp file in the same directory, fsync
//! it, and rename it over the log. Readers never take the lock: they see the
//! log before or after an append, never a partial line.

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fops_core::audit_span;
use fops_core::errors::AuditError;
use fops_core::models::AuditRecord;
use fops_core::traits::IAuditSink;
use serde::Deserialize;

use crate::stats::AuditStats;

#[derive(Debug, Clone)]
pub struct JsonlAuditLog {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Just enough of a line to check run_id uniqueness without a full parse.
#[derive(Deserialize)]
struct RunIdOnly {
    run_id: String,
}

fn io_err(path: &Path, e: impl std::fmt::Display) -> AuditError {
    AuditError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

impl JsonlAuditLog {
    /// Open (without creating) the log at `path`, creating its directory.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AuditError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Ok(Self { path, lock_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record in append order. A missing log is an empty history.
    pub fn read_all(&self) -> Result<Vec<AuditRecord>, AuditError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&self.path, e)),
        };
        content
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(i, l)| {
                serde_json::from_str(l).map_err(|e| AuditError::Corrupt {
                    line: i + 1,
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    /// Newest record in the supersede chain starting at `run_id`.
    pub fn resolve(&self, run_id: &str) -> Result<Option<AuditRecord>, AuditError> {
        let records = self.read_all()?;
        Ok(resolve_in(&records, run_id).cloned())
    }

    /// Records no later record supersedes, in append order.
    pub fn current(&self) -> Result<Vec<AuditRecord>, AuditError> {
        let records = self.read_all()?;
        let superseded: HashSet<&str> = records
            .iter()
            .filter_map(|r| r.supersedes.as_deref())
            .collect();
        Ok(records
            .iter()
            .filter(|r| !superseded.contains(r.run_id.as_str()))
            .cloned()
            .collect())
    }

    pub fn stats(&self) -> Result<AuditStats, AuditError> {
        let records = self.read_all()?;
        Ok(AuditStats::from_records(&records))
    }

    fn append_locked(&self, line: &str, run_id: &str) -> Result<(), AuditError> {
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| io_err(&self.lock_path, e))?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock.write().map_err(|e| io_err(&self.lock_path, e))?;

        let existing = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(io_err(&self.path, e)),
        };
        let duplicate = existing
            .lines()
            .filter_map(|l| serde_json::from_str::<RunIdOnly>(l).ok())
            .any(|r| r.run_id == run_id);
        if duplicate {
            return Err(AuditError::DuplicateRunId {
                run_id: run_id.to_string(),
            });
        }

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::Builder::new()
            .prefix(".fops-audit-")
            .tempfile_in(&dir)
            .map_err(|e| io_err(&dir, e))?;
        tmp.write_all(existing.as_bytes())
            .map_err(|e| io_err(tmp.path(), e))?;
        if !existing.is_empty() && !existing.ends_with('\n') {
            tmp.write_all(b"\n").map_err(|e| io_err(tmp.path(), e))?;
        }
        tmp.write_all(line.as_bytes())
            .and_then(|_| tmp.write_all(b"\n"))
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| io_err(tmp.path(), e))?;
        tmp.persist(&self.path).map_err(|e| io_err(&self.path, e.error))?;

        if let Err(e) = sync_dir(&dir) {
            tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "audit directory fsync failed; record written but rename may not be durable"
            );
        }
        Ok(())
    }
}

impl IAuditSink for JsonlAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let _span = audit_span!(record.run_id).entered();
        let line = serde_json::to_string(record).map_err(|e| AuditError::Serialize {
            run_id: record.run_id.clone(),
            reason: e.to_string(),
        })?;
        self.append_locked(&line, &record.run_id)?;
        tracing::info!(
            run_id = %record.run_id,
            terminal_status = %record.terminal_status,
            supersedes = record.supersedes.as_deref().unwrap_or(""),
            "audit record appended"
        );
        Ok(())
    }
}

/// Make a rename in `dir` durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Follow corrections from `run_id` to the newest one. The latest record
/// naming a run in `supersedes` wins.
pub fn resolve_in<'a>(records: &'a [AuditRecord], run_id: &str) -> Option<&'a AuditRecord> {
    let by_id: BTreeMap<&str, &AuditRecord> =
        records.iter().map(|r| (r.run_id.as_str(), r)).collect();
    let mut corrections: BTreeMap<&str, &AuditRecord> = BTreeMap::new();
    for r in records {
        if let Some(prev) = r.supersedes.as_deref() {
            corrections.insert(prev, r);
        }
    }

    let mut current = *by_id.get(run_id)?;
    for _ in 0..records.len() {
        match corrections.get(current.run_id.as_str()) {
            Some(next) => current = *next,
            None => break,
        }
    }
    Some(current)
}
