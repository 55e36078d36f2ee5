use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use fops_core::models::{AuditRecord, TerminalStatus};
use serde::Serialize;

/// Totals over the current (not superseded) records of a log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditStats {
    /// Records in the log, corrections included.
    pub records: usize,
    /// Runs after applying corrections.
    pub runs: usize,
    pub corrections: usize,
    pub by_status: BTreeMap<TerminalStatus, usize>,
    pub by_day: BTreeMap<NaiveDate, usize>,
    pub citations: usize,
}

impl AuditStats {
    pub fn from_records(records: &[AuditRecord]) -> Self {
        let superseded: HashSet<&str> = records
            .iter()
            .filter_map(|r| r.supersedes.as_deref())
            .collect();
        let mut stats = AuditStats {
            records: records.len(),
            corrections: records.iter().filter(|r| r.supersedes.is_some()).count(),
            ..AuditStats::default()
        };
        for r in records.iter().filter(|r| !superseded.contains(r.run_id.as_str())) {
            stats.runs += 1;
            *stats.by_status.entry(r.terminal_status).or_default() += 1;
            *stats.by_day.entry(r.timestamp.date_naive()).or_default() += 1;
            stats.citations += r.citations.len();
        }
        stats
    }

    pub fn count(&self, status: TerminalStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Share of current runs that ended `succeeded`.
    pub fn success_rate(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.count(TerminalStatus::Succeeded) as f64 / self.runs as f64
    }
}
