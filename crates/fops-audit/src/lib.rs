//! # fops-audit
//!
//! Audit Recorder. One JSON record per line, appended atomically; history is
//! never edited, only superseded by later records.

pub mod log;
pub mod stats;

pub use log::JsonlAuditLog;
pub use stats::AuditStats;
